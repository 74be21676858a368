use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiError;
use crate::model::project::{Project, ProjectStatus};
use crate::model::session::UserInfo;

/// Request body for create/update: the project without its id
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBody<'a> {
    pub name: &'a str,
    pub tech: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl<'a> From<&'a Project> for ProjectBody<'a> {
    fn from(p: &'a Project) -> Self {
        ProjectBody {
            name: &p.name,
            tech: &p.tech,
            status: p.status,
            description: &p.description,
            url: p.url.as_deref(),
            start_date: p.start_date,
            end_date: p.end_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Error payload the server sends with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Read an identifier that may be a plain string, a number, or an
/// extended-JSON `{"$oid": "..."}` object.
fn id_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(o) => o.get("$oid").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Decode one project from the list endpoint, mapping `_id` onto `id`.
pub fn project_from_server(mut value: Value) -> Result<Project, ApiError> {
    let obj = value
        .as_object_mut()
        .ok_or_else(|| ApiError::Decode("project entry is not an object".into()))?;
    let id = obj
        .get("_id")
        .and_then(id_value)
        .or_else(|| obj.get("id").and_then(id_value))
        .ok_or_else(|| ApiError::Decode("project entry has no _id".into()))?;
    obj.remove("_id");
    obj.insert("id".into(), Value::String(id));
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pull the server-assigned id out of a create response.
pub fn created_id(value: &Value) -> Result<String, ApiError> {
    ["project_id", "_id", "id"]
        .iter()
        .find_map(|key| value.get(key).and_then(id_value))
        .ok_or_else(|| ApiError::Decode("create response has no project_id".into()))
}
