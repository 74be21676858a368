use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;

use super::wire::{self, ErrorBody, LoginRequest, SignupRequest};
use super::{ApiError, AuthApi, LoginResponse, ProjectApi, ProjectBody, SignupResponse};
use crate::model::project::Project;

/// reqwest-backed API client
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpApi {
            client: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn project_url(&self, id: &str) -> String {
        self.url(&format!("/api/projects/{}", id))
    }
}

/// Turn a non-2xx response into `ApiError::Status`, keeping the server's
/// `message` when it sent one.
async fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ProjectApi for HttpApi {
    async fn list_projects(&self, token: &str) -> Result<Vec<Project>, ApiError> {
        let url = self.url("/api/projects");
        tracing::debug!(%url, "GET projects");
        let resp = self.client.get(&url).bearer_auth(token).send().await?;
        let raw: Vec<Value> = check(resp).await?.json().await?;
        raw.into_iter().map(wire::project_from_server).collect()
    }

    async fn create_project(&self, token: &str, body: &ProjectBody<'_>) -> Result<String, ApiError> {
        let url = self.url("/api/projects");
        tracing::debug!(%url, name = body.name, "POST project");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        let value: Value = check(resp).await?.json().await?;
        wire::created_id(&value)
    }

    async fn update_project(
        &self,
        token: &str,
        id: &str,
        body: &ProjectBody<'_>,
    ) -> Result<(), ApiError> {
        let url = self.project_url(id);
        tracing::debug!(%url, "PUT project");
        let resp = self
            .client
            .put(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn delete_project(&self, token: &str, id: &str) -> Result<(), ApiError> {
        let url = self.project_url(id);
        tracing::debug!(%url, "DELETE project");
        let resp = self.client.delete(&url).bearer_auth(token).send().await?;
        check(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.url("/login");
        tracing::debug!(%url, email, "POST login");
        let resp = self
            .client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<SignupResponse, ApiError> {
        let url = self.url("/signup");
        tracing::debug!(%url, username, "POST signup");
        let resp = self
            .client
            .post(&url)
            .json(&SignupRequest {
                username,
                email,
                password,
            })
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }
}
