//! Client side of the DevSync REST API.

pub mod http;
pub mod wire;

use async_trait::async_trait;

use crate::model::project::Project;

pub use http::HttpApi;
pub use wire::{LoginResponse, ProjectBody, SignupResponse};

/// Any failed API call. Callers treat every variant as one failure category.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Project CRUD under bearer-token auth
#[async_trait]
pub trait ProjectApi: Send + Sync {
    /// `GET /api/projects`
    async fn list_projects(&self, token: &str) -> Result<Vec<Project>, ApiError>;

    /// `POST /api/projects`, returning the server-assigned id
    async fn create_project(&self, token: &str, body: &ProjectBody<'_>) -> Result<String, ApiError>;

    /// `PUT /api/projects/{id}`
    async fn update_project(
        &self,
        token: &str,
        id: &str,
        body: &ProjectBody<'_>,
    ) -> Result<(), ApiError>;

    /// `DELETE /api/projects/{id}`
    async fn delete_project(&self, token: &str, id: &str) -> Result<(), ApiError>;
}

/// Account endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<SignupResponse, ApiError>;
}
