//! Asynchronous store operations backed by the remote API.
//!
//! Each operation issues one API call and, once it resolves, applies the
//! outcome to the store. The store mutex is held only for that apply step,
//! so independent operations may be in flight at the same time; whichever
//! resolves last writes last.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{ProjectStore, reconcile};
use crate::api::{ApiError, ProjectApi, ProjectBody};
use crate::model::project::Project;

/// Message retained in the store when a full fetch fails
pub const FETCH_FAILED: &str = "Fetch failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Fetch => "fetch projects",
            Operation::Create => "create project",
            Operation::Update => "update project",
            Operation::Delete => "delete project",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("not logged in: run `devsync login` first")]
    MissingCredential,
    #[error("{op} failed: {source}")]
    Remote {
        op: Operation,
        #[source]
        source: ApiError,
    },
}

/// Runs store operations against a [`ProjectApi`]
pub struct RemoteSync<A> {
    api: A,
}

fn lock(store: &Mutex<ProjectStore>) -> MutexGuard<'_, ProjectStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

fn require_token(token: &str) -> Result<&str, SyncError> {
    if token.trim().is_empty() {
        Err(SyncError::MissingCredential)
    } else {
        Ok(token)
    }
}

impl<A: ProjectApi> RemoteSync<A> {
    pub fn new(api: A) -> Self {
        RemoteSync { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Replace the collection with the server's. Returns the new count.
    pub async fn fetch_all(
        &self,
        store: &Mutex<ProjectStore>,
        token: &str,
    ) -> Result<usize, SyncError> {
        let token = require_token(token)?;
        {
            let mut s = lock(store);
            s.loading = true;
            s.error = None;
        }

        let result = self.api.list_projects(token).await;

        let mut s = lock(store);
        s.loading = false;
        match result {
            Ok(projects) => {
                let count = projects.len();
                reconcile::apply_fetched(&mut s, projects);
                tracing::debug!(count, "fetched projects");
                Ok(count)
            }
            Err(source) => {
                s.error = Some(FETCH_FAILED.to_string());
                tracing::warn!(error = %source, "fetch failed; keeping local projects");
                Err(SyncError::Remote {
                    op: Operation::Fetch,
                    source,
                })
            }
        }
    }

    /// Post an optimistically added project. `project.id` is the temporary
    /// id it was inserted under; on success that entry takes the server id.
    pub async fn create_remote(
        &self,
        store: &Mutex<ProjectStore>,
        project: &Project,
        token: &str,
    ) -> Result<String, SyncError> {
        let token = require_token(token)?;
        let temp_id = project.id.as_str();

        match self.api.create_project(token, &ProjectBody::from(project)).await {
            Ok(server_id) => {
                let outcome = reconcile::apply_created(&mut lock(store), temp_id, &server_id);
                tracing::debug!(temp_id, %server_id, ?outcome, "create confirmed");
                Ok(server_id)
            }
            Err(source) => {
                reconcile::apply_failed(&mut lock(store), temp_id);
                tracing::warn!(temp_id, error = %source, "create failed; local entry kept");
                Err(SyncError::Remote {
                    op: Operation::Create,
                    source,
                })
            }
        }
    }

    /// Put the full record to the server; on success the local copy is
    /// overwritten with `project`.
    pub async fn update_remote(
        &self,
        store: &Mutex<ProjectStore>,
        project: &Project,
        token: &str,
    ) -> Result<(), SyncError> {
        let token = require_token(token)?;

        match self
            .api
            .update_project(token, &project.id, &ProjectBody::from(project))
            .await
        {
            Ok(()) => {
                reconcile::apply_updated(&mut lock(store), project.clone());
                tracing::debug!(id = %project.id, "update confirmed");
                Ok(())
            }
            Err(source) => {
                reconcile::apply_failed(&mut lock(store), &project.id);
                tracing::warn!(id = %project.id, error = %source, "update failed; local edit kept");
                Err(SyncError::Remote {
                    op: Operation::Update,
                    source,
                })
            }
        }
    }

    /// Delete on the server; on success remove locally too.
    pub async fn delete_remote(
        &self,
        store: &Mutex<ProjectStore>,
        id: &str,
        token: &str,
    ) -> Result<(), SyncError> {
        let token = require_token(token)?;

        match self.api.delete_project(token, id).await {
            Ok(()) => {
                reconcile::apply_deleted(&mut lock(store), id);
                tracing::debug!(id, "delete confirmed");
                Ok(())
            }
            Err(source) => {
                tracing::warn!(id, error = %source, "delete failed");
                Err(SyncError::Remote {
                    op: Operation::Delete,
                    source,
                })
            }
        }
    }
}
