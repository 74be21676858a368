//! Optimistic store + remote sync behavior against an in-process fake API.
//!
//! The fake can hold individual calls open on a oneshot gate, so tests
//! decide the order in which concurrent responses resolve.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::sync::oneshot;

use devsync::api::{ApiError, ProjectApi, ProjectBody};
use devsync::model::project::{Project, ProjectDraft, ProjectStatus};
use devsync::store::sync::FETCH_FAILED;
use devsync::store::{ProjectStore, RemoteSync, SyncError, SyncStatus};

const TOKEN: &str = "test-token";
/// Gate key for `list_projects`, which carries no project name
const LIST_GATE: &str = "GET /api/projects";

struct FakeApi {
    calls: AtomicUsize,
    fail: bool,
    server_projects: Vec<Project>,
    next_id: String,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

impl FakeApi {
    fn new() -> Self {
        FakeApi {
            calls: AtomicUsize::new(0),
            fail: false,
            server_projects: Vec::new(),
            next_id: "6650f1c2a9e4b1d2c3f4a5b6".to_string(),
            gates: Mutex::new(HashMap::new()),
        }
    }

    fn failing() -> Self {
        FakeApi {
            fail: true,
            ..FakeApi::new()
        }
    }

    fn serving(projects: Vec<Project>) -> Self {
        FakeApi {
            server_projects: projects,
            ..FakeApi::new()
        }
    }

    /// Hold the next call for a project with this name until the sender fires
    fn gate(&self, name: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(name.to_string(), rx);
        tx
    }

    async fn hold(&self, name: &str) {
        let gate = self.gates.lock().unwrap().remove(name);
        if let Some(rx) = gate {
            let _ = rx.await;
        }
    }

    fn outcome(&self) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(ApiError::Status {
                status: 500,
                message: "Internal Server Error".into(),
            })
        } else {
            Ok(())
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectApi for FakeApi {
    async fn list_projects(&self, _token: &str) -> Result<Vec<Project>, ApiError> {
        self.hold(LIST_GATE).await;
        self.outcome()?;
        Ok(self.server_projects.clone())
    }

    async fn create_project(&self, _token: &str, body: &ProjectBody<'_>) -> Result<String, ApiError> {
        self.hold(body.name).await;
        self.outcome()?;
        Ok(self.next_id.clone())
    }

    async fn update_project(
        &self,
        _token: &str,
        _id: &str,
        body: &ProjectBody<'_>,
    ) -> Result<(), ApiError> {
        self.hold(body.name).await;
        self.outcome()
    }

    async fn delete_project(&self, _token: &str, _id: &str) -> Result<(), ApiError> {
        self.outcome()
    }
}

fn draft(name: &str, status: ProjectStatus) -> ProjectDraft {
    let mut d = ProjectDraft::new(name);
    d.tech = "React, Node.js".into();
    d.status = Some(status);
    d.description = format!("{} description", name);
    d
}

fn server_project(id: &str, name: &str) -> Project {
    draft(name, ProjectStatus::Completed).into_project(id.to_string())
}

fn names(store: &Mutex<ProjectStore>) -> Vec<String> {
    store
        .lock()
        .unwrap()
        .projects()
        .map(|p| p.name.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_confirmation_swaps_in_server_id() {
    let sync = RemoteSync::new(FakeApi::new());
    let store = Mutex::new(ProjectStore::new());

    let temp_id = store
        .lock()
        .unwrap()
        .add_optimistic(draft("ToDo App", ProjectStatus::InProgress));
    let before = store.lock().unwrap().get(&temp_id).cloned().unwrap();

    let server_id = sync.create_remote(&store, &before, TOKEN).await.unwrap();
    assert_eq!(server_id, "6650f1c2a9e4b1d2c3f4a5b6");

    let s = store.lock().unwrap();
    assert_eq!(s.len(), 1);
    assert!(!s.contains(&temp_id));
    let after = s.get(&server_id).unwrap();
    assert_eq!(
        Project {
            id: temp_id.clone(),
            ..after.clone()
        },
        before
    );
    assert_eq!(s.sync_status(&server_id), Some(SyncStatus::Confirmed));
}

#[tokio::test]
async fn create_keeps_position_among_existing_entries() {
    let sync = RemoteSync::new(FakeApi::new());
    let store = Mutex::new(ProjectStore::new());
    let (temp_id, project) = {
        let mut s = store.lock().unwrap();
        s.add_optimistic(draft("First", ProjectStatus::Planned));
        let id = s.add_optimistic(draft("Middle", ProjectStatus::Planned));
        s.add_optimistic(draft("Last", ProjectStatus::Planned));
        let p = s.get(&id).cloned().unwrap();
        (id, p)
    };

    sync.create_remote(&store, &project, TOKEN).await.unwrap();

    assert_eq!(names(&store), vec!["First", "Middle", "Last"]);
    assert!(!store.lock().unwrap().contains(&temp_id));
}

#[tokio::test]
async fn failed_create_keeps_local_entry_tagged_failed() {
    let sync = RemoteSync::new(FakeApi::failing());
    let store = Mutex::new(ProjectStore::new());
    let temp_id = store
        .lock()
        .unwrap()
        .add_optimistic(draft("Resume Builder", ProjectStatus::Completed));
    let project = store.lock().unwrap().get(&temp_id).cloned().unwrap();

    let err = sync.create_remote(&store, &project, TOKEN).await.unwrap_err();
    assert!(matches!(err, SyncError::Remote { .. }));

    let s = store.lock().unwrap();
    assert_eq!(s.get(&temp_id), Some(&project));
    assert_eq!(s.sync_status(&temp_id), Some(SyncStatus::Failed));
}

#[tokio::test]
async fn edit_during_create_survives_id_rewrite() {
    let sync = RemoteSync::new(FakeApi::new());
    let store = Mutex::new(ProjectStore::new());
    let temp_id = store
        .lock()
        .unwrap()
        .add_optimistic(draft("Portfolio", ProjectStatus::Planned));
    let submitted = store.lock().unwrap().get(&temp_id).cloned().unwrap();
    let gate = sync.api().gate("Portfolio");

    let create = sync.create_remote(&store, &submitted, TOKEN);
    let edit = async {
        {
            let mut s = store.lock().unwrap();
            let mut edited = s.get(&temp_id).cloned().unwrap();
            edited.name = "Portfolio v2".into();
            edited.status = Some(ProjectStatus::InProgress);
            assert!(s.update(edited));
        }
        gate.send(()).unwrap();
    };
    let (created, ()) = tokio::join!(create, edit);
    let server_id = created.unwrap();

    let s = store.lock().unwrap();
    assert_eq!(s.len(), 1);
    let p = s.get(&server_id).unwrap();
    assert_eq!(p.name, "Portfolio v2");
    assert_eq!(p.status, Some(ProjectStatus::InProgress));
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn later_resolving_update_wins() {
    let sync = RemoteSync::new(FakeApi::new());
    let store = Mutex::new(ProjectStore::new());
    let original = server_project("srv-1", "Tracker");
    let seed = RemoteSync::new(FakeApi::serving(vec![original.clone()]));
    seed.fetch_all(&store, TOKEN).await.unwrap();

    let first = Project {
        name: "Tracker A".into(),
        ..original.clone()
    };
    let second = Project {
        name: "Tracker B".into(),
        ..original.clone()
    };
    let gate_a = sync.api().gate("Tracker A");
    let gate_b = sync.api().gate("Tracker B");
    let (b_done_tx, b_done_rx) = oneshot::channel::<()>();

    let update_a = sync.update_remote(&store, &first, TOKEN);
    let update_b = async {
        let r = sync.update_remote(&store, &second, TOKEN).await;
        b_done_tx.send(()).unwrap();
        r
    };
    // B resolves first, A resolves last
    let release = async {
        gate_b.send(()).unwrap();
        b_done_rx.await.unwrap();
        gate_a.send(()).unwrap();
    };
    let (a, b, ()) = tokio::join!(update_a, update_b, release);
    a.unwrap();
    b.unwrap();

    let s = store.lock().unwrap();
    assert_eq!(s.get("srv-1").unwrap().name, "Tracker A");
    assert_eq!(s.sync_status("srv-1"), Some(SyncStatus::Confirmed));
}

#[tokio::test]
async fn failed_update_keeps_local_edit() {
    let sync = RemoteSync::new(FakeApi::failing());
    let store = Mutex::new(ProjectStore::new());
    let id = store
        .lock()
        .unwrap()
        .add_optimistic(draft("Blog", ProjectStatus::Planned));
    let mut edited = store.lock().unwrap().get(&id).cloned().unwrap();
    edited.description = "rewritten".into();
    store.lock().unwrap().update(edited.clone());

    assert!(sync.update_remote(&store, &edited, TOKEN).await.is_err());

    let s = store.lock().unwrap();
    assert_eq!(s.get(&id).unwrap().description, "rewritten");
    assert_eq!(s.sync_status(&id), Some(SyncStatus::Failed));
}

#[tokio::test]
async fn delete_is_idempotent_after_remote_confirmation() {
    let sync = RemoteSync::new(FakeApi::new());
    let store = Mutex::new(ProjectStore::new());
    let seed = RemoteSync::new(FakeApi::serving(vec![
        server_project("a", "Alpha"),
        server_project("b", "Beta"),
    ]));
    seed.fetch_all(&store, TOKEN).await.unwrap();

    assert!(store.lock().unwrap().delete("a"));
    sync.delete_remote(&store, "a", TOKEN).await.unwrap();
    let after_first = store.lock().unwrap().snapshot();

    assert!(!store.lock().unwrap().delete("a"));
    sync.delete_remote(&store, "a", TOKEN).await.unwrap();
    assert_eq!(store.lock().unwrap().snapshot(), after_first);
    assert_eq!(names(&store), vec!["Beta"]);
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_replaces_collection_with_confirmed_entries() {
    let sync = RemoteSync::new(FakeApi::serving(vec![
        server_project("1", "MeetingMind"),
        server_project("2", "Resume Builder"),
    ]));
    let store = Mutex::new(ProjectStore::new());
    store
        .lock()
        .unwrap()
        .add_optimistic(draft("Local only", ProjectStatus::Planned));

    assert_eq!(sync.fetch_all(&store, TOKEN).await.unwrap(), 2);

    let s = store.lock().unwrap();
    assert_eq!(
        s.projects().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        vec!["1", "2"]
    );
    assert_eq!(s.sync_status("1"), Some(SyncStatus::Confirmed));
    assert!(!s.loading());
    assert_eq!(s.error(), None);
}

#[tokio::test]
async fn failed_fetch_keeps_collection_and_records_error() {
    let sync = RemoteSync::new(FakeApi::failing());
    let store = Mutex::new(ProjectStore::new());
    store
        .lock()
        .unwrap()
        .add_optimistic(draft("Keep me", ProjectStatus::Planned));
    let before = store.lock().unwrap().snapshot();

    let err = sync.fetch_all(&store, TOKEN).await.unwrap_err();
    assert!(err.to_string().contains("fetch projects failed"));

    let s = store.lock().unwrap();
    assert_eq!(s.snapshot(), before);
    assert_eq!(s.error(), Some(FETCH_FAILED));
    assert!(!s.loading());
}

#[tokio::test]
async fn fetch_is_loading_while_in_flight_and_clears_old_error() {
    let store = Mutex::new(ProjectStore::new());
    let broken = RemoteSync::new(FakeApi::failing());
    assert!(broken.fetch_all(&store, TOKEN).await.is_err());
    assert_eq!(store.lock().unwrap().error(), Some(FETCH_FAILED));

    let sync = RemoteSync::new(FakeApi::serving(vec![server_project("1", "MeetingMind")]));
    let gate = sync.api().gate(LIST_GATE);

    let fetch = sync.fetch_all(&store, TOKEN);
    let observe = async {
        for _ in 0..100 {
            if store.lock().unwrap().loading() {
                break;
            }
            tokio::task::yield_now().await;
        }
        let seen = {
            let s = store.lock().unwrap();
            (s.loading(), s.error().map(str::to_string))
        };
        gate.send(()).unwrap();
        seen
    };
    let (fetched, (loading, error)) = tokio::join!(fetch, observe);

    assert!(loading);
    assert_eq!(error, None);
    assert_eq!(fetched.unwrap(), 1);
    let s = store.lock().unwrap();
    assert!(!s.loading());
    assert_eq!(s.error(), None);
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_fails_before_any_request() {
    let sync = RemoteSync::new(FakeApi::new());
    let store = Mutex::new(ProjectStore::new());
    let id = store
        .lock()
        .unwrap()
        .add_optimistic(draft("Offline", ProjectStatus::Planned));
    let project = store.lock().unwrap().get(&id).cloned().unwrap();

    for token in ["", "   "] {
        assert!(matches!(
            sync.fetch_all(&store, token).await,
            Err(SyncError::MissingCredential)
        ));
        assert!(matches!(
            sync.create_remote(&store, &project, token).await,
            Err(SyncError::MissingCredential)
        ));
        assert!(matches!(
            sync.update_remote(&store, &project, token).await,
            Err(SyncError::MissingCredential)
        ));
        assert!(matches!(
            sync.delete_remote(&store, &id, token).await,
            Err(SyncError::MissingCredential)
        ));
    }

    assert_eq!(sync.api().calls(), 0);
    let s = store.lock().unwrap();
    assert_eq!(s.sync_status(&id), Some(SyncStatus::Pending));
    assert!(!s.loading());
}
