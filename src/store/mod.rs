//! In-memory project store.
//!
//! The store owns the project collection for one session. Synchronous
//! mutations apply immediately; the asynchronous remote operations in
//! [`sync`] call the API and then fold the outcome back in through
//! [`reconcile`].

pub mod reconcile;
pub mod sync;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::project::{Project, ProjectDraft};

pub use sync::{Operation, RemoteSync, SyncError};

/// Where a local entry stands relative to the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Changed locally, server has not confirmed
    #[default]
    Pending,
    Confirmed,
    /// The last remote call for this entry failed; local state was kept
    Failed,
}

/// A project plus its local sync bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEntry {
    pub project: Project,
    #[serde(default)]
    pub sync: SyncStatus,
}

/// The project collection, keyed by id, in insertion order
#[derive(Debug, Default)]
pub struct ProjectStore {
    entries: IndexMap<String, StoreEntry>,
    loading: bool,
    error: Option<String>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted entries. A repeated id keeps the
    /// first position and the last value.
    pub fn from_entries(entries: Vec<StoreEntry>) -> Self {
        let mut store = ProjectStore::new();
        for entry in entries {
            store.entries.insert(entry.project.id.clone(), entry);
        }
        store
    }

    pub fn entries(&self) -> impl Iterator<Item = &StoreEntry> {
        self.entries.values()
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.entries.values().map(|e| &e.project)
    }

    /// Owned copy of the collection, in store order
    pub fn snapshot(&self) -> Vec<Project> {
        self.projects().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.entries.get(id).map(|e| &e.project)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn sync_status(&self, id: &str) -> Option<SyncStatus> {
        self.entries.get(id).map(|e| e.sync)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True while a full fetch is in flight
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Error retained from the last failed fetch
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True for ids minted by [`add_optimistic`](Self::add_optimistic) that
    /// the server has not replaced yet.
    pub fn is_local_id(id: &str) -> bool {
        Uuid::parse_str(id).is_ok()
    }

    /// Insert a new project under a fresh temporary id and return that id.
    pub fn add_optimistic(&mut self, draft: ProjectDraft) -> String {
        let mut id = Uuid::new_v4().to_string();
        while self.entries.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }
        let project = draft.into_project(id.clone());
        self.entries.insert(
            id.clone(),
            StoreEntry {
                project,
                sync: SyncStatus::Pending,
            },
        );
        id
    }

    /// Replace the project with the same id in place. Unknown ids are ignored.
    pub fn update(&mut self, project: Project) -> bool {
        match self.entries.get_mut(&project.id) {
            Some(entry) => {
                entry.project = project;
                entry.sync = SyncStatus::Pending;
                true
            }
            None => false,
        }
    }

    /// Remove the project with this id, keeping the order of the rest.
    /// Unknown ids are ignored.
    pub fn delete(&mut self, id: &str) -> bool {
        self.entries.shift_remove(id).is_some()
    }

    fn set_sync(&mut self, id: &str, status: SyncStatus) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.sync = status;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::ProjectStatus;
    use pretty_assertions::assert_eq;

    fn draft(name: &str) -> ProjectDraft {
        ProjectDraft::new(name)
    }

    fn names(store: &ProjectStore) -> Vec<String> {
        store.projects().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn add_optimistic_assigns_unique_pending_ids() {
        let mut store = ProjectStore::new();
        let a = store.add_optimistic(draft("Alpha"));
        let b = store.add_optimistic(draft("Beta"));
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&a).unwrap().name, "Alpha");
        assert_eq!(store.sync_status(&b), Some(SyncStatus::Pending));
    }

    #[test]
    fn local_ids_are_distinguishable_from_server_ids() {
        let mut store = ProjectStore::new();
        let id = store.add_optimistic(draft("Alpha"));
        assert!(ProjectStore::is_local_id(&id));
        assert!(!ProjectStore::is_local_id("6650f1c2a9e4b1d2c3f4a5b6"));
        assert!(!ProjectStore::is_local_id("42"));
    }

    #[test]
    fn update_replaces_in_place() {
        let mut store = ProjectStore::new();
        store.add_optimistic(draft("Alpha"));
        let b = store.add_optimistic(draft("Beta"));
        store.add_optimistic(draft("Gamma"));

        let mut edited = store.get(&b).unwrap().clone();
        edited.name = "Beta 2".into();
        edited.status = Some(ProjectStatus::Completed);
        assert!(store.update(edited));

        assert_eq!(names(&store), vec!["Alpha", "Beta 2", "Gamma"]);
        assert_eq!(store.get(&b).unwrap().status, Some(ProjectStatus::Completed));
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let mut store = ProjectStore::new();
        store.add_optimistic(draft("Alpha"));
        let ghost = draft("Ghost").into_project("nope".into());
        assert!(!store.update(ghost));
        assert_eq!(names(&store), vec!["Alpha"]);
    }

    #[test]
    fn delete_is_idempotent_and_keeps_order() {
        let mut store = ProjectStore::new();
        store.add_optimistic(draft("Alpha"));
        let b = store.add_optimistic(draft("Beta"));
        store.add_optimistic(draft("Gamma"));

        assert!(store.delete(&b));
        let after_first = store.snapshot();
        assert!(!store.delete(&b));
        assert_eq!(store.snapshot(), after_first);
        assert_eq!(names(&store), vec!["Alpha", "Gamma"]);
    }

    #[test]
    fn from_entries_dedupes_ids() {
        let p1 = draft("One").into_project("1".into());
        let mut p1b = p1.clone();
        p1b.name = "One again".into();
        let p2 = draft("Two").into_project("2".into());
        let store = ProjectStore::from_entries(vec![
            StoreEntry { project: p1, sync: SyncStatus::Confirmed },
            StoreEntry { project: p2, sync: SyncStatus::Confirmed },
            StoreEntry { project: p1b, sync: SyncStatus::Failed },
        ]);
        assert_eq!(names(&store), vec!["One again", "Two"]);
        assert_eq!(store.sync_status("1"), Some(SyncStatus::Failed));
    }
}
