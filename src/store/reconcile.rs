//! Folding confirmed remote results back into the store.

use super::{ProjectStore, SyncStatus};
use crate::model::project::Project;

/// What happened when a create confirmation was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The temporary entry now carries the server id
    Renamed,
    /// An entry with the server id was already present (a fetch landed
    /// first); the temporary duplicate was dropped
    Merged,
    /// No entry carries the temporary id any more
    Missing,
}

/// Rewrite the id of the entry created under `temp_id` to `server_id`.
///
/// Only the id changes: position and every other field stay as currently
/// stored, so edits made while the create was in flight survive.
pub fn apply_created(store: &mut ProjectStore, temp_id: &str, server_id: &str) -> CreateOutcome {
    let Some(index) = store.entries.get_index_of(temp_id) else {
        return CreateOutcome::Missing;
    };
    if temp_id == server_id {
        store.set_sync(server_id, SyncStatus::Confirmed);
        return CreateOutcome::Renamed;
    }
    if store.entries.contains_key(server_id) {
        store.entries.shift_remove_index(index);
        return CreateOutcome::Merged;
    }
    let Some((_, mut entry)) = store.entries.shift_remove_index(index) else {
        return CreateOutcome::Missing;
    };
    entry.project.id = server_id.to_string();
    entry.sync = SyncStatus::Confirmed;
    let (new_index, _) = store.entries.insert_full(server_id.to_string(), entry);
    store.entries.move_index(new_index, index);
    CreateOutcome::Renamed
}

/// Overwrite the local record with the value the server accepted.
pub fn apply_updated(store: &mut ProjectStore, project: Project) -> bool {
    let id = project.id.clone();
    let hit = store.update(project);
    if hit {
        store.set_sync(&id, SyncStatus::Confirmed);
    }
    hit
}

/// Mirror a confirmed remote delete.
pub fn apply_deleted(store: &mut ProjectStore, id: &str) -> bool {
    store.delete(id)
}

/// Replace the whole collection with the server's view.
pub fn apply_fetched(store: &mut ProjectStore, projects: Vec<Project>) {
    store.entries.clear();
    for project in projects {
        store.entries.insert(
            project.id.clone(),
            super::StoreEntry {
                project,
                sync: SyncStatus::Confirmed,
            },
        );
    }
}

/// Tag an entry whose remote call failed. Nothing is reverted.
pub fn apply_failed(store: &mut ProjectStore, id: &str) -> bool {
    store.set_sync(id, SyncStatus::Failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::{ProjectDraft, ProjectStatus};
    use pretty_assertions::assert_eq;

    fn ids(store: &ProjectStore) -> Vec<String> {
        store.projects().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn created_renames_in_place() {
        let mut store = ProjectStore::new();
        let a = store.add_optimistic(ProjectDraft::new("Alpha"));
        let temp = store.add_optimistic(ProjectDraft::new("Beta"));
        let c = store.add_optimistic(ProjectDraft::new("Gamma"));

        let before = store.get(&temp).unwrap().clone();
        assert_eq!(apply_created(&mut store, &temp, "srv-42"), CreateOutcome::Renamed);

        assert_eq!(ids(&store), vec![a, "srv-42".to_string(), c]);
        let after = store.get("srv-42").unwrap();
        assert_eq!(after.name, before.name);
        assert_eq!(after.tech, before.tech);
        assert_eq!(after.status, before.status);
        assert!(!store.contains(&temp));
        assert_eq!(store.sync_status("srv-42"), Some(SyncStatus::Confirmed));
    }

    #[test]
    fn created_keeps_edits_made_in_flight() {
        let mut store = ProjectStore::new();
        let temp = store.add_optimistic(ProjectDraft::new("Draft name"));

        let mut edited = store.get(&temp).unwrap().clone();
        edited.name = "Edited name".into();
        edited.status = Some(ProjectStatus::InProgress);
        store.update(edited);

        apply_created(&mut store, &temp, "srv-1");
        let p = store.get("srv-1").unwrap();
        assert_eq!(p.name, "Edited name");
        assert_eq!(p.status, Some(ProjectStatus::InProgress));
    }

    #[test]
    fn created_after_local_delete_is_missing() {
        let mut store = ProjectStore::new();
        let temp = store.add_optimistic(ProjectDraft::new("Gone"));
        store.delete(&temp);
        assert_eq!(apply_created(&mut store, &temp, "srv-1"), CreateOutcome::Missing);
        assert!(store.is_empty());
    }

    #[test]
    fn created_merges_when_server_id_already_present() {
        let mut store = ProjectStore::new();
        let temp = store.add_optimistic(ProjectDraft::new("Dup"));
        apply_fetched(
            &mut store,
            vec![ProjectDraft::new("Dup").into_project("srv-1".into())],
        );
        // Fetch replaced everything; re-add the optimistic row to simulate
        // a fetch that already included the created project.
        let temp2 = store.add_optimistic(ProjectDraft::new("Dup"));
        assert_eq!(apply_created(&mut store, &temp2, "srv-1"), CreateOutcome::Merged);
        assert_eq!(ids(&store), vec!["srv-1".to_string()]);
        assert!(!store.contains(&temp));
    }

    #[test]
    fn fetched_replaces_everything_as_confirmed() {
        let mut store = ProjectStore::new();
        store.add_optimistic(ProjectDraft::new("Local"));
        apply_fetched(
            &mut store,
            vec![
                ProjectDraft::new("A").into_project("a".into()),
                ProjectDraft::new("B").into_project("b".into()),
            ],
        );
        assert_eq!(ids(&store), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.sync_status("b"), Some(SyncStatus::Confirmed));
    }

    #[test]
    fn failed_tags_without_reverting() {
        let mut store = ProjectStore::new();
        let temp = store.add_optimistic(ProjectDraft::new("Orphan"));
        assert!(apply_failed(&mut store, &temp));
        assert_eq!(store.sync_status(&temp), Some(SyncStatus::Failed));
        assert_eq!(store.get(&temp).unwrap().name, "Orphan");
        assert!(!apply_failed(&mut store, "unknown"));
    }

    #[test]
    fn updated_and_deleted_are_idempotent() {
        let mut store = ProjectStore::new();
        apply_fetched(&mut store, vec![ProjectDraft::new("A").into_project("a".into())]);
        let mut edited = store.get("a").unwrap().clone();
        edited.description = "new".into();

        assert!(apply_updated(&mut store, edited.clone()));
        assert!(apply_updated(&mut store, edited.clone()));
        assert_eq!(store.get("a"), Some(&edited));
        assert_eq!(store.sync_status("a"), Some(SyncStatus::Confirmed));

        assert!(apply_deleted(&mut store, "a"));
        assert!(!apply_deleted(&mut store, "a"));
        assert!(store.is_empty());
    }
}
