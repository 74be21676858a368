//! Local snapshot of the project store (`projects.json`), so optimistic
//! changes survive between commands.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::io::{atomic_write, paths};
use crate::store::{ProjectStore, StoreEntry};

const CACHE_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StoreIoError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is unreadable and could not be backed up to {backup}: {source}")]
    BackupError {
        path: PathBuf,
        backup: PathBuf,
        source: std::io::Error,
    },
    #[error("could not encode project cache: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    #[serde(default)]
    projects: Vec<StoreEntry>,
}

/// Load the cached store. A missing file is an empty store; a corrupted one
/// is copied to `projects.json.bak` and replaced by an empty store. If that
/// copy fails the load fails too, so nothing overwrites the only copy.
pub fn load_store(home: &Path) -> Result<ProjectStore, StoreIoError> {
    let path = paths::cache_path(home);
    if !path.exists() {
        return Ok(ProjectStore::new());
    }
    let content = fs::read_to_string(&path).map_err(|e| StoreIoError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    match serde_json::from_str::<CacheFile>(&content) {
        Ok(file) => Ok(ProjectStore::from_entries(file.projects)),
        Err(e) => {
            let bak = path.with_extension("json.bak");
            fs::copy(&path, &bak).map_err(|source| StoreIoError::BackupError {
                path: path.clone(),
                backup: bak.clone(),
                source,
            })?;
            tracing::warn!(
                path = %path.display(),
                backup = %bak.display(),
                error = %e,
                "project cache unreadable, starting empty"
            );
            Ok(ProjectStore::new())
        }
    }
}

/// Write the store snapshot atomically.
pub fn save_store(home: &Path, store: &ProjectStore) -> Result<(), StoreIoError> {
    let path = paths::cache_path(home);
    let file = CacheFile {
        version: CACHE_VERSION,
        projects: store.entries().cloned().collect(),
    };
    let content = serde_json::to_string_pretty(&file)?;
    atomic_write(&path, content.as_bytes()).map_err(|e| StoreIoError::WriteError {
        path: path.clone(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), count = store.len(), "saved project cache");
    Ok(())
}

/// Drop the cached store entirely (logout).
pub fn clear_store(home: &Path) -> std::io::Result<()> {
    match fs::remove_file(paths::cache_path(home)) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
