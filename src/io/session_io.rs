//! The persisted session: a bearer token and a user descriptor, stored as
//! string values in `session.toml`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::io::{atomic_write, paths};
use crate::model::session::{Session, UserInfo};

#[derive(Debug, thiserror::Error)]
pub enum SessionIoError {
    #[error("could not write session: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize session: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("could not encode user: {0}")]
    User(#[from] serde_json::Error),
}

/// On-disk layout. Both values are plain strings; `user` holds JSON text.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

/// Read the stored session. A missing, unreadable, or token-less file means
/// "not logged in".
pub fn read_session(home: &Path) -> Option<Session> {
    let path = paths::session_path(home);
    let content = fs::read_to_string(&path).ok()?;
    let file: SessionFile = match toml::from_str(&content) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
            return None;
        }
    };
    let token = file.token.filter(|t| !t.trim().is_empty())?;
    let user = file.user.and_then(|raw| match serde_json::from_str::<UserInfo>(&raw) {
        Ok(u) => Some(u),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed stored user");
            None
        }
    });
    Some(Session::new(token, user))
}

/// Persist the session, readable by the owner only.
pub fn write_session(home: &Path, session: &Session) -> Result<(), SessionIoError> {
    let user = session.user.as_ref().map(serde_json::to_string).transpose()?;
    let file = SessionFile {
        token: Some(session.token.clone()),
        user,
    };
    let content = toml::to_string_pretty(&file)?;
    let path = paths::session_path(home);
    atomic_write(&path, content.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

/// Remove the stored session. Returns whether one existed.
pub fn clear_session(home: &Path) -> std::io::Result<bool> {
    let path = paths::session_path(home);
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
