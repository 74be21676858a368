use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";
pub const SESSION_FILE: &str = "session.toml";
pub const CACHE_FILE: &str = "projects.json";

/// The DevSync home directory: `$DEVSYNC_HOME`, else
/// `$XDG_CONFIG_HOME/devsync`, else `~/.config/devsync`.
pub fn devsync_home() -> PathBuf {
    if let Ok(dir) = std::env::var("DEVSYNC_HOME")
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"));
    config_dir.join("devsync")
}

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE)
}

pub fn session_path(home: &Path) -> PathBuf {
    home.join(SESSION_FILE)
}

pub fn cache_path(home: &Path) -> PathBuf {
    home.join(CACHE_FILE)
}
