use std::fs;
use std::path::{Path, PathBuf};

use crate::io::{atomic_write, paths};
use crate::model::config::Config;
use crate::ops::view::SortKey;

/// Environment variable that overrides `api.base_url`
pub const API_URL_ENV: &str = "DEVSYNC_API_URL";

/// Keys accepted by `config set`
pub const KNOWN_KEYS: &[&str] = &[
    "api.base_url",
    "report.title",
    "report.file_name",
    "list.default_sort",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
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
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("unknown config key '{0}' (expected one of: {keys})", keys = KNOWN_KEYS.join(", "))]
    UnknownKey(String),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Read config.toml from `home`; a missing file yields the defaults.
pub fn read_config(home: &Path) -> Result<Config, ConfigError> {
    let path = paths::config_path(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// The API base URL, with `DEVSYNC_API_URL` taking precedence over config.
pub fn resolve_api_url(config: &Config) -> String {
    match std::env::var(API_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => url,
        _ => config.api.base_url.clone(),
    }
}

/// Set `key` (dotted `table.field`) to `value`, preserving the rest of the
/// file's formatting and comments.
pub fn set_value(home: &Path, key: &str, value: &str) -> Result<(), ConfigError> {
    if !KNOWN_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }
    validate_value(key, value)?;

    let path = paths::config_path(home);
    let text = if path.exists() {
        fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?
    } else {
        String::new()
    };

    let mut doc: toml_edit::DocumentMut = text.parse()?;
    let Some((table, field)) = key.split_once('.') else {
        return Err(ConfigError::UnknownKey(key.to_string()));
    };
    if !doc.contains_key(table) {
        doc[table] = toml_edit::table();
    }
    doc[table][field] = toml_edit::value(value);

    let updated = doc.to_string();
    // Must still load as a Config
    toml::from_str::<Config>(&updated)?;
    atomic_write(&path, updated.as_bytes()).map_err(|e| ConfigError::WriteError {
        path: path.clone(),
        source: e,
    })?;
    Ok(())
}

fn validate_value(key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: key.to_string(),
        reason,
    };
    match key {
        "list.default_sort" => value.parse::<SortKey>().map(|_| ()).map_err(invalid),
        "api.base_url" if !(value.starts_with("http://") || value.starts_with("https://")) => {
            Err(invalid("expected an http:// or https:// URL".into()))
        }
        "report.file_name" if value.trim().is_empty() => {
            Err(invalid("file name must not be empty".into()))
        }
        _ => Ok(()),
    }
}
