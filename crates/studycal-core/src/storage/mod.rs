mod config;

pub use config::Config;

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, CoreError};

/// Returns `~/.config/studycal[-dev]/` based on STUDYCAL_ENV.
///
/// Set STUDYCAL_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STUDYCAL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("studycal-dev")
    } else {
        base_dir.join("studycal")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Read an events document (normally a JSON array of event records).
///
/// Only I/O and JSON syntax errors are reported here; the planner decides
/// what to do with a document of the wrong shape.
pub fn read_events_document(path: &Path) -> Result<serde_json::Value, CoreError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Decode an events document into records, skipping entries that are not
/// event records. A document that is not an array yields no events.
pub fn events_from_document(document: &serde_json::Value) -> Vec<crate::event::EventRecord> {
    use serde::Deserialize;

    document
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| crate::event::EventRecord::deserialize(item).ok())
                .collect()
        })
        .unwrap_or_default()
}
