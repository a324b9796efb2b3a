pub mod config;
pub mod events;
pub mod nudge;
pub mod plan;

use std::path::Path;

use chrono::{DateTime, FixedOffset, Local};
use studycal_core::{read_events_document, ValidationError};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// `--now` override, or the local wall clock.
pub fn resolve_now(now: Option<&str>) -> CliResult<DateTime<FixedOffset>> {
    match now {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw).map_err(|_| {
            ValidationError::InvalidDate {
                field: "now".into(),
                value: raw.into(),
            }
        })?),
        None => Ok(Local::now().fixed_offset()),
    }
}

/// Read the events file as an untyped JSON document.
pub fn load_document(path: &Path) -> CliResult<serde_json::Value> {
    read_events_document(path)
        .map_err(|e| -> Box<dyn std::error::Error> { format!("{}: {e}", path.display()).into() })
}
