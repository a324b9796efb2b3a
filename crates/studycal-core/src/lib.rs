//! # studycal Core Library
//!
//! Core logic for the studycal calendar: deciding which days an event appears
//! on, and working out how much study time upcoming events need. The calendar
//! front end owns the event list and its persistence; everything here reads
//! immutable event snapshots and an explicit "now".
//!
//! ## Architecture
//!
//! - **Events**: [`EventRecord`], the stored event layout with tolerant date
//!   and hour parsing
//! - **Recurrence**: [`occurs_on`], the single occurrence predicate used by
//!   every calendar view
//! - **Planner**: [`compute_study_plan`], the two-week study plan
//! - **Nudges**: [`NudgeTracker`], reminder snoozing and user-entered hours
//!   over an injected [`KeyValueStore`]
//! - **Storage**: TOML configuration and the JSON state file

pub mod error;
pub mod event;
pub mod nudge;
pub mod planner;
pub mod recurrence;
pub mod storage;
pub mod store;

pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use event::{EventRecord, RepeatUntil};
pub use nudge::{NudgeConfig, NudgeState, NudgeTracker, PreparationAnalysis};
pub use planner::{
    compute_study_plan, compute_study_plan_from_json, PlannerConfig, StudyEvent, StudyPlan,
    StudyPlanner,
};
pub use recurrence::{events_on, occurrences_between, occurs_on};
pub use storage::{events_from_document, read_events_document, Config};
pub use store::{FileStore, KeyValueStore, MemoryStore};
