//! Study plan computation.
//!
//! Looks ahead from "now" for events flagged as needing preparation,
//! annotates each with the hours to set aside, and aggregates the result
//! by day. Selection is driven only by the explicit `requiresPreparation`
//! flag on each event.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::event::EventRecord;

/// Days ahead of today that count as upcoming.
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 14;

/// Hours suggested when an event has no usable estimate.
pub const DEFAULT_STUDY_HOURS: f64 = 3.0;

/// JSON keys written by [`StudyEvent`] next to the flattened record.
const ANNOTATION_KEYS: [&str; 3] = [
    "requiresStudy",
    "suggestedStudyHours",
    "needsPreparationInput",
];

/// Planner tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,
    #[serde(default = "default_study_hours")]
    pub default_study_hours: f64,
}

fn default_lookahead_days() -> u32 {
    DEFAULT_LOOKAHEAD_DAYS
}
fn default_study_hours() -> f64 {
    DEFAULT_STUDY_HOURS
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
            default_study_hours: DEFAULT_STUDY_HOURS,
        }
    }
}

/// An event selected for the study plan, with its study annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyEvent {
    #[serde(flatten)]
    pub event: EventRecord,
    /// Always true for planned events
    pub requires_study: bool,
    pub suggested_study_hours: f64,
    /// The user should be prompted for an hour estimate
    pub needs_preparation_input: bool,
}

/// Upcoming events that need preparation, with totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub events: Vec<StudyEvent>,
    pub total_study_hours: f64,
    pub event_count: usize,
    /// Keyed by the ISO date of each event's start
    pub events_by_date: BTreeMap<String, Vec<StudyEvent>>,
}

impl StudyPlan {
    /// Aggregate annotated events. Group order follows input order.
    pub fn from_events(events: Vec<StudyEvent>) -> Self {
        let total_study_hours = events.iter().map(|e| e.suggested_study_hours).sum();

        let mut events_by_date: BTreeMap<String, Vec<StudyEvent>> = BTreeMap::new();
        for event in &events {
            events_by_date
                .entry(event.event.start_date_key().to_string())
                .or_default()
                .push(event.clone());
        }

        Self {
            event_count: events.len(),
            total_study_hours,
            events_by_date,
            events,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Planned events that still lack an hour estimate.
    pub fn needing_input(&self) -> impl Iterator<Item = &StudyEvent> {
        self.events.iter().filter(|e| e.needs_preparation_input)
    }
}

/// Computes study plans from a set of events.
#[derive(Debug, Clone, Default)]
pub struct StudyPlanner {
    config: PlannerConfig,
}

impl StudyPlanner {
    /// Planner with the default two-week window and three-hour default.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Set the lookahead window in days
    pub fn with_lookahead_days(mut self, days: u32) -> Self {
        self.config.lookahead_days = days;
        self
    }

    /// Set the hours suggested when an event has no estimate
    pub fn with_default_hours(mut self, hours: f64) -> Self {
        self.config.default_study_hours = hours;
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Inclusive date window `[today, today + lookahead]` as seen from `now`.
    pub fn window<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> (NaiveDate, NaiveDate) {
        let today = now.date_naive();
        let end = now
            .clone()
            .checked_add_signed(Duration::days(i64::from(self.config.lookahead_days)))
            .map(|end| end.date_naive())
            .unwrap_or(NaiveDate::MAX);
        (today, end)
    }

    /// Events whose start day falls inside the lookahead window.
    ///
    /// Day granularity: an event earlier today still counts as upcoming.
    pub fn upcoming<'a, Tz: TimeZone>(
        &self,
        events: &'a [EventRecord],
        now: &DateTime<Tz>,
    ) -> Vec<&'a EventRecord> {
        let (from, to) = self.window(now);
        debug!(%from, %to, "scanning for upcoming events");

        let upcoming: Vec<_> = events
            .iter()
            .filter(|event| match event.start_date() {
                Some(day) => from <= day && day <= to,
                None => {
                    debug!(event_id = %event.id, start = %event.start, "skipping event with unparsable start");
                    false
                }
            })
            .collect();

        debug!(count = upcoming.len(), "events in lookahead window");
        upcoming
    }

    /// Attach study annotations to an event.
    ///
    /// Annotation keys left over in the record from an earlier plan are
    /// dropped so they are not serialized twice.
    pub fn annotate(&self, event: &EventRecord) -> StudyEvent {
        let mut event = event.clone();
        for key in ANNOTATION_KEYS {
            event.extra.remove(key);
        }

        StudyEvent {
            suggested_study_hours: event
                .preparation_hours()
                .unwrap_or(self.config.default_study_hours),
            needs_preparation_input: event.needs_preparation_input(),
            requires_study: true,
            event,
        }
    }

    /// Compute the study plan for `events` as of `now`.
    pub fn plan<Tz: TimeZone>(&self, events: &[EventRecord], now: &DateTime<Tz>) -> StudyPlan {
        let selected: Vec<StudyEvent> = self
            .upcoming(events, now)
            .into_iter()
            .filter(|event| event.requires_preparation)
            .map(|event| self.annotate(event))
            .collect();

        debug!(count = selected.len(), "events requiring preparation");
        StudyPlan::from_events(selected)
    }

    /// Compute a plan from an untyped JSON document.
    ///
    /// Anything other than an array yields the empty plan. Array elements
    /// that are not event records are skipped.
    pub fn plan_from_json<Tz: TimeZone>(&self, value: &Value, now: &DateTime<Tz>) -> StudyPlan {
        let Some(items) = value.as_array() else {
            warn!("no events provided or invalid events format");
            return StudyPlan::default();
        };

        let events: Vec<EventRecord> = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match EventRecord::deserialize(item) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!(index, error = %e, "skipping malformed event record");
                    None
                }
            })
            .collect();

        self.plan(&events, now)
    }
}

/// Compute the study plan with default settings.
pub fn compute_study_plan<Tz: TimeZone>(events: &[EventRecord], now: &DateTime<Tz>) -> StudyPlan {
    StudyPlanner::new().plan(events, now)
}

/// Compute the study plan from untyped JSON with default settings.
pub fn compute_study_plan_from_json<Tz: TimeZone>(value: &Value, now: &DateTime<Tz>) -> StudyPlan {
    StudyPlanner::new().plan_from_json(value, now)
}
