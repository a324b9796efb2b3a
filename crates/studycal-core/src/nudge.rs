//! Study-hours reminders.
//!
//! [`NudgeTracker`] remembers the hours a user entered for an event and when
//! they last dismissed a reminder, and decides which planned events should
//! prompt again. State lives in an injected [`KeyValueStore`] under a single
//! JSON document; the tracker holds no global state.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::event::parse_hours;
use crate::planner::{StudyEvent, StudyPlan};
use crate::store::KeyValueStore;

/// Store key holding the serialized [`NudgeState`].
pub const NUDGE_STATE_KEY: &str = "nudgeManager";

/// Hours a dismissed reminder stays hidden.
pub const DEFAULT_SNOOZE_HOURS: u32 = 4;

/// Daily study load above which an event needs attention.
pub const DEFAULT_DAILY_HOURS_LIMIT: f64 = 4.0;

/// Reminder tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NudgeConfig {
    #[serde(default = "default_snooze_hours")]
    pub snooze_hours: u32,
    #[serde(default = "default_daily_hours_limit")]
    pub daily_hours_limit: f64,
}

fn default_snooze_hours() -> u32 {
    DEFAULT_SNOOZE_HOURS
}
fn default_daily_hours_limit() -> f64 {
    DEFAULT_DAILY_HOURS_LIMIT
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            snooze_hours: DEFAULT_SNOOZE_HOURS,
            daily_hours_limit: DEFAULT_DAILY_HOURS_LIMIT,
        }
    }
}

/// Persisted reminder state, keyed by event id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NudgeState {
    #[serde(default)]
    pub study_hours: BTreeMap<String, f64>,
    #[serde(default, rename = "dismissedExams")]
    pub dismissed: BTreeMap<String, DateTime<Utc>>,
}

/// Per-event study load ahead of its start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparationAnalysis {
    pub event_id: String,
    pub title: String,
    /// Whole days until the event starts, rounded up, at least 1
    pub days_until: i64,
    pub total_study_hours: f64,
    pub recommended_daily_hours: f64,
    pub needs_attention: bool,
    pub last_dismissed: Option<DateTime<Utc>>,
}

/// Tracks entered study hours and reminder dismissals.
pub struct NudgeTracker<S> {
    store: S,
    config: NudgeConfig,
    state: NudgeState,
}

impl<S: KeyValueStore> NudgeTracker<S> {
    /// Load state from `store`.
    ///
    /// A missing entry starts empty. An entry that no longer parses is
    /// discarded with a warning so reminders keep working.
    pub fn load(store: S, config: NudgeConfig) -> Result<Self> {
        let state = match store.get(NUDGE_STATE_KEY)? {
            None => NudgeState::default(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "discarding unreadable reminder state");
                NudgeState::default()
            }),
        };
        Ok(Self {
            store,
            config,
            state,
        })
    }

    fn save(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.state).map_err(|source| StoreError::Encode {
            key: NUDGE_STATE_KEY.to_string(),
            source,
        })?;
        self.store.set(NUDGE_STATE_KEY, &raw)?;
        Ok(())
    }

    pub fn state(&self) -> &NudgeState {
        &self.state
    }

    pub fn config(&self) -> &NudgeConfig {
        &self.config
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Hours the user entered for `event_id`.
    pub fn study_hours(&self, event_id: &str) -> Option<f64> {
        self.state.study_hours.get(event_id).copied()
    }

    /// Record user-entered hours.
    ///
    /// A positive number is stored and clears any dismissal. Anything else
    /// removes the stored value so the reminder shows again. Returns the
    /// stored value.
    pub fn set_study_hours(&mut self, event_id: &str, input: &str) -> Result<Option<f64>> {
        let hours = parse_hours(input).filter(|h| *h > 0.0);
        match hours {
            Some(h) => {
                self.state.study_hours.insert(event_id.to_string(), h);
                self.state.dismissed.remove(event_id);
            }
            None => {
                debug!(event_id, input, "rejected study hours input");
                self.state.study_hours.remove(event_id);
            }
        }
        self.save()?;
        Ok(hours)
    }

    /// Snooze the reminder for `event_id` starting at `at`.
    pub fn dismiss<Tz: TimeZone>(&mut self, event_id: &str, at: &DateTime<Tz>) -> Result<()> {
        self.state
            .dismissed
            .insert(event_id.to_string(), at.with_timezone(&Utc));
        self.save()
    }

    pub fn last_dismissed(&self, event_id: &str) -> Option<DateTime<Utc>> {
        self.state.dismissed.get(event_id).copied()
    }

    /// Whether a reminder for `event_id` may show at `now`.
    pub fn should_show<Tz: TimeZone>(&self, event_id: &str, now: &DateTime<Tz>) -> bool {
        match self.last_dismissed(event_id) {
            None => true,
            Some(at) => {
                let elapsed = now.with_timezone(&Utc) - at;
                elapsed.num_hours() >= i64::from(self.config.snooze_hours)
            }
        }
    }

    /// Planned events that should prompt for an hour estimate now.
    pub fn pending_prompts<'a, Tz: TimeZone>(
        &self,
        plan: &'a StudyPlan,
        now: &DateTime<Tz>,
    ) -> Vec<&'a StudyEvent> {
        plan.needing_input()
            .filter(|e| self.study_hours(&e.event.id).is_none())
            .filter(|e| self.should_show(&e.event.id, now))
            .collect()
    }

    /// Daily study load for each planned event that has not started yet.
    pub fn analyze<Tz: TimeZone>(&self, plan: &StudyPlan, now: &DateTime<Tz>) -> Vec<PreparationAnalysis> {
        let now_local = now.naive_local();

        plan.events
            .iter()
            .filter_map(|planned| {
                let start = planned.event.start_datetime()?;
                if start <= now_local {
                    return None;
                }

                let secs = (start - now_local).num_seconds();
                let days_until = ((secs + 86_399) / 86_400).max(1);
                let total_study_hours = self
                    .study_hours(&planned.event.id)
                    .unwrap_or(planned.suggested_study_hours);
                let recommended_daily_hours = (total_study_hours / days_until as f64).ceil();

                Some(PreparationAnalysis {
                    event_id: planned.event.id.clone(),
                    title: planned.event.title.clone(),
                    days_until,
                    total_study_hours,
                    recommended_daily_hours,
                    needs_attention: recommended_daily_hours > self.config.daily_hours_limit,
                    last_dismissed: self.last_dismissed(&planned.event.id),
                })
            })
            .collect()
    }
}
