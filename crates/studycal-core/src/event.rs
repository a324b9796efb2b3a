//! Calendar event records as stored by the calendar front end.
//!
//! Records are immutable snapshots owned by whatever persists them. Dates are
//! kept as the raw ISO-8601 strings the front end wrote, and parsed on demand
//! so that one malformed record never prevents the rest from loading.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// A single calendar event.
///
/// Field names follow the camelCase JSON layout of the stored records.
/// Optional fields default when missing; unknown fields are kept in
/// [`EventRecord::extra`] so a record round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO date (all-day) or date-time
    #[serde(default, deserialize_with = "null_as_default")]
    pub start: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub all_day: bool,
    /// Repeats weekly on the weekday of `start`
    #[serde(default, deserialize_with = "null_as_default")]
    pub recurring: bool,
    /// Last day (inclusive) of a weekly recurrence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_until: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requires_preparation: bool,
    /// User estimate of preparation hours, as typed into the form.
    /// Stored records carry either a string or a number here.
    #[serde(
        default,
        deserialize_with = "deserialize_hours",
        skip_serializing_if = "Option::is_none"
    )]
    pub preparation_hours: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Upper bound of a weekly recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatUntil {
    /// No end date; repeats indefinitely
    Unbounded,
    /// Repeats up to and including this day
    Until(NaiveDate),
    /// An end date was given but could not be parsed
    Malformed,
}

impl EventRecord {
    /// Create a one-off event starting at `start`.
    pub fn new(id: impl Into<String>, title: impl Into<String>, start: impl Into<String>) -> Self {
        let start = start.into();
        Self {
            id: id.into(),
            title: title.into(),
            end: start.clone(),
            all_day: !start.contains('T'),
            start,
            ..Self::default()
        }
    }

    /// Mark the event as repeating weekly, optionally until `until`.
    pub fn weekly(mut self, until: Option<&str>) -> Self {
        self.recurring = true;
        self.repeat_until = until.map(str::to_string);
        self
    }

    /// Mark the event as needing preparation with an optional hour estimate.
    pub fn with_preparation(mut self, hours: Option<&str>) -> Self {
        self.requires_preparation = true;
        self.preparation_hours = hours.map(str::to_string);
        self
    }

    /// Calendar date of `start`, or `None` if it is malformed.
    pub fn start_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.start)
    }

    /// Start as a wall-clock date-time; date-only values are midnight.
    pub fn start_datetime(&self) -> Option<NaiveDateTime> {
        parse_local_datetime(&self.start)
    }

    /// Date portion of `start` as written, used to group events by day.
    pub fn start_date_key(&self) -> &str {
        self.start.trim().split('T').next().unwrap_or_default()
    }

    /// Interpret `repeat_until`. An empty string counts as no end date.
    pub fn repeat_until(&self) -> RepeatUntil {
        match self.repeat_until.as_deref().map(str::trim) {
            None | Some("") => RepeatUntil::Unbounded,
            Some(raw) => parse_calendar_date(raw)
                .map(RepeatUntil::Until)
                .unwrap_or(RepeatUntil::Malformed),
        }
    }

    /// Parsed preparation hours.
    ///
    /// `None` when absent, blank, non-numeric, negative or non-finite.
    pub fn preparation_hours(&self) -> Option<f64> {
        parse_hours(self.preparation_hours.as_deref()?)
    }

    /// True when the event needs preparation but has no usable estimate.
    pub fn needs_preparation_input(&self) -> bool {
        self.requires_preparation && self.preparation_hours().is_none()
    }
}

/// Parse a non-negative, finite hour count typed by a user.
pub fn parse_hours(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>()
        .ok()
        .filter(|h| h.is_finite() && *h >= 0.0)
}

/// Parse an ISO-8601 date or date-time to its wall-clock value.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM`, `YYYY-MM-DDTHH:MM:SS[.fff]`
/// and RFC 3339 with an offset. Offsets are not normalized: the result is
/// the local time as written.
pub fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Calendar date of an ISO-8601 value, time-of-day discarded.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    parse_local_datetime(raw).map(|dt| dt.date())
}

/// Parse a calendar date supplied by a caller, reporting which field failed.
pub fn require_date(field: &str, raw: &str) -> Result<NaiveDate, ValidationError> {
    parse_calendar_date(raw).ok_or_else(|| ValidationError::InvalidDate {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// Stored records carry explicit `null`s for blank fields; treat them as absent.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_hours<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_only() {
        assert_eq!(parse_calendar_date("2025-03-15"), Some(ymd(2025, 3, 15)));
    }

    #[test]
    fn test_parse_form_datetime_without_seconds() {
        let dt = parse_local_datetime("2025-03-15T09:30").unwrap();
        assert_eq!(dt.date(), ymd(2025, 3, 15));
        assert_eq!(dt.format("%H:%M").to_string(), "09:30");
    }

    #[test]
    fn test_parse_datetime_with_fraction() {
        let dt = parse_local_datetime("2025-03-15T09:30:12.500").unwrap();
        assert_eq!(dt.date(), ymd(2025, 3, 15));
    }

    #[test]
    fn test_parse_rfc3339_keeps_written_date() {
        // Late evening in a negative offset stays on the written day
        assert_eq!(
            parse_calendar_date("2025-03-15T23:30:00-05:00"),
            Some(ymd(2025, 3, 15))
        );
        assert_eq!(parse_calendar_date("2025-03-15T00:00:00Z"), Some(ymd(2025, 3, 15)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("next tuesday"), None);
        assert_eq!(parse_calendar_date("2025-02-30"), None);
    }

    #[test]
    fn test_require_date_names_field() {
        assert_eq!(require_date("day", "2025-03-15T10:00").unwrap(), ymd(2025, 3, 15));
        let err = require_date("day", "tomorrow").unwrap_err();
        assert_eq!(err.to_string(), "Invalid date 'tomorrow' for 'day'");
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let event: EventRecord = serde_json::from_str(r#"{"id":"1","start":"2025-03-15"}"#).unwrap();
        assert_eq!(event.id, "1");
        assert!(!event.recurring);
        assert!(!event.requires_preparation);
        assert_eq!(event.preparation_hours, None);
        assert_eq!(event.repeat_until(), RepeatUntil::Unbounded);
    }

    #[test]
    fn test_deserialize_null_fields_as_defaults() {
        let event: EventRecord = serde_json::from_str(
            r#"{"id":"w","title":null,"start":"2025-03-15","end":null,"allDay":null,
                "recurring":null,"requiresPreparation":null}"#,
        )
        .unwrap();
        assert_eq!(event.title, "");
        assert_eq!(event.end, "");
        assert!(!event.all_day);
        assert!(!event.recurring);
        assert!(!event.requires_preparation);

        let weekly: EventRecord =
            serde_json::from_str(r#"{"id":"w","start":"2025-03-15","end":null,"recurring":true}"#).unwrap();
        assert!(weekly.recurring);
        assert_eq!(weekly.start_date(), Some(ymd(2025, 3, 15)));
    }

    #[test]
    fn test_deserialize_numeric_preparation_hours() {
        let event: EventRecord = serde_json::from_str(
            r#"{"id":"1","start":"2025-03-15","requiresPreparation":true,"preparationHours":4.5}"#,
        )
        .unwrap();
        assert_eq!(event.preparation_hours.as_deref(), Some("4.5"));
        assert_eq!(event.preparation_hours(), Some(4.5));
    }

    #[test]
    fn test_deserialize_null_preparation_hours() {
        let event: EventRecord =
            serde_json::from_str(r#"{"id":"1","start":"2025-03-15","preparationHours":null}"#).unwrap();
        assert_eq!(event.preparation_hours, None);
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let raw = r##"{"id":"1","title":"Lab","start":"2025-03-15","color":"#ff0000","type":"exam"}"##;
        let event: EventRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(event.extra.get("color"), Some(&Value::String("#ff0000".into())));

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["type"], "exam");
        assert_eq!(back["allDay"], false);
    }

    #[test]
    fn test_repeat_until_states() {
        let base = EventRecord::new("1", "Lecture", "2025-03-15");
        assert_eq!(base.clone().weekly(None).repeat_until(), RepeatUntil::Unbounded);
        assert_eq!(base.clone().weekly(Some("")).repeat_until(), RepeatUntil::Unbounded);
        assert_eq!(
            base.clone().weekly(Some("2025-04-01")).repeat_until(),
            RepeatUntil::Until(ymd(2025, 4, 1))
        );
        assert_eq!(base.weekly(Some("soon")).repeat_until(), RepeatUntil::Malformed);
    }

    #[test]
    fn test_preparation_hours_validation() {
        let event = |h: &str| EventRecord::new("1", "Exam", "2025-03-15").with_preparation(Some(h));
        assert_eq!(event("5").preparation_hours(), Some(5.0));
        assert_eq!(event(" 2.5 ").preparation_hours(), Some(2.5));
        assert_eq!(event("").preparation_hours(), None);
        assert_eq!(event("abc").preparation_hours(), None);
        assert_eq!(event("-1").preparation_hours(), None);
        assert_eq!(event("NaN").preparation_hours(), None);
        assert_eq!(event("inf").preparation_hours(), None);
    }

    #[test]
    fn test_needs_preparation_input() {
        let base = EventRecord::new("1", "Exam", "2025-03-15");
        assert!(!base.needs_preparation_input());
        assert!(base.clone().with_preparation(None).needs_preparation_input());
        assert!(base.clone().with_preparation(Some("")).needs_preparation_input());
        assert!(!base.with_preparation(Some("3")).needs_preparation_input());
    }

    #[test]
    fn test_start_date_key() {
        assert_eq!(EventRecord::new("1", "A", "2025-03-16T09:00").start_date_key(), "2025-03-16");
        assert_eq!(EventRecord::new("1", "A", "2025-03-16").start_date_key(), "2025-03-16");
        assert_eq!(EventRecord::new("1", "A", " 2025-03-16T09:00 ").start_date_key(), "2025-03-16");
    }

    #[test]
    fn test_new_infers_all_day() {
        assert!(EventRecord::new("1", "A", "2025-03-16").all_day);
        assert!(!EventRecord::new("1", "A", "2025-03-16T09:00").all_day);
    }
}
