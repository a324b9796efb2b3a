//! Occurrence evaluation for one-off and weekly recurring events.
//!
//! Every calendar view (month, week, day) filters its events through
//! [`occurs_on`], so all views agree on which days an event appears.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::event::{EventRecord, RepeatUntil};

/// Whether `event` has an occurrence on `day`.
///
/// One-off events occur on the calendar day of their start. Recurring events
/// occur weekly on the weekday of their start, never before the start day,
/// and up to and including `repeat_until` when one is set.
///
/// Malformed dates never panic: an unparsable `start`, or an unparsable
/// `repeat_until` on a recurring event, yields `false`.
pub fn occurs_on(event: &EventRecord, day: NaiveDate) -> bool {
    let Some(anchor) = event.start_date() else {
        debug!(event_id = %event.id, start = %event.start, "unparsable start date");
        return false;
    };

    if !event.recurring {
        return anchor == day;
    }

    if anchor.weekday() != day.weekday() || day < anchor {
        return false;
    }

    match event.repeat_until() {
        RepeatUntil::Unbounded => true,
        RepeatUntil::Until(last) => day <= last,
        RepeatUntil::Malformed => {
            debug!(
                event_id = %event.id,
                repeat_until = ?event.repeat_until,
                "unparsable repeat-until date, hiding occurrence"
            );
            false
        }
    }
}

/// Events with an occurrence on `day`, in input order.
pub fn events_on<'a>(events: &'a [EventRecord], day: NaiveDate) -> Vec<&'a EventRecord> {
    events.iter().filter(|e| occurs_on(e, day)).collect()
}

/// Days in the inclusive range `[from, to]` on which `event` occurs.
///
/// Only the supplied range is scanned; an unbounded recurrence is never
/// expanded past `to`. An inverted range yields nothing.
pub fn occurrences_between(event: &EventRecord, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    if from > to {
        return Vec::new();
    }
    from.iter_days()
        .take_while(|day| *day <= to)
        .filter(|day| occurs_on(event, *day))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_one_off_event_matches_only_its_day() {
        let event = EventRecord::new("1", "Dentist", "2025-03-15T14:00");
        assert!(occurs_on(&event, ymd(2025, 3, 15)));
        assert!(!occurs_on(&event, ymd(2025, 3, 22)));
        assert!(!occurs_on(&event, ymd(2025, 3, 14)));
    }

    #[test]
    fn test_one_off_ignores_repeat_until() {
        let mut event = EventRecord::new("1", "Dentist", "2025-03-15");
        event.repeat_until = Some("garbage".into());
        assert!(occurs_on(&event, ymd(2025, 3, 15)));
    }

    #[test]
    fn test_weekly_with_end_date() {
        let event = EventRecord::new("1", "Seminar", "2025-03-15").weekly(Some("2025-04-01"));
        assert!(occurs_on(&event, ymd(2025, 3, 15)));
        assert!(occurs_on(&event, ymd(2025, 3, 22)));
        assert!(occurs_on(&event, ymd(2025, 3, 29)));
        assert!(!occurs_on(&event, ymd(2025, 4, 5)));
        assert!(!occurs_on(&event, ymd(2025, 4, 8)));
    }

    #[test]
    fn test_weekly_end_date_is_inclusive() {
        let event = EventRecord::new("1", "Seminar", "2025-03-15").weekly(Some("2025-03-29"));
        assert!(occurs_on(&event, ymd(2025, 3, 29)));
    }

    #[test]
    fn test_weekly_wrong_weekday() {
        let event = EventRecord::new("1", "Seminar", "2025-03-15").weekly(None);
        assert!(!occurs_on(&event, ymd(2025, 3, 16)));
        assert!(!occurs_on(&event, ymd(2025, 3, 21)));
    }

    #[test]
    fn test_weekly_never_before_anchor() {
        let event = EventRecord::new("1", "Seminar", "2025-03-15").weekly(None);
        assert!(!occurs_on(&event, ymd(2025, 3, 8)));
        assert!(!occurs_on(&event, ymd(2024, 3, 16)));
    }

    #[test]
    fn test_weekly_time_of_day_does_not_exclude_anchor() {
        let event = EventRecord::new("1", "Late lab", "2025-03-15T23:45").weekly(None);
        assert!(occurs_on(&event, ymd(2025, 3, 15)));
        assert!(occurs_on(&event, ymd(2026, 3, 14)));
    }

    #[test]
    fn test_weekly_malformed_end_hides_event() {
        let event = EventRecord::new("1", "Seminar", "2025-03-15").weekly(Some("31/12/2025"));
        assert!(!occurs_on(&event, ymd(2025, 3, 15)));
        assert!(!occurs_on(&event, ymd(2025, 3, 22)));
    }

    #[test]
    fn test_malformed_start_never_occurs() {
        let event = EventRecord::new("1", "Broken", "not-a-date").weekly(None);
        assert!(!occurs_on(&event, ymd(2025, 3, 15)));
    }

    #[test]
    fn test_events_on_preserves_order() {
        let events = vec![
            EventRecord::new("a", "Weekly", "2025-03-01").weekly(None),
            EventRecord::new("b", "Other day", "2025-03-16"),
            EventRecord::new("c", "Same day", "2025-03-15T10:00"),
        ];
        let ids: Vec<_> = events_on(&events, ymd(2025, 3, 15))
            .into_iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_occurrences_between_month() {
        let event = EventRecord::new("1", "Seminar", "2025-03-15").weekly(Some("2025-04-01"));
        let days = occurrences_between(&event, ymd(2025, 3, 1), ymd(2025, 4, 30));
        assert_eq!(days, vec![ymd(2025, 3, 15), ymd(2025, 3, 22), ymd(2025, 3, 29)]);
    }

    #[test]
    fn test_occurrences_between_unbounded_stops_at_range_end() {
        let event = EventRecord::new("1", "Seminar", "2025-03-03").weekly(None);
        let days = occurrences_between(&event, ymd(2025, 3, 1), ymd(2025, 3, 31));
        assert_eq!(days.len(), 5);
        assert_eq!(days.last(), Some(&ymd(2025, 3, 31)));
    }

    #[test]
    fn test_occurrences_between_inverted_range() {
        let event = EventRecord::new("1", "Seminar", "2025-03-15").weekly(None);
        assert!(occurrences_between(&event, ymd(2025, 4, 1), ymd(2025, 3, 1)).is_empty());
    }
}
