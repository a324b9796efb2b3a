//! Property tests for the occurrence predicate.

use chrono::{Datelike, Duration, NaiveDate};
use proptest::prelude::*;
use studycal_core::{occurrences_between, occurs_on, EventRecord};

fn day_strategy() -> impl Strategy<Value = NaiveDate> {
    // 2000-01-01 plus up to ~40 years
    (0i64..14_600).prop_map(|offset| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Duration::days(offset))
}

fn iso(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

proptest! {
    #[test]
    fn one_off_matches_same_calendar_day(start in day_strategy(), day in day_strategy(), hour in 0u32..24) {
        let event = EventRecord::new("1", "One-off", format!("{}T{:02}:15", iso(start), hour));
        prop_assert_eq!(occurs_on(&event, day), start == day);
    }

    #[test]
    fn unbounded_weekly_matches_every_later_same_weekday(start in day_strategy(), weeks in 0i64..500) {
        let event = EventRecord::new("1", "Weekly", iso(start)).weekly(None);
        let day = start + Duration::weeks(weeks);
        prop_assert!(occurs_on(&event, day));
    }

    #[test]
    fn weekly_never_occurs_on_other_weekdays(start in day_strategy(), day in day_strategy()) {
        let event = EventRecord::new("1", "Weekly", iso(start)).weekly(None);
        if day.weekday() != start.weekday() {
            prop_assert!(!occurs_on(&event, day));
        }
    }

    #[test]
    fn weekly_never_occurs_before_start(start in day_strategy(), weeks in 1i64..500) {
        let event = EventRecord::new("1", "Weekly", iso(start)).weekly(None);
        prop_assert!(!occurs_on(&event, start - Duration::weeks(weeks)));
    }

    #[test]
    fn weekly_never_occurs_after_repeat_until(start in day_strategy(), until_offset in 0i64..400, weeks in 0i64..500) {
        let until = start + Duration::days(until_offset);
        let event = EventRecord::new("1", "Weekly", iso(start)).weekly(Some(&iso(until)));
        let day = start + Duration::weeks(weeks);
        prop_assert_eq!(occurs_on(&event, day), day <= until);
    }

    #[test]
    fn range_expansion_agrees_with_predicate(start in day_strategy(), from in day_strategy(), span in 0i64..90) {
        let event = EventRecord::new("1", "Weekly", iso(start)).weekly(None);
        let to = from + Duration::days(span);
        let days = occurrences_between(&event, from, to);

        for day in from.iter_days().take_while(|d| *d <= to) {
            prop_assert_eq!(days.contains(&day), occurs_on(&event, day));
        }
    }
}

#[test]
fn scenario_weekly_until_april_first() {
    let event = EventRecord::new("1", "Seminar", "2025-03-15").weekly(Some("2025-04-01"));
    assert!(occurs_on(&event, NaiveDate::from_ymd_opt(2025, 3, 22).unwrap()));
    assert!(!occurs_on(&event, NaiveDate::from_ymd_opt(2025, 4, 8).unwrap()));
}
