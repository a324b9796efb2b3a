use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Subcommand;
use studycal_core::event::require_date;
use studycal_core::{events_from_document, events_on, EventRecord, ValidationError};

use super::{load_document, CliResult};

/// Longest range `events range` will expand.
const MAX_RANGE_DAYS: i64 = 366;

#[derive(Subcommand)]
pub enum EventsAction {
    /// Events occurring on a day
    Day {
        /// Day to show (YYYY-MM-DD)
        date: String,
        /// JSON file with the event list
        #[arg(long, short)]
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Occurrences for each day of an inclusive date range
    Range {
        /// First day (YYYY-MM-DD)
        from: String,
        /// Last day (YYYY-MM-DD)
        to: String,
        /// JSON file with the event list
        #[arg(long, short)]
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: EventsAction) -> CliResult {
    match action {
        EventsAction::Day { date, file, json } => {
            let day = require_date("date", &date)?;
            let events = events_from_document(&load_document(&file)?);
            let matching = events_on(&events, day);

            if json {
                println!("{}", serde_json::to_string_pretty(&matching)?);
            } else if matching.is_empty() {
                println!("No events on {day}");
            } else {
                for event in matching {
                    println!("{}", describe(event));
                }
            }
        }
        EventsAction::Range {
            from,
            to,
            file,
            json,
        } => {
            let from = require_date("from", &from)?;
            let to = require_date("to", &to)?;
            if (to - from).num_days() > MAX_RANGE_DAYS {
                return Err(ValidationError::InvalidValue {
                    field: "to".into(),
                    message: format!("range may span at most {MAX_RANGE_DAYS} days"),
                }
                .into());
            }

            let events = events_from_document(&load_document(&file)?);
            let by_day: BTreeMap<String, Vec<&EventRecord>> = from
                .iter_days()
                .take_while(|day| *day <= to)
                .map(|day| (day.to_string(), events_on(&events, day)))
                .filter(|(_, day_events)| !day_events.is_empty())
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&by_day)?);
            } else {
                for (day, day_events) in &by_day {
                    println!("{day}");
                    for event in day_events {
                        println!("  {}", describe(event));
                    }
                }
            }
        }
    }
    Ok(())
}

fn describe(event: &EventRecord) -> String {
    let time = if event.all_day {
        "all day".to_string()
    } else {
        event
            .start_datetime()
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string())
    };
    let repeat = if event.recurring { " (weekly)" } else { "" };
    format!("{time:>7}  {}{repeat}  [{}]", event.title, event.id)
}
