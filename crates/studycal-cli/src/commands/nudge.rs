use std::path::PathBuf;

use clap::{Args, Subcommand};
use studycal_core::{Config, FileStore, NudgeTracker, StudyPlanner};

use super::{load_document, resolve_now, CliResult};

#[derive(Args)]
pub struct NudgeArgs {
    /// Reminder state file (defaults to state.json in the data directory)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,
    #[command(subcommand)]
    pub action: NudgeAction,
}

#[derive(Subcommand)]
pub enum NudgeAction {
    /// Planned events that should prompt for an hour estimate
    Pending {
        /// JSON file with the event list
        #[arg(long, short)]
        file: PathBuf,
        /// Evaluate as of this instant (RFC 3339)
        #[arg(long)]
        now: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Daily study load for upcoming events
    Analyze {
        /// JSON file with the event list
        #[arg(long, short)]
        file: PathBuf,
        /// Evaluate as of this instant (RFC 3339)
        #[arg(long)]
        now: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record study hours for an event
    SetHours {
        /// Event id
        id: String,
        /// Hours (a positive number; anything else clears the value)
        hours: String,
    },
    /// Snooze the reminder for an event
    Dismiss {
        /// Event id
        id: String,
        /// Dismissal instant (RFC 3339)
        #[arg(long)]
        now: Option<String>,
    },
}

pub fn run(args: NudgeArgs) -> CliResult {
    let config = Config::load_or_default();
    let store = match args.state {
        Some(path) => FileStore::with_path(path),
        None => FileStore::open()?,
    };
    let mut tracker = NudgeTracker::load(store, config.nudge)?;
    let planner = StudyPlanner::with_config(config.planner);

    match args.action {
        NudgeAction::Pending { file, now, json } => {
            let now = resolve_now(now.as_deref())?;
            let plan = planner.plan_from_json(&load_document(&file)?, &now);
            let pending = tracker.pending_prompts(&plan, &now);

            if json {
                println!("{}", serde_json::to_string_pretty(&pending)?);
            } else if pending.is_empty() {
                println!("No reminders due");
            } else {
                for planned in pending {
                    println!(
                        "{}  {}  [{}]",
                        planned.event.start_date_key(),
                        planned.event.title,
                        planned.event.id
                    );
                }
            }
        }
        NudgeAction::Analyze { file, now, json } => {
            let now = resolve_now(now.as_deref())?;
            let plan = planner.plan_from_json(&load_document(&file)?, &now);
            let analysis = tracker.analyze(&plan, &now);

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                for item in &analysis {
                    let flag = if item.needs_attention { "  !" } else { "" };
                    println!(
                        "{}: {}h over {} day(s), {}h/day{flag}",
                        item.title, item.total_study_hours, item.days_until, item.recommended_daily_hours
                    );
                }
            }
        }
        NudgeAction::SetHours { id, hours } => match tracker.set_study_hours(&id, &hours)? {
            Some(h) => println!("{id}: {h} study hour(s)"),
            None => println!("{id}: study hours cleared"),
        },
        NudgeAction::Dismiss { id, now } => {
            let now = resolve_now(now.as_deref())?;
            tracker.dismiss(&id, &now)?;
            println!(
                "{id}: snoozed for {} hour(s)",
                tracker.config().snooze_hours
            );
        }
    }
    Ok(())
}
