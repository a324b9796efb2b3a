use std::path::PathBuf;

use clap::Args;
use studycal_core::{Config, StudyPlanner};

use super::{load_document, resolve_now, CliResult};

#[derive(Args)]
pub struct PlanArgs {
    /// JSON file with the event list
    #[arg(long, short)]
    pub file: PathBuf,
    /// Evaluate as of this instant (RFC 3339) instead of now
    #[arg(long)]
    pub now: Option<String>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: PlanArgs) -> CliResult {
    let now = resolve_now(args.now.as_deref())?;
    let config = Config::load_or_default();
    let planner = StudyPlanner::with_config(config.planner);

    let plan = planner.plan_from_json(&load_document(&args.file)?, &now);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let (from, to) = planner.window(&now);
    println!(
        "{} event(s) need preparation between {from} and {to}: {} study hour(s)",
        plan.event_count, plan.total_study_hours
    );
    for (date, events) in &plan.events_by_date {
        println!("{date}");
        for planned in events {
            let marker = if planned.needs_preparation_input {
                " (estimate needed)"
            } else {
                ""
            };
            println!(
                "  {:>5}h  {}{marker}",
                planned.suggested_study_hours, planned.event.title
            );
        }
    }
    Ok(())
}
