use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studycal-cli", version, about = "studycal CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calendar occurrences
    Events {
        #[command(subcommand)]
        action: commands::events::EventsAction,
    },
    /// Study plan for the coming days
    Plan(commands::plan::PlanArgs),
    /// Study-hours reminders
    Nudge(commands::nudge::NudgeArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Events { action } => commands::events::run(action),
        Commands::Plan(args) => commands::plan::run(args),
        Commands::Nudge(args) => commands::nudge::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
