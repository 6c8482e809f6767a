mod app;
mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use flashdeck_lib::config::OutputFormat as ConfigOutputFormat;
use flashdeck_lib::flashcards::{CardStatus, Grade};

#[derive(Parser)]
#[command(name = "flashdeck-cli", about = "Flashcard review scheduler", version)]
struct Cli {
    /// Config file (default: <config dir>/flashdeck/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format (default: from config, else plain)
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    /// Review time as RFC 3339 (default: system clock)
    #[arg(long, global = true)]
    now: Option<String>,

    /// Override how sub-day intervals become due dates
    #[arg(long, global = true)]
    sub_day_policy: Option<SubDayPolicyArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

impl From<ConfigOutputFormat> for OutputFormat {
    fn from(format: ConfigOutputFormat) -> Self {
        match format {
            ConfigOutputFormat::Plain => OutputFormat::Plain,
            ConfigOutputFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum SubDayPolicyArg {
    CalendarHour,
    Elapsed,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the next state of a card after one review
    Schedule {
        /// Status before the review (new, learning, review, relearning)
        #[arg(long, default_value = "new")]
        status: CardStatus,
        /// Difficulty before the review (0-5)
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        difficulty: f64,
        /// Grade given (again, hard, good, easy)
        #[arg(long)]
        grade: Grade,
    },

    /// Show what each grade would do to a card
    Preview {
        /// Current status (new, learning, review, relearning)
        #[arg(long, default_value = "new")]
        status: CardStatus,
        /// Current difficulty (0-5)
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        difficulty: f64,
    },

    /// Reschedule a JSON array of {card, grade} requests
    Batch {
        /// Input file, or "-" for stdin
        #[arg(default_value = "-")]
        input: String,
    },

    /// Summarize a JSON array of card states
    Stats {
        /// Input file, or "-" for stdin
        #[arg(default_value = "-")]
        input: String,
    },

    /// Show or create the config file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write a default config file if none exists
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Parse `--now`, or read the system clock when it is absent
fn resolve_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("Invalid --now timestamp: {}", s))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let now = resolve_now(cli.now.as_deref())?;
    let app = app::App::new(cli.config, cli.format, cli.sub_day_policy)?;

    match cli.command {
        Command::Schedule { status, difficulty, grade } => {
            commands::schedule::run(&app, status, difficulty, grade, now)?;
        }
        Command::Preview { status, difficulty } => {
            commands::preview::run(&app, status, difficulty, now)?;
        }
        Command::Batch { input } => {
            commands::batch::run(&app, &input, now)?;
        }
        Command::Stats { input } => {
            commands::stats::run(&app, &input, now)?;
        }
        Command::Config(ConfigCommand::Show) => {
            commands::config::run_show(&app)?;
        }
        Command::Config(ConfigCommand::Init { force }) => {
            commands::config::run_init(&app, force)?;
        }
    }

    Ok(())
}
