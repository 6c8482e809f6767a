use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use flashdeck_lib::flashcards::{format_interval, CardState, CardStatus, Grade};

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    status: CardStatus,
    difficulty: f64,
    grade: Grade,
    now: DateTime<Utc>,
) -> Result<()> {
    let state = CardState {
        card_id: Uuid::nil(),
        difficulty,
        status,
        due_date: now,
    };
    let outcome = app.scheduler.review(&state, grade, now)?;

    match app.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "dueAt": outcome.state.due_date.to_rfc3339(),
                "status": outcome.state.status,
                "difficulty": outcome.state.difficulty,
                "interval": outcome.record.interval,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Status:     {} -> {}", status, outcome.state.status);
            println!("Difficulty: {} -> {}", difficulty, outcome.state.difficulty);
            println!(
                "Interval:   {} ({} days)",
                format_interval(outcome.record.interval),
                outcome.record.interval
            );
            println!("Due:        {}", outcome.state.due_date.to_rfc3339());
        }
    }

    Ok(())
}
