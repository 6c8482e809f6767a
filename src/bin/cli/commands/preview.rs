use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use flashdeck_lib::flashcards::{CardState, CardStatus};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, status: CardStatus, difficulty: f64, now: DateTime<Utc>) -> Result<()> {
    let state = CardState {
        card_id: Uuid::nil(),
        difficulty,
        status,
        due_date: now,
    };
    let previews = app.scheduler.preview(&state, now)?;

    match app.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&previews)?);
        }
        OutputFormat::Plain => {
            println!(
                "{:<6} {:<6} {:<11} {:<10} Due",
                "Grade", "Next", "Status", "Difficulty"
            );
            println!("{}", "\u{2500}".repeat(60));
            for preview in &previews {
                println!(
                    "{:<6} {:<6} {:<11} {:<10} {}",
                    preview.grade.as_str(),
                    preview.label,
                    preview.status.as_str(),
                    preview.difficulty,
                    preview.due_date.to_rfc3339()
                );
            }
        }
    }

    Ok(())
}
