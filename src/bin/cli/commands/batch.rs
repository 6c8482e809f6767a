use anyhow::Result;
use chrono::{DateTime, Utc};

use flashdeck_lib::flashcards::ReviewRequest;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, input: &str, now: DateTime<Utc>) -> Result<()> {
    let requests: Vec<ReviewRequest> = app.read_json(input)?;
    let results = app.scheduler.reschedule_all(&requests, now);
    let failed = results.iter().filter(|r| r.is_err()).count();

    match app.format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = requests
                .iter()
                .zip(&results)
                .map(|(request, result)| match result {
                    Ok(outcome) => serde_json::json!({
                        "cardId": request.card.card_id.to_string(),
                        "ok": true,
                        "state": outcome.state,
                        "record": outcome.record,
                    }),
                    Err(e) => serde_json::json!({
                        "cardId": request.card.card_id.to_string(),
                        "ok": false,
                        "error": e.to_string(),
                    }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for (request, result) in requests.iter().zip(&results) {
                match result {
                    Ok(outcome) => println!(
                        "{}  {:<10} -> {:<10} difficulty {:<4} due {}",
                        request.card.card_id,
                        request.card.status.as_str(),
                        outcome.state.status.as_str(),
                        outcome.state.difficulty,
                        outcome.state.due_date.to_rfc3339()
                    ),
                    Err(e) => println!("{}  error: {}", request.card.card_id, e),
                }
            }
            println!(
                "\n{} cards rescheduled, {} failed",
                results.len() - failed,
                failed
            );
        }
    }

    Ok(())
}
