use anyhow::Result;
use chrono::{DateTime, Utc};

use flashdeck_lib::flashcards::{due_cards, summarize, CardState};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, input: &str, now: DateTime<Utc>) -> Result<()> {
    let cards: Vec<CardState> = app.read_json(input)?;
    let stats = summarize(&cards, now);

    match app.format {
        OutputFormat::Json => {
            let due: Vec<String> = due_cards(&cards, now)
                .iter()
                .map(|c| c.card_id.to_string())
                .collect();
            let output = serde_json::json!({
                "stats": stats,
                "dueCardIds": due,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Total:      {}", stats.total_cards);
            println!("New:        {}", stats.new_cards);
            println!("Learning:   {}", stats.learning_cards);
            println!("Review:     {}", stats.review_cards);
            println!("Relearning: {}", stats.relearning_cards);
            println!("Due now:    {}", stats.due_cards);

            for card in due_cards(&cards, now).iter().take(10) {
                println!("  {}  due {}", card.card_id, card.due_date.to_rfc3339());
            }
        }
    }

    Ok(())
}
