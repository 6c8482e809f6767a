//! Queries over a collection of card states

use chrono::{DateTime, Utc};

use super::models::{CardState, CardStatus, ReviewStats};

/// Count cards per status and how many are due at `now`
pub fn summarize(cards: &[CardState], now: DateTime<Utc>) -> ReviewStats {
    cards.iter().fold(ReviewStats::default(), |mut stats, card| {
        stats.total_cards += 1;
        match card.status {
            CardStatus::New => stats.new_cards += 1,
            CardStatus::Learning => stats.learning_cards += 1,
            CardStatus::Review => stats.review_cards += 1,
            CardStatus::Relearning => stats.relearning_cards += 1,
        }
        if card.is_due(now) {
            stats.due_cards += 1;
        }
        stats
    })
}

/// Cards due at `now`, most overdue first
pub fn due_cards(cards: &[CardState], now: DateTime<Utc>) -> Vec<&CardState> {
    let mut due: Vec<&CardState> = cards.iter().filter(|c| c.is_due(now)).collect();
    due.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.card_id.cmp(&b.card_id))
    });
    due
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn state(status: CardStatus, due_date: DateTime<Utc>) -> CardState {
        CardState {
            card_id: Uuid::new_v4(),
            difficulty: 1.0,
            status,
            due_date,
        }
    }

    #[test]
    fn test_summarize_counts_statuses_and_due() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let cards = vec![
            state(CardStatus::New, now),
            state(CardStatus::Learning, now - Duration::hours(1)),
            state(CardStatus::Review, now + Duration::days(3)),
            state(CardStatus::Review, now - Duration::days(3)),
            state(CardStatus::Relearning, now + Duration::minutes(5)),
        ];

        let stats = summarize(&cards, now);

        assert_eq!(
            stats,
            ReviewStats {
                total_cards: 5,
                new_cards: 1,
                learning_cards: 1,
                review_cards: 2,
                relearning_cards: 1,
                due_cards: 3,
            }
        );
    }

    #[test]
    fn test_summarize_empty() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(summarize(&[], now), ReviewStats::default());
    }

    #[test]
    fn test_due_cards_sorted_oldest_first() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let cards = vec![
            state(CardStatus::Review, now - Duration::hours(1)),
            state(CardStatus::Review, now + Duration::hours(1)),
            state(CardStatus::Learning, now - Duration::days(2)),
        ];

        let due = due_cards(&cards, now);

        assert_eq!(due.len(), 2);
        assert_eq!(due[0].due_date, now - Duration::days(2));
        assert_eq!(due[1].due_date, now - Duration::hours(1));
    }
}
