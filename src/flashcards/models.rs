//! Data models for the flashcard system

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::SchedulerError;

/// Lowest difficulty a card can have (new / easiest)
pub const MIN_DIFFICULTY: f64 = 0.0;

/// Highest difficulty a card can have
pub const MAX_DIFFICULTY: f64 = 5.0;

/// Status of a card in the spaced repetition system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardStatus {
    /// Never reviewed
    New,
    /// In initial learning phase
    Learning,
    /// Regular spaced review
    Review,
    /// Failed and re-learning
    Relearning,
}

impl CardStatus {
    pub const ALL: [CardStatus; 4] = [
        CardStatus::New,
        CardStatus::Learning,
        CardStatus::Review,
        CardStatus::Relearning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::New => "new",
            CardStatus::Learning => "learning",
            CardStatus::Review => "review",
            CardStatus::Relearning => "relearning",
        }
    }
}

impl Default for CardStatus {
    fn default() -> Self {
        Self::New
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardStatus {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(CardStatus::New),
            "learning" => Ok(CardStatus::Learning),
            "review" => Ok(CardStatus::Review),
            "relearning" => Ok(CardStatus::Relearning),
            _ => Err(SchedulerError::InvalidStatus(s.to_string())),
        }
    }
}

/// Self-assessed recall quality for a reviewed card.
///
/// Variants are declared weakest to strongest so the derived `Ord`
/// matches recall strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Grade {
    /// Forgot the answer
    Again,
    /// Recalled with serious difficulty
    Hard,
    /// Recalled after some hesitation
    Good,
    /// Recalled instantly
    Easy,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    /// Map a UI button rating (1-4: Again, Hard, Good, Easy) to a grade
    pub fn from_ui_rating(rating: i32) -> Result<Self, SchedulerError> {
        match rating {
            1 => Ok(Grade::Again),
            2 => Ok(Grade::Hard),
            3 => Ok(Grade::Good),
            4 => Ok(Grade::Easy),
            other => Err(SchedulerError::InvalidGrade(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Again => "again",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "again" => Ok(Grade::Again),
            "hard" => Ok(Grade::Hard),
            "good" => Ok(Grade::Good),
            "easy" => Ok(Grade::Easy),
            _ => Err(SchedulerError::InvalidGrade(s.to_string())),
        }
    }
}

/// Current spaced repetition state for a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
    pub card_id: Uuid,
    /// Difficulty estimate, 0 (easiest) to 5 (hardest)
    #[serde(default)]
    pub difficulty: f64,
    /// Current status in the learning process
    #[serde(default)]
    pub status: CardStatus,
    /// When the card is due for review
    pub due_date: DateTime<Utc>,
}

impl CardState {
    /// State for a freshly created card: new, easiest, due immediately
    pub fn new(card_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            card_id,
            difficulty: MIN_DIFFICULTY,
            status: CardStatus::New,
            due_date: now,
        }
    }

    /// Check if the card is due for review at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.due_date
    }
}

/// A card state paired with the grade given for it, used for batch rescheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub card: CardState,
    pub grade: Grade,
}

/// A record of a single review event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: Uuid,
    pub card_id: Uuid,
    pub grade: Grade,
    pub status_before: CardStatus,
    pub status_after: CardStatus,
    pub difficulty_before: f64,
    pub difficulty_after: f64,
    /// Scheduled interval in days
    pub interval: f64,
    /// When the review occurred
    pub reviewed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// Card counts for a collection of card states
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    pub new_cards: usize,
    pub learning_cards: usize,
    pub review_cards: usize,
    pub relearning_cards: usize,
    pub due_cards: usize,
}
