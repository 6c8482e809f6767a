//! Flashcard spaced repetition scheduling
//!
//! This module provides:
//! - Card scheduling state, grades and study statuses
//! - The review scheduler (status, difficulty and due date rules)
//! - Due-card and summary queries over card collections

pub mod algorithm;
pub mod error;
pub mod models;
pub mod stats;

pub use algorithm::{
    due_date_for_interval, format_interval, naive_due_date_for_interval, next_difficulty,
    next_due_date, next_status, review_interval, Preview, ReviewOutcome, Scheduler,
    SchedulerConfig, SubDayPolicy,
};
pub use error::{Result, SchedulerError};
pub use models::*;
pub use stats::{due_cards, summarize};
