//! Error types for the review scheduler

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("Invalid grade: {0}")]
    InvalidGrade(String),

    #[error("Invalid study status: {0}")]
    InvalidStatus(String),

    #[error("Invalid difficulty: {0} (expected a value in 0..=5)")]
    InvalidDifficulty(f64),

    #[error("Invalid interval: {0} days")]
    InvalidInterval(f64),

    #[error("Due date is outside the representable range")]
    DateOutOfRange,
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
