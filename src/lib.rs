//! Flashdeck: spaced repetition scheduling for flashcards.
//!
//! The [`flashcards`] module holds the review scheduler; [`config`] loads
//! the settings used by the `flashdeck-cli` binary.

pub mod config;
pub mod flashcards;
