pub mod batch;
pub mod config;
pub mod preview;
pub mod schedule;
pub mod stats;
