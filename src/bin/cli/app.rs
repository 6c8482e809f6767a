use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use flashdeck_lib::config::AppConfig;
use flashdeck_lib::flashcards::{Scheduler, SubDayPolicy};

use crate::{OutputFormat, SubDayPolicyArg};

/// Shared application state for CLI commands
pub struct App {
    pub config_path: PathBuf,
    pub config: AppConfig,
    pub format: OutputFormat,
    pub scheduler: Scheduler,
}

impl App {
    /// Load config and apply command-line overrides
    pub fn new(
        config_path: Option<PathBuf>,
        format: Option<OutputFormat>,
        sub_day_policy: Option<SubDayPolicyArg>,
    ) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => AppConfig::default_path().context("Failed to get config directory")?,
        };

        let mut config = AppConfig::load_from(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?;

        if let Some(policy) = sub_day_policy {
            config.scheduler.sub_day_policy = match policy {
                SubDayPolicyArg::CalendarHour => SubDayPolicy::CalendarHour,
                SubDayPolicyArg::Elapsed => SubDayPolicy::Elapsed,
            };
        }

        let format = format.unwrap_or_else(|| config.output.format.into());
        let scheduler = Scheduler::new(config.scheduler.clone());

        Ok(Self {
            config_path,
            config,
            format,
            scheduler,
        })
    }

    /// Read and parse JSON from a file, or from stdin when `input` is "-"
    pub fn read_json<T: DeserializeOwned>(&self, input: &str) -> Result<T> {
        let content = if input == "-" {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        } else {
            std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))?
        };

        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", input))
    }
}
