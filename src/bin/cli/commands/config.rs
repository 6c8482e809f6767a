use anyhow::{bail, Context, Result};

use flashdeck_lib::config::AppConfig;

use crate::app::App;
use crate::OutputFormat;

pub fn run_show(app: &App) -> Result<()> {
    match app.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": app.config_path.display().to_string(),
                "config": app.config,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("# {}", app.config_path.display());
            print!("{}", toml::to_string_pretty(&app.config)?);
        }
    }

    Ok(())
}

pub fn run_init(app: &App, force: bool) -> Result<()> {
    if app.config_path.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            app.config_path.display()
        );
    }

    AppConfig::default()
        .save_to(&app.config_path)
        .with_context(|| format!("Failed to write {}", app.config_path.display()))?;
    println!("Wrote default config to {}", app.config_path.display());

    Ok(())
}
