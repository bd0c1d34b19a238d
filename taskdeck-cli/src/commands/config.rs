//! Config command - show and change settings

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use taskdeck_core::adapters::http::HttpTaskApi;
use taskdeck_core::config::{Config, API_URL_ENV};

use super::get_taskdeck_dir;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the task server URL
    SetUrl {
        /// Base URL, e.g. http://localhost:8080
        url: String,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let taskdeck_dir = get_taskdeck_dir()?;
    std::fs::create_dir_all(&taskdeck_dir)
        .with_context(|| format!("Failed to create taskdeck directory: {:?}", taskdeck_dir))?;
    let mut config = Config::load(&taskdeck_dir)?;

    match command {
        ConfigCommands::Show { json } => {
            if json {
                let mut value = serde_json::to_value(&config)?;
                value["directory"] = serde_json::json!(taskdeck_dir.to_string_lossy());
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }
            println!("{}", "Configuration".bold());
            let source = if config.base_url_from_env {
                format!(" (from {})", API_URL_ENV).dimmed().to_string()
            } else {
                String::new()
            };
            println!("  API URL:       {}{}", config.base_url, source);
            println!("  Timeout:       {}s", config.timeout_secs);
            println!("  Notice TTL:    {}s", config.notification_ttl_secs);
            println!("  Directory:     {}", taskdeck_dir.display());
        }
        ConfigCommands::SetUrl { url } => {
            // Same validation the client applies
            let api = HttpTaskApi::new(&url)?;
            config.set_base_url(api.base_url());
            config.save(&taskdeck_dir)?;
            println!("{} API URL set to {}", "✓".green(), api.base_url());
            if std::env::var(API_URL_ENV).is_ok() {
                println!(
                    "{}",
                    format!("Note: {} is set and overrides this value", API_URL_ENV).yellow()
                );
            }
        }
    }
    Ok(())
}
