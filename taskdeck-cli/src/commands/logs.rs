//! Logs command - inspect and prune the local event log

use anyhow::{anyhow, Result};
use chrono::{Local, TimeZone};
use clap::Subcommand;
use colored::Colorize;
use taskdeck_core::ports::{AlwaysConfirm, Confirmer};
use taskdeck_core::services::logging::now_ms;
use taskdeck_core::services::view::sanitize_terminal;
use taskdeck_core::services::{EntryPoint, LogEntry, LogFilter, LoggingService};

use super::{get_taskdeck_dir, TerminalConfirmer};
use crate::output;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only errors
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete old log entries
    Clear {
        /// Delete entries older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show entry counts and the database location
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_log() -> Result<LoggingService> {
    let taskdeck_dir = get_taskdeck_dir()?;
    std::fs::create_dir_all(&taskdeck_dir)?;
    LoggingService::new(&taskdeck_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn local_time(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub fn run(command: LogsCommands) -> Result<()> {
    let log = open_log()?;
    match command {
        LogsCommands::List { limit, errors, json } => list(&log, limit, errors, json),
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => clear(&log, older_than_days, force || json, json),
        LogsCommands::Stats { json } => stats(&log, json),
    }
}

fn list(log: &LoggingService, limit: usize, errors_only: bool, json: bool) -> Result<()> {
    let filter = if errors_only { LogFilter::Errors } else { LogFilter::All };
    let entries = log.recent(limit, filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("{}", "No log entries".dimmed());
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Entry", "Event", "Command", "Error"]);
    for entry in &entries {
        table.add_row(vec![
            local_time(entry.timestamp),
            entry.entry_point.clone(),
            entry.event.clone(),
            entry.command.clone().unwrap_or_default(),
            entry
                .error_message
                .as_deref()
                .map(|m| sanitize_terminal(m).red().to_string())
                .unwrap_or_default(),
        ]);
    }
    println!("{}", table);

    let with_details: Vec<&LogEntry> = entries
        .iter()
        .filter(|e| e.error_details.is_some())
        .take(3)
        .collect();
    if !with_details.is_empty() {
        println!();
        println!("{}", "Error details:".red().bold());
        for entry in with_details {
            println!(
                "  {} [{}] {}",
                local_time(entry.timestamp).dimmed(),
                entry.event,
                sanitize_terminal(entry.error_details.as_deref().unwrap_or_default())
            );
        }
    }
    Ok(())
}

/// Unix-ms cutoff `days` before `now_ms`
fn cutoff_ms(now_ms: i64, days: u64) -> Result<i64> {
    i64::try_from(days)
        .ok()
        .and_then(|d| d.checked_mul(DAY_MS))
        .and_then(|span| now_ms.checked_sub(span))
        .ok_or_else(|| anyhow!("--older-than-days {} is out of range", days))
}

fn clear(log: &LoggingService, older_than_days: u64, skip_prompt: bool, json: bool) -> Result<()> {
    let cutoff = cutoff_ms(now_ms(), older_than_days)?;
    let confirmer: &dyn Confirmer = if skip_prompt {
        &AlwaysConfirm(true)
    } else {
        &TerminalConfirmer
    };
    if !confirmer.confirm(&format!("Delete log entries older than {} days?", older_than_days))? {
        println!("{}", "Cancelled".dimmed());
        return Ok(());
    }

    let deleted = log.delete_before(cutoff)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": deleted }));
    } else {
        output::success(&format!("Deleted {} log entries", deleted));
    }
    Ok(())
}

fn stats(log: &LoggingService, json: bool) -> Result<()> {
    let total = log.count(LogFilter::All)?;
    let errors = log.count(LogFilter::Errors)?;
    let size_bytes = std::fs::metadata(log.db_path()).map(|m| m.len()).unwrap_or(0);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "totalEntries": total,
                "errorCount": errors,
                "databasePath": log.db_path().to_string_lossy(),
                "databaseSizeBytes": size_bytes,
            })
        );
    } else {
        println!("{}", "Event log".bold());
        println!("  Entries:  {}", total);
        println!("  Errors:   {}", errors);
        println!("  Database: {}", log.db_path().display());
        println!("  Size:     {}", output::format_size(size_bytes));
    }
    Ok(())
}
