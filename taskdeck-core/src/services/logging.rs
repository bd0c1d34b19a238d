//! Logging service - structured event logging to DuckDB
//!
//! Stores events in logs.duckdb inside the taskdeck directory. Only event
//! names, command names and error text are recorded: never tokens,
//! passwords, or task content.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use duckdb::{Connection, Row};
use serde::Serialize;

use crate::log_migrations::LOG_MIGRATIONS;

/// Current unix timestamp in milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// How the client was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// One-shot `td <command>`
    Cli,
    /// Interactive `td shell`
    Shell,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Shell => "shell",
        }
    }
}

/// Which entries a query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFilter {
    All,
    Errors,
}

impl LogFilter {
    fn where_clause(&self) -> &'static str {
        match self {
            LogFilter::All => "",
            LogFilter::Errors => "WHERE error_message IS NOT NULL",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Default)]
pub struct LogEvent {
    pub event: String,
    pub command: Option<String>,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
}

impl LogEvent {
    /// A command that finished without a failure
    pub fn command_done(command: &str) -> Self {
        Self {
            event: "command_executed".to_string(),
            command: Some(command.to_string()),
            ..Default::default()
        }
    }

    /// A command that failed with the message the user saw
    pub fn command_failed(command: &str, message: impl Into<String>) -> Self {
        Self {
            event: format!("{}_failed", command),
            command: Some(command.to_string()),
            error_message: Some(message.into()),
            error_details: None,
        }
    }
}

/// A log entry as stored in the database
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub command: Option<String>,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
}

impl LogEntry {
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            entry_point: row.get(2)?,
            app_version: row.get(3)?,
            platform: row.get(4)?,
            event: row.get(5)?,
            command: row.get(6)?,
            error_message: row.get(7)?,
            error_details: row.get(8)?,
        })
    }
}

/// Service for structured event logging
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
}

impl LoggingService {
    /// Open or create logs.duckdb in `taskdeck_dir` and run pending migrations
    pub fn new(
        taskdeck_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        let db_path = taskdeck_dir.join("logs.duckdb");
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open log database {:?}", db_path))?;
        migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point,
            app_version: app_version.into(),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    /// Record an event; entry point, version and platform are added here
    pub fn log(&self, event: LogEvent) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO sys_logs (timestamp, entry_point, app_version, platform, \
             event, command, error_message, error_details) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            duckdb::params![
                now_ms(),
                self.entry_point.as_str(),
                &self.app_version,
                std::env::consts::OS,
                &event.event,
                &event.command,
                &event.error_message,
                &event.error_details,
            ],
        )?;
        Ok(())
    }

    /// Newest entries first
    pub fn recent(&self, limit: usize, filter: LogFilter) -> Result<Vec<LogEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, timestamp, entry_point, app_version, platform, event, command, \
             error_message, error_details FROM sys_logs {} ORDER BY id DESC LIMIT ?",
            filter.where_clause()
        ))?;
        let entries = stmt
            .query_map([limit as i64], LogEntry::from_row)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn count(&self, filter: LogFilter) -> Result<u64> {
        let count: u64 = self.conn()?.query_row(
            &format!("SELECT COUNT(*) FROM sys_logs {}", filter.where_clause()),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete entries older than the given unix-ms timestamp
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Apply every embedded migration not yet listed in `sys_migrations`
fn migrate(conn: &Connection) -> Result<()> {
    let mut pending = LOG_MIGRATIONS.iter();
    // The bookkeeping table itself is idempotent DDL
    if let Some((_, bootstrap)) = pending.next() {
        conn.execute_batch(bootstrap)?;
    }

    for (name, sql) in pending {
        let applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sys_migrations WHERE migration_name = ?",
            [name],
            |row| row.get(0),
        )?;
        if applied {
            continue;
        }
        conn.execute_batch(sql)
            .with_context(|| format!("Log migration {} failed", name))?;
        conn.execute("INSERT INTO sys_migrations (migration_name) VALUES (?)", [name])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn service(entry_point: EntryPoint) -> (tempfile::TempDir, LoggingService) {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), entry_point, "1.0.0").unwrap();
        (dir, service)
    }

    #[test]
    fn test_creates_database_file() {
        let (_dir, service) = service(EntryPoint::Cli);
        assert!(service.db_path().exists());
        assert_eq!(service.count(LogFilter::All).unwrap(), 0);
    }

    #[test]
    fn test_reopen_keeps_entries() {
        let dir = tempdir().unwrap();
        {
            let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();
            service.log(LogEvent::command_done("list")).unwrap();
        }
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.1").unwrap();
        service.log(LogEvent::command_done("stats")).unwrap();

        let entries = service.recent(10, LogFilter::All).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].command.as_deref(), Some("stats"));
        assert_eq!(entries[0].app_version, "1.0.1");
        assert!(entries[0].id > entries[1].id);
    }

    #[test]
    fn test_command_done_from_shell() {
        let (_dir, service) = service(EntryPoint::Shell);
        service.log(LogEvent::command_done("toggle")).unwrap();

        let entries = service.recent(10, LogFilter::All).unwrap();
        assert_eq!(entries[0].event, "command_executed");
        assert_eq!(entries[0].command.as_deref(), Some("toggle"));
        assert_eq!(entries[0].entry_point, "shell");
        assert_eq!(entries[0].platform, std::env::consts::OS);
        assert!(entries[0].error_message.is_none());
    }

    #[test]
    fn test_failures_are_filterable() {
        let (_dir, service) = service(EntryPoint::Cli);
        service.log(LogEvent::command_done("list")).unwrap();
        service
            .log(LogEvent {
                error_details: Some("HTTP 500".to_string()),
                ..LogEvent::command_failed("load", "Failed to load tasks")
            })
            .unwrap();

        assert_eq!(service.count(LogFilter::All).unwrap(), 2);
        assert_eq!(service.count(LogFilter::Errors).unwrap(), 1);

        let errors = service.recent(10, LogFilter::Errors).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].event, "load_failed");
        assert_eq!(errors[0].error_message.as_deref(), Some("Failed to load tasks"));
        assert_eq!(errors[0].error_details.as_deref(), Some("HTTP 500"));
    }

    #[test]
    fn test_recent_respects_limit() {
        let (_dir, service) = service(EntryPoint::Cli);
        for command in ["a", "b", "c"] {
            service.log(LogEvent::command_done(command)).unwrap();
        }
        let entries = service.recent(2, LogFilter::All).unwrap();
        let commands: Vec<_> = entries.iter().filter_map(|e| e.command.as_deref()).collect();
        assert_eq!(commands, vec!["c", "b"]);
    }

    #[test]
    fn test_delete_before() {
        let (_dir, service) = service(EntryPoint::Cli);
        service.log(LogEvent::command_done("a")).unwrap();
        service.log(LogEvent::command_done("b")).unwrap();

        assert_eq!(service.delete_before(now_ms() - 60_000).unwrap(), 0);
        assert_eq!(service.delete_before(now_ms() + 1000).unwrap(), 2);
        assert_eq!(service.count(LogFilter::All).unwrap(), 0);
    }
}
