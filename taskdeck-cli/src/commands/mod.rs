//! CLI command implementations

pub mod auth;
pub mod config;
pub mod logs;
pub mod shell;
pub mod tasks;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use taskdeck_core::ports::Confirmer;
use taskdeck_core::services::{EntryPoint, LogEvent, LoggingService};
use taskdeck_core::{AppController, Outcome, TaskdeckContext};

use crate::output;

/// Get the logging service
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger(entry_point: EntryPoint) -> Option<LoggingService> {
    let taskdeck_dir = get_taskdeck_dir().ok()?;
    std::fs::create_dir_all(&taskdeck_dir).ok()?;
    LoggingService::new(&taskdeck_dir, entry_point, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the taskdeck directory from environment or default
pub fn get_taskdeck_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TASKDECK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".taskdeck"))
        .context("Could not find home directory; set TASKDECK_DIR")
}

pub fn get_context() -> Result<TaskdeckContext> {
    let taskdeck_dir = get_taskdeck_dir()?;
    TaskdeckContext::new(&taskdeck_dir).context("Failed to initialize taskdeck context")
}

/// Run `f` behind a spinner on stderr. No spinner when stderr is not a terminal.
pub fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    if atty::isnt(atty::Stream::Stderr) {
        return f();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = f();
    pb.finish_and_clear();
    result
}

/// Print and clear every queued notice
pub fn print_notices(controller: &mut AppController) {
    for notice in controller.drain_notices() {
        output::notice(&notice);
    }
}

/// Record a finished flow; failures carry the last notice as the error
pub fn log_outcome(
    logger: &Option<LoggingService>,
    command: &str,
    controller: &AppController,
    outcome: Outcome,
) {
    let event = match (outcome.is_failure(), controller.notices().last()) {
        (true, Some(notice)) => LogEvent::command_failed(command, notice.message.clone()),
        _ => LogEvent::command_done(command),
    };
    log_event(logger, event);
}

/// Print notices, record the outcome, and exit 1 if the flow failed
pub fn finish(
    controller: &mut AppController,
    outcome: Outcome,
    logger: &Option<LoggingService>,
    command: &str,
) {
    log_outcome(logger, command, controller, outcome);
    print_notices(controller);
    if outcome.is_failure() {
        std::process::exit(1);
    }
}

/// Controller with the saved session restored, or exit with a hint
pub fn signed_in_controller(ctx: &TaskdeckContext, load: bool) -> AppController {
    let mut controller = ctx.controller();
    let outcome = if load {
        with_spinner("Loading tasks...", || controller.startup())
    } else {
        controller.restore_session()
    };
    print_notices(&mut controller);

    if let Err(e) = controller.token() {
        output::warning(&format!("{} (td signin)", e));
        std::process::exit(1);
    }
    if outcome.is_failure() {
        std::process::exit(1);
    }
    controller
}

/// Asks on the terminal before destructive actions
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }
}
