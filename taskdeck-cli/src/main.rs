//! Taskdeck CLI - your task board in the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use taskdeck_core::TaskId;

mod commands;
mod output;

use commands::auth::SignUpArgs;
use commands::config::ConfigCommands;
use commands::logs::LogsCommands;
use commands::tasks::{FieldArgs, ListFormat};
use commands::{auth, config, logs, shell, tasks};

/// Taskdeck - sign in and manage your tasks
#[derive(Parser)]
#[command(name = "td", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Signin {
        /// Username (prompted if omitted)
        username: Option<String>,
    },

    /// Create an account
    Signup {
        #[command(flatten)]
        args: SignUpArgs,
    },

    /// Forget the stored session
    Signout,

    /// Show the signed-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tasks in the order the server returns them
    List {
        /// Only tasks with this status
        #[arg(long, short)]
        status: Option<String>,
        /// Only tasks with this priority
        #[arg(long, short)]
        priority: Option<String>,
        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: ListFormat,
    },

    /// Show task counts
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one task
    Show {
        id: TaskId,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List overdue tasks
    Overdue {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a task (prompts when no fields are given)
    Add {
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Edit a task (prompts when no fields are given)
    Edit {
        id: TaskId,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Mark a task done, or reopen a done task
    Toggle { id: TaskId },

    /// Delete a task
    Delete {
        id: TaskId,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Interactive session
    Shell,

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Inspect the local event log
    Logs {
        #[command(subcommand)]
        command: LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Signin { username } => auth::run_sign_in(username),
        Commands::Signup { args } => auth::run_sign_up(args),
        Commands::Signout => auth::run_sign_out(),
        Commands::Whoami { json } => auth::run_whoami(json),
        Commands::List {
            status,
            priority,
            format,
        } => tasks::run_list(status, priority, format),
        Commands::Stats { json } => tasks::run_stats(json),
        Commands::Show { id, json } => tasks::run_show(id, json),
        Commands::Overdue { json } => tasks::run_overdue(json),
        Commands::Add { fields } => tasks::run_add(fields),
        Commands::Edit { id, fields } => tasks::run_edit(id, fields),
        Commands::Toggle { id } => tasks::run_toggle(id),
        Commands::Delete { id, force } => tasks::run_delete(id, force),
        Commands::Shell => shell::run(),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
