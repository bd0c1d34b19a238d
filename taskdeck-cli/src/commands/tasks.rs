//! Task commands - list, stats, show, overdue, add, edit, toggle, delete

use anyhow::{bail, Result};
use chrono::Utc;
use colored::Colorize;
use comfy_table::Cell;
use dialoguer::{Input, Select};
use taskdeck_core::domain::task::{parse_deadline_input, timestamp};
use taskdeck_core::ports::AlwaysConfirm;
use taskdeck_core::services::html;
use taskdeck_core::services::view::{self, format_date_time, sanitize_terminal, TaskFilter, TaskListView, TaskStats};
use taskdeck_core::services::EntryPoint;
use taskdeck_core::{Outcome, Task, TaskFields, TaskId, TaskPriority, TaskStatus};

use super::{finish, get_context, get_logger, signed_in_controller, with_spinner, TerminalConfirmer};
use crate::output;

/// Field values given on the command line; `None` means "ask" or "keep"
#[derive(Default, clap::Args)]
pub struct FieldArgs {
    /// Task title
    #[arg(long, short)]
    pub title: Option<String>,
    /// Description; an empty string clears it
    #[arg(long, short)]
    pub description: Option<String>,
    /// TODO, IN_PROGRESS or DONE
    #[arg(long, short)]
    pub status: Option<String>,
    /// LOW, MEDIUM or HIGH
    #[arg(long, short)]
    pub priority: Option<String>,
    /// Deadline as YYYY-MM-DD HH:MM; an empty string clears it
    #[arg(long)]
    pub deadline: Option<String>,
}

impl FieldArgs {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
    }

    /// Overlay the given values on `base`. An empty deadline or description clears it.
    fn apply(self, mut base: TaskFields) -> Result<TaskFields> {
        if let Some(title) = self.title {
            base.title = title;
        }
        if let Some(description) = self.description {
            base.description = Some(description);
        }
        if let Some(status) = self.status {
            base.status = status.parse()?;
        }
        if let Some(priority) = self.priority {
            base.priority = priority.parse()?;
        }
        if let Some(deadline) = self.deadline {
            base.deadline = if deadline.trim().is_empty() {
                None
            } else {
                Some(parse_deadline_input(&deadline)?)
            };
        }
        Ok(base)
    }
}

/// Output format for `td list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListFormat {
    Table,
    Json,
    Csv,
    Html,
}

pub fn parse_filter(status: Option<&str>, priority: Option<&str>) -> Result<TaskFilter> {
    Ok(TaskFilter {
        status: status.map(str::parse::<TaskStatus>).transpose()?,
        priority: priority.map(str::parse::<TaskPriority>).transpose()?,
    })
}

/// Ask for every field, starting from `defaults`
pub fn prompt_fields(defaults: &TaskFields) -> Result<TaskFields> {
    let title: String = Input::new()
        .with_prompt("Title")
        .with_initial_text(defaults.title.clone())
        .interact_text()?;

    let description: String = Input::new()
        .with_prompt("Description (optional)")
        .with_initial_text(defaults.description.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let status_labels: Vec<String> = TaskStatus::ALL
        .iter()
        .map(|s| view::format_status(s.as_str()))
        .collect();
    let status_index = Select::new()
        .with_prompt("Status")
        .items(&status_labels)
        .default(TaskStatus::ALL.iter().position(|s| *s == defaults.status).unwrap_or(0))
        .interact()?;

    let priority_index = Select::new()
        .with_prompt("Priority")
        .items(&TaskPriority::ALL.iter().map(|p| p.to_string()).collect::<Vec<_>>())
        .default(TaskPriority::ALL.iter().position(|p| *p == defaults.priority).unwrap_or(1))
        .interact()?;

    let deadline_initial = defaults
        .deadline
        .map(|d| d.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    let deadline: String = Input::new()
        .with_prompt("Deadline (YYYY-MM-DD HH:MM, optional)")
        .with_initial_text(deadline_initial)
        .allow_empty(true)
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            if input.trim().is_empty() {
                return Ok(());
            }
            parse_deadline_input(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;

    FieldArgs {
        title: Some(title),
        description: Some(description),
        status: None,
        priority: None,
        deadline: Some(deadline),
    }
    .apply(TaskFields {
        status: TaskStatus::ALL[status_index].clone(),
        priority: TaskPriority::ALL[priority_index].clone(),
        ..defaults.clone()
    })
}

fn status_cell(task_status: &TaskStatus, label: &str) -> Cell {
    let label = match task_status {
        TaskStatus::Todo => label.normal(),
        TaskStatus::InProgress => label.cyan(),
        TaskStatus::Done => label.green(),
        TaskStatus::Other(_) => label.yellow(),
    };
    Cell::new(label.to_string())
}

fn priority_cell(priority: &TaskPriority) -> Cell {
    let label = match priority {
        TaskPriority::Low => priority.as_str().dimmed(),
        TaskPriority::High => priority.as_str().red().bold(),
        TaskPriority::Medium | TaskPriority::Other(_) => priority.as_str().normal(),
    };
    Cell::new(label.to_string())
}

pub fn print_stats(stats: &TaskStats) {
    println!(
        "  {} {}   {} {}   {} {}   {} {}",
        "To Do:".dimmed(),
        stats.todo,
        "In Progress:".dimmed(),
        stats.in_progress.to_string().cyan(),
        "Done:".dimmed(),
        stats.done.to_string().green(),
        "Overdue:".dimmed(),
        if stats.overdue > 0 {
            stats.overdue.to_string().red().bold()
        } else {
            stats.overdue.to_string().normal()
        }
    );
}

/// Cards as a table, or the empty-state line
pub fn print_view(view_model: &TaskListView) {
    print_stats(&view_model.stats);
    println!();

    let cards = view_model.cards();
    if cards.is_empty() {
        println!("{}", view::EMPTY_MESSAGE.dimmed());
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Title", "Status", "Priority", "Due", "Description"]);
    for card in cards {
        let due = match &card.deadline {
            Some(d) if d.overdue => format!("{} !", d.text).red().to_string(),
            Some(d) => d.text.clone(),
            None => String::new(),
        };
        table.add_row(vec![
            Cell::new(card.id),
            Cell::new(sanitize_terminal(&card.title)),
            status_cell(&card.status, &card.status_label),
            priority_cell(&card.priority),
            Cell::new(due),
            Cell::new(sanitize_terminal(card.description.as_deref().unwrap_or(""))),
        ]);
    }
    println!("{}", table);
}

fn print_tasks_table(tasks: &[Task]) {
    let now = Utc::now();
    let cards: Vec<_> = tasks.iter().map(|t| view::render_card(t, now)).collect();
    let mut table = output::create_table();
    table.set_header(vec!["ID", "Title", "Status", "Priority", "Due"]);
    for card in &cards {
        table.add_row(vec![
            Cell::new(card.id),
            Cell::new(sanitize_terminal(&card.title)),
            status_cell(&card.status, &card.status_label),
            priority_cell(&card.priority),
            Cell::new(card.deadline.as_ref().map(|d| d.text.clone()).unwrap_or_default()),
        ]);
    }
    println!("{}", table);
}

fn write_csv(view_model: &TaskListView, tasks: &[Task]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["id", "title", "status", "priority", "deadline", "overdue", "description"])?;
    for card in view_model.cards() {
        let deadline = tasks
            .iter()
            .find(|t| t.id == card.id)
            .and_then(|t| t.deadline.as_ref())
            .map(timestamp::format)
            .unwrap_or_default();
        writer.write_record([
            card.id.to_string(),
            card.title.clone(),
            card.status.as_str().to_string(),
            card.priority.as_str().to_string(),
            deadline,
            card.deadline.as_ref().map_or(false, |d| d.overdue).to_string(),
            card.description.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn run_list(status: Option<String>, priority: Option<String>, format: ListFormat) -> Result<()> {
    let filter = parse_filter(status.as_deref(), priority.as_deref())?;
    let ctx = get_context()?;
    let mut controller = signed_in_controller(&ctx, true);
    controller.set_filter(filter);

    let view_model = controller.view_model(Utc::now());
    match format {
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(&view_model)?),
        ListFormat::Csv => write_csv(&view_model, controller.tasks())?,
        ListFormat::Html => print!("{}", html::render_list(&view_model)),
        ListFormat::Table => {
            super::auth::print_welcome(&controller);
            print_view(&view_model);
        }
    }
    Ok(())
}

pub fn run_stats(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let controller = signed_in_controller(&ctx, true);
    let stats = controller.view_model(Utc::now()).stats;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "todo": stats.todo,
                "inProgress": stats.in_progress,
                "done": stats.done,
                "overdue": stats.overdue,
                "total": stats.total(),
            })
        );
    } else {
        println!("{}", "Task Statistics".bold());
        print_stats(&stats);
        println!("  {} {}", "Total:".dimmed(), stats.total());
    }
    Ok(())
}

pub fn run_show(id: TaskId, json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context()?;
    let mut controller = signed_in_controller(&ctx, false);

    let Some(task) = with_spinner("Loading task...", || controller.fetch_task(id)) else {
        finish(&mut controller, Outcome::Failed, &logger, "show");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
        return Ok(());
    }

    let card = view::render_card(&task, Utc::now());
    println!("{} {}", format!("#{}", card.id).dimmed(), sanitize_terminal(&card.title).bold());
    println!("  Status:   {}", card.status_label);
    println!("  Priority: {}", card.priority_label);
    if let Some(deadline) = &card.deadline {
        let text = if deadline.overdue {
            format!("{} (overdue)", deadline.text).red().to_string()
        } else {
            deadline.text.clone()
        };
        println!("  Due:      {}", text);
    }
    if let Some(created) = &task.created_at {
        println!("  Created:  {}", format_date_time(created));
    }
    if let Some(updated) = &task.updated_at {
        println!("  Updated:  {}", format_date_time(updated));
    }
    if let Some(description) = &card.description {
        println!();
        println!("{}", sanitize_terminal(description));
    }
    Ok(())
}

pub fn run_overdue(json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context()?;
    let mut controller = signed_in_controller(&ctx, false);

    let Some(tasks) = with_spinner("Loading overdue tasks...", || controller.fetch_overdue()) else {
        finish(&mut controller, Outcome::Failed, &logger, "overdue");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else if tasks.is_empty() {
        output::success("No overdue tasks");
    } else {
        println!("{}", format!("{} overdue task(s)", tasks.len()).red().bold());
        print_tasks_table(&tasks);
    }
    Ok(())
}

/// Flags overlay `base`; only a bare command prompts. A missing title is
/// left for save-time validation to report.
fn resolve_fields(
    args: FieldArgs,
    base: &TaskFields,
    prompt: impl FnOnce(&TaskFields) -> Result<TaskFields>,
) -> Result<TaskFields> {
    if args.is_empty() {
        prompt(base)
    } else {
        args.apply(base.clone())
    }
}

pub fn run_add(args: FieldArgs) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context()?;
    let mut controller = signed_in_controller(&ctx, false);

    let defaults = controller.open_create().fields.clone();
    let fields = resolve_fields(args, &defaults, prompt_fields)?;

    let outcome = with_spinner("Saving task...", || controller.submit_editor(fields));
    finish(&mut controller, outcome, &logger, "add");
    Ok(())
}

pub fn run_edit(id: TaskId, args: FieldArgs) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context()?;
    let mut controller = signed_in_controller(&ctx, true);

    let Some(editor) = controller.open_edit(id) else {
        bail!("Task {} not found", id);
    };
    let current = editor.fields.clone();
    let fields = resolve_fields(args, &current, prompt_fields)?;

    let outcome = with_spinner("Saving task...", || controller.submit_editor(fields));
    finish(&mut controller, outcome, &logger, "edit");
    Ok(())
}

pub fn run_toggle(id: TaskId) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context()?;
    let mut controller = signed_in_controller(&ctx, true);

    if controller.tasks().iter().all(|t| t.id != id) {
        bail!("Task {} not found", id);
    }
    let outcome = with_spinner("Updating task...", || controller.toggle_status(id));
    finish(&mut controller, outcome, &logger, "toggle");
    Ok(())
}

pub fn run_delete(id: TaskId, force: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context()?;
    let mut controller = signed_in_controller(&ctx, true);

    if let Some(task) = controller.tasks().iter().find(|t| t.id == id) {
        println!("{} {}", format!("#{}", id).dimmed(), sanitize_terminal(&task.title));
    }

    let outcome = if force {
        controller.delete_task(id, &AlwaysConfirm(true))
    } else {
        controller.delete_task(id, &TerminalConfirmer)
    };
    if outcome == Outcome::Cancelled {
        println!("{}", "Cancelled".dimmed());
        return Ok(());
    }
    finish(&mut controller, outcome, &logger, "delete");
    Ok(())
}
