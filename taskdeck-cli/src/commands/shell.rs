//! Interactive shell - the auth and app views in one session

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use dialoguer::Select;
use taskdeck_core::services::view::{format_status, sanitize_terminal, TaskFilter};
use taskdeck_core::services::EntryPoint;
use taskdeck_core::{AppController, Outcome, TaskId, TaskPriority, TaskStatus, View};

use super::auth::{print_welcome, sign_in_flow, sign_up_flow, SignUpArgs};
use super::tasks::{print_view, prompt_fields};
use super::{get_context, get_logger, log_outcome, with_spinner, TerminalConfirmer};
use crate::output;

const AUTH_ACTIONS: [&str; 3] = ["Sign in", "Sign up", "Quit"];

const APP_ACTIONS: [&str; 9] = [
    "Refresh",
    "Add task",
    "Edit task",
    "Toggle complete",
    "Delete task",
    "Filter",
    "Clear filter",
    "Sign out",
    "Quit",
];

/// Pick a task from the current (filtered) list
fn pick_task(controller: &AppController) -> Result<Option<TaskId>> {
    let cards = controller.view_model(Utc::now()).cards().to_vec();
    if cards.is_empty() {
        println!("{}", "No tasks to choose from".dimmed());
        return Ok(None);
    }
    let labels: Vec<String> = cards
        .iter()
        .map(|c| format!("#{} {} [{}]", c.id, sanitize_terminal(&c.title), c.status_label))
        .collect();
    let index = Select::new()
        .with_prompt("Task")
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(index.map(|i| cards[i].id))
}

fn pick_filter(current: &TaskFilter) -> Result<TaskFilter> {
    let mut statuses = vec!["All statuses".to_string()];
    statuses.extend(TaskStatus::ALL.iter().map(|s| format_status(s.as_str())));
    let status_default = current
        .status
        .as_ref()
        .and_then(|s| TaskStatus::ALL.iter().position(|x| x == s))
        .map_or(0, |i| i + 1);
    let status = Select::new()
        .with_prompt("Status")
        .items(&statuses)
        .default(status_default)
        .interact()?;

    let mut priorities = vec!["All priorities".to_string()];
    priorities.extend(TaskPriority::ALL.iter().map(|p| p.to_string()));
    let priority_default = current
        .priority
        .as_ref()
        .and_then(|p| TaskPriority::ALL.iter().position(|x| x == p))
        .map_or(0, |i| i + 1);
    let priority = Select::new()
        .with_prompt("Priority")
        .items(&priorities)
        .default(priority_default)
        .interact()?;

    Ok(TaskFilter {
        status: status.checked_sub(1).map(|i| TaskStatus::ALL[i].clone()),
        priority: priority.checked_sub(1).map(|i| TaskPriority::ALL[i].clone()),
    })
}

/// Print notices that have not expired yet, toast style
fn show_notices(controller: &mut AppController) {
    let now = Utc::now();
    controller.expire_notices(now);
    for notice in controller.notices().active(now) {
        output::notice(notice);
    }
}

fn render_app(controller: &AppController) {
    println!();
    print_welcome(controller);
    print_view(&controller.view_model(Utc::now()));
}

/// Run one app-view action; `None` means quit
fn app_action(controller: &mut AppController, action: usize) -> Result<Option<(&'static str, Outcome)>> {
    let result = match APP_ACTIONS[action] {
        "Refresh" => ("refresh", with_spinner("Loading tasks...", || controller.load_tasks())),
        "Add task" => {
            let defaults = controller.open_create().fields.clone();
            let fields = prompt_fields(&defaults)?;
            ("add", with_spinner("Saving task...", || controller.submit_editor(fields)))
        }
        "Edit task" => {
            let Some(id) = pick_task(controller)? else {
                return Ok(Some(("edit", Outcome::Cancelled)));
            };
            let Some(current) = controller.open_edit(id).map(|e| e.fields.clone()) else {
                return Ok(Some(("edit", Outcome::Skipped)));
            };
            let fields = prompt_fields(&current)?;
            ("edit", with_spinner("Saving task...", || controller.submit_editor(fields)))
        }
        "Toggle complete" => match pick_task(controller)? {
            Some(id) => ("toggle", with_spinner("Updating task...", || controller.toggle_status(id))),
            None => ("toggle", Outcome::Cancelled),
        },
        "Delete task" => match pick_task(controller)? {
            Some(id) => ("delete", controller.delete_task(id, &TerminalConfirmer)),
            None => ("delete", Outcome::Cancelled),
        },
        "Filter" => {
            let filter = pick_filter(controller.filter())?;
            controller.set_filter(filter);
            ("filter", Outcome::Done)
        }
        "Clear filter" => {
            controller.set_filter(TaskFilter::default());
            ("filter", Outcome::Done)
        }
        "Sign out" => ("signout", controller.sign_out()),
        _ => return Ok(None),
    };
    Ok(Some(result))
}

pub fn run() -> Result<()> {
    let logger = get_logger(EntryPoint::Shell);
    let ctx = get_context()?;
    let mut controller = ctx.controller();

    println!("{}", "taskdeck shell".bold());
    println!("{}", format!("Server: {}", ctx.config.base_url).dimmed());

    let outcome = with_spinner("Loading tasks...", || controller.startup());
    log_outcome(&logger, "startup", &controller, outcome);

    loop {
        show_notices(&mut controller);
        match controller.view() {
            View::Auth => {
                println!();
                let choice = Select::new()
                    .with_prompt("Welcome")
                    .items(&AUTH_ACTIONS)
                    .default(0)
                    .interact_opt()?;
                let (command, outcome) = match choice {
                    Some(0) => ("signin", sign_in_flow(&mut controller, None)?),
                    Some(1) => {
                        ("signup", sign_up_flow(&mut controller, SignUpArgs::default())?)
                    }
                    _ => break,
                };
                log_outcome(&logger, command, &controller, outcome);
            }
            View::App => {
                render_app(&controller);
                let choice = Select::new()
                    .with_prompt("Action")
                    .items(&APP_ACTIONS)
                    .default(0)
                    .interact_opt()?;
                let Some(action) = choice else {
                    break;
                };
                match app_action(&mut controller, action)? {
                    Some((command, outcome)) => {
                        if outcome == Outcome::Cancelled {
                            controller.close_editor();
                        }
                        log_outcome(&logger, command, &controller, outcome);
                    }
                    None => break,
                }
            }
        }
    }

    // The session stays saved for the next run
    println!("{}", "Bye".dimmed());
    Ok(())
}
