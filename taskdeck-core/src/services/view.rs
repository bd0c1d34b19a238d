//! Rendering and filtering
//!
//! Turns the task cache into a toolkit-independent view model. Nothing here
//! does I/O, so every rule (filters, stats, overdue markers, labels) is unit
//! tested without a terminal or browser.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::domain::{Task, TaskId, TaskPriority, TaskStatus};

/// Placeholder shown when the filtered list is empty
pub const EMPTY_MESSAGE: &str = "No tasks found. Create your first task!";

/// Current filter selection; `None` leaves a dimension unconstrained
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.as_ref().map_or(true, |s| task.status == *s)
            && self.priority.as_ref().map_or(true, |p| task.priority == *p)
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none()
    }
}

/// Tasks matching every present filter, in their incoming order
pub fn filter<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

/// Aggregate counts shown above the list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    pub overdue: usize,
}

impl TaskStats {
    pub fn total(&self) -> usize {
        self.todo + self.in_progress + self.done
    }
}

/// Count tasks per status plus overdue ones, over the whole cache
pub fn compute_stats(tasks: &[Task], now: DateTime<Utc>) -> TaskStats {
    tasks.iter().fold(TaskStats::default(), |mut stats, task| {
        match task.status {
            TaskStatus::Todo => stats.todo += 1,
            TaskStatus::InProgress => stats.in_progress += 1,
            TaskStatus::Done => stats.done += 1,
            TaskStatus::Other(_) => {}
        }
        if task.is_overdue(now) {
            stats.overdue += 1;
        }
        stats
    })
}

/// Deadline line of a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlineView {
    pub text: String,
    pub overdue: bool,
}

/// One rendered task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskCard {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub status_label: String,
    /// Styling hook, e.g. `in-progress`
    pub status_class: String,
    pub priority: TaskPriority,
    pub priority_label: String,
    /// Styling hook, e.g. `high`
    pub priority_class: String,
    pub description: Option<String>,
    pub deadline: Option<DeadlineView>,
    /// `Reopen` for done tasks, `Complete` otherwise
    pub toggle_label: String,
}

/// Body of the task list: either cards or the empty-state placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TaskListBody {
    Empty { message: String },
    Cards { cards: Vec<TaskCard> },
}

/// Everything needed to draw the app view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListView {
    pub stats: TaskStats,
    pub filter: TaskFilter,
    pub body: TaskListBody,
}

impl TaskListView {
    pub fn cards(&self) -> &[TaskCard] {
        match &self.body {
            TaskListBody::Cards { cards } => cards,
            TaskListBody::Empty { .. } => &[],
        }
    }
}

/// Render one task
pub fn render_card(task: &Task, now: DateTime<Utc>) -> TaskCard {
    TaskCard {
        id: task.id,
        title: task.title.clone(),
        status: task.status.clone(),
        status_label: format_status(task.status.as_str()),
        status_class: task.status.as_str().to_lowercase().replace('_', "-"),
        priority: task.priority.clone(),
        priority_label: task.priority.as_str().to_string(),
        priority_class: task.priority.as_str().to_lowercase(),
        description: task
            .description
            .as_ref()
            .filter(|d| !d.is_empty())
            .cloned(),
        deadline: task.deadline.map(|deadline| DeadlineView {
            text: format_date_time(&deadline),
            overdue: task.is_overdue(now),
        }),
        toggle_label: if task.status == TaskStatus::Done {
            "Reopen".to_string()
        } else {
            "Complete".to_string()
        },
    }
}

/// Render the app view: stats over the full cache, cards for the filtered subset
pub fn render(tasks: &[Task], task_filter: &TaskFilter, now: DateTime<Utc>) -> TaskListView {
    let visible = filter(tasks, task_filter);
    let body = if visible.is_empty() {
        TaskListBody::Empty {
            message: EMPTY_MESSAGE.to_string(),
        }
    } else {
        TaskListBody::Cards {
            cards: visible.into_iter().map(|t| render_card(t, now)).collect(),
        }
    };

    TaskListView {
        stats: compute_stats(tasks, now),
        filter: task_filter.clone(),
        body,
    }
}

/// Human label for a status wire value; unknown values pass through
pub fn format_status(status: &str) -> String {
    match status {
        "TODO" => "To Do".to_string(),
        "IN_PROGRESS" => "In Progress".to_string(),
        "DONE" => "Done".to_string(),
        other => other.to_string(),
    }
}

/// Local date plus local hour:minute, no seconds
pub fn format_date_time(value: &DateTime<Utc>) -> String {
    value.with_timezone(&Local).format("%x %H:%M").to_string()
}

/// Strip control characters so task text cannot drive the terminal
pub fn sanitize_terminal(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' | '\t' => ' ',
            c if c.is_control() => '\u{FFFD}',
            c => c,
        })
        .collect()
}
