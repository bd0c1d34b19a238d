//! Task service - CRUD calls against the task API

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{Task, TaskFields, TaskId, TaskStatus};
use crate::ports::TaskApi;

/// Whether a save creates a new task or updates an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Update(TaskId),
}

/// A typed save command: what to do plus the submitted fields
#[derive(Debug, Clone, PartialEq)]
pub struct SaveTask {
    pub mode: SaveMode,
    pub fields: TaskFields,
}

impl SaveTask {
    pub fn create(fields: TaskFields) -> Self {
        Self {
            mode: SaveMode::Create,
            fields,
        }
    }

    pub fn update(id: TaskId, fields: TaskFields) -> Self {
        Self {
            mode: SaveMode::Update(id),
            fields,
        }
    }
}

/// Status change produced by the completion toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub id: TaskId,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

impl StatusChange {
    /// Toggle target for `task`
    pub fn toggle(task: &Task) -> Self {
        Self {
            id: task.id,
            from: task.status.clone(),
            to: task.status.toggle_target(),
        }
    }

    pub fn completes(&self) -> bool {
        self.to == TaskStatus::Done
    }
}

pub struct TaskService {
    api: Arc<dyn TaskApi>,
}

impl TaskService {
    pub fn new(api: Arc<dyn TaskApi>) -> Self {
        Self { api }
    }

    pub fn list(&self, token: &str) -> Result<Vec<Task>> {
        self.api.list_tasks(token)
    }

    pub fn get(&self, token: &str, id: TaskId) -> Result<Task> {
        self.api.get_task(token, id)
    }

    pub fn overdue(&self, token: &str) -> Result<Vec<Task>> {
        self.api.list_overdue(token)
    }

    /// Validate the fields, then create or update
    pub fn save(&self, token: &str, command: &SaveTask) -> Result<Task> {
        let fields = command.fields.clone().normalized()?;
        match command.mode {
            SaveMode::Create => self.api.create_task(token, &fields),
            SaveMode::Update(id) => self.api.update_task(token, id, &fields),
        }
    }

    /// Send only the new status
    pub fn set_status(&self, token: &str, change: &StatusChange) -> Result<Task> {
        self.api.update_status(token, change.id, change.to.clone())
    }

    pub fn delete(&self, token: &str, id: TaskId) -> Result<()> {
        self.api.delete_task(token, id)
    }
}
