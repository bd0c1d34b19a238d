//! Taskdeck Core - client logic for a task-management REST service
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: Tasks, sessions, notices and the error type
//! - **ports**: Trait definitions for external dependencies (TaskApi, KeyValueStore)
//! - **services**: Auth, task CRUD, rendering, notices and event logging
//! - **adapters**: Concrete implementations (reqwest, file and memory stores)
//! - **controller**: The single owner of client state

pub mod adapters;
pub mod config;
pub mod controller;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::file_store::FileKeyValueStore;
use adapters::http::HttpTaskApi;
use config::Config;
use services::SessionStore;

// Re-export commonly used types at crate root
pub use controller::{AppController, AuthTab, Outcome, TaskEditor, View};
pub use domain::result::Error;
pub use domain::{
    Credentials, Notification, NotificationKind, Session, SignUpRequest, Task, TaskFields,
    TaskId, TaskPriority, TaskStatus, UserProfile,
};

/// Main context for taskdeck operations
///
/// Holds the configuration, the HTTP client and the persisted session store
/// for one taskdeck directory.
pub struct TaskdeckContext {
    pub config: Config,
    pub api: Arc<HttpTaskApi>,
    pub sessions: SessionStore,
    taskdeck_dir: PathBuf,
}

impl TaskdeckContext {
    pub fn new(taskdeck_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(taskdeck_dir)
            .with_context(|| format!("Failed to create {:?}", taskdeck_dir))?;
        let config = Config::load(taskdeck_dir)?;

        let api = Arc::new(
            HttpTaskApi::with_timeout(&config.base_url, config.timeout_secs)
                .with_context(|| format!("Invalid API URL '{}'", config.base_url))?,
        );

        let store = FileKeyValueStore::new(&taskdeck_dir.join("session"))
            .context("Failed to open session store")?;
        let sessions = SessionStore::new(Arc::new(store));

        Ok(Self {
            config,
            api,
            sessions,
            taskdeck_dir: taskdeck_dir.to_path_buf(),
        })
    }

    /// Fresh controller over this context; call `startup()` to restore the session
    pub fn controller(&self) -> AppController {
        AppController::new(self.api.clone(), self.sessions.clone()).with_notice_ttl(
            chrono::Duration::seconds(self.config.notification_ttl_secs),
        )
    }

    pub fn taskdeck_dir(&self) -> &Path {
        &self.taskdeck_dir
    }
}
