//! Application controller
//!
//! Owns every piece of mutable client state: the session, the current view,
//! the task cache, the filter selection, the task editor and the notice
//! queue. Each operation runs to completion, recovers its own failures into
//! a notice, and reports an [`Outcome`] so a front end can pick an exit code.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Credentials, NotificationKind, Session, SignUpRequest, Task, TaskFields, TaskId,
};
use crate::ports::{Confirmer, TaskApi};
use crate::services::auth::AuthService;
use crate::services::notifications::NotificationCenter;
use crate::services::session_store::SessionStore;
use crate::services::task_cache::TaskCache;
use crate::services::tasks::{SaveMode, SaveTask, StatusChange, TaskService};
use crate::services::view::{self, TaskFilter, TaskListView};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

const SIGN_IN_NETWORK: &str = "Network error. Please try again.";

/// Which of the two mutually exclusive views is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Auth,
    App,
}

/// Tab inside the auth view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTab {
    SignIn,
    SignUp,
}

/// How a controller operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// An error notice was queued
    Failed,
    /// The user declined
    Cancelled,
    /// Nothing to do (unknown task, no stored session)
    Skipped,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed)
    }
}

/// Open create/edit form
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEditor {
    pub mode: SaveMode,
    pub fields: TaskFields,
}

impl TaskEditor {
    pub fn title(&self) -> &'static str {
        match self.mode {
            SaveMode::Create => "Add New Task",
            SaveMode::Update(_) => "Edit Task",
        }
    }
}

/// Message for flows that never surface the server's text
fn fixed_message(err: &Error, fallback: &str, network: &str) -> String {
    match err {
        Error::Transport(_) => network.to_string(),
        _ => fallback.to_string(),
    }
}

pub struct AppController {
    auth: AuthService,
    tasks: TaskService,
    session: Option<Session>,
    view: View,
    auth_tab: AuthTab,
    cache: TaskCache,
    filter: TaskFilter,
    editor: Option<TaskEditor>,
    notices: NotificationCenter,
}

impl AppController {
    pub fn new(api: Arc<dyn TaskApi>, sessions: SessionStore) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&api), sessions),
            tasks: TaskService::new(api),
            session: None,
            view: View::Auth,
            auth_tab: AuthTab::SignIn,
            cache: TaskCache::new(),
            filter: TaskFilter::default(),
            editor: None,
            notices: NotificationCenter::default(),
        }
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notices = NotificationCenter::new(ttl);
        self
    }

    fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) -> Uuid {
        self.notices.push(message, kind, Utc::now())
    }

    /// Bearer token of the current session
    pub fn token(&self) -> Result<String> {
        self.session
            .as_ref()
            .map(|session| session.token.clone())
            .ok_or(Error::NotAuthenticated)
    }

    /// Token, or a warning notice and `None` when signed out
    fn require_token(&mut self) -> Option<String> {
        match self.token() {
            Ok(token) => Some(token),
            Err(e) => {
                self.notify(e.to_string(), NotificationKind::Warning);
                None
            }
        }
    }

    // Auth

    /// Adopt a persisted session without contacting the server
    pub fn restore_session(&mut self) -> Outcome {
        match self.auth.restore() {
            Ok(Some(session)) => {
                self.session = Some(session);
                self.view = View::App;
                Outcome::Done
            }
            Ok(None) => {
                self.view = View::Auth;
                Outcome::Skipped
            }
            Err(e) => {
                self.view = View::Auth;
                self.notify(format!("Could not read saved session: {}", e), NotificationKind::Warning);
                Outcome::Skipped
            }
        }
    }

    /// Restore the session and, if there is one, load tasks
    pub fn startup(&mut self) -> Outcome {
        match self.restore_session() {
            Outcome::Done => self.load_tasks(),
            other => other,
        }
    }

    pub fn sign_in(&mut self, username: &str, password: &str) -> Outcome {
        if username.trim().is_empty() || password.is_empty() {
            self.notify("Username and password are required", NotificationKind::Error);
            return Outcome::Failed;
        }

        match self.auth.sign_in(&Credentials::new(username.trim(), password)) {
            Ok(signed_in) => {
                self.session = Some(signed_in.session);
                self.notify("Login successful!", NotificationKind::Success);
                if let Some(e) = signed_in.persist_error {
                    self.notify(
                        format!("Signed in, but the session could not be saved: {}", e),
                        NotificationKind::Warning,
                    );
                }
                self.view = View::App;
                self.editor = None;
                self.load_tasks();
                Outcome::Done
            }
            Err(e) => {
                self.notify(e.user_message("Login failed", SIGN_IN_NETWORK), NotificationKind::Error);
                Outcome::Failed
            }
        }
    }

    pub fn sign_up(&mut self, request: &SignUpRequest) -> Outcome {
        match self.auth.sign_up(request) {
            Ok(()) => {
                self.notify("Registration successful! Please login.", NotificationKind::Success);
                self.auth_tab = AuthTab::SignIn;
                Outcome::Done
            }
            Err(e) => {
                self.notify(
                    e.user_message("Registration failed", SIGN_IN_NETWORK),
                    NotificationKind::Error,
                );
                Outcome::Failed
            }
        }
    }

    /// Always succeeds; a storage failure only adds a warning
    pub fn sign_out(&mut self) -> Outcome {
        self.session = None;
        self.cache.clear();
        self.editor = None;
        self.filter = TaskFilter::default();
        self.view = View::Auth;
        self.auth_tab = AuthTab::SignIn;

        if let Err(e) = self.auth.sign_out() {
            self.notify(format!("Could not clear saved session: {}", e), NotificationKind::Warning);
        }
        self.notify("Logged out successfully", NotificationKind::Info);
        Outcome::Done
    }

    pub fn show_tab(&mut self, tab: AuthTab) {
        self.auth_tab = tab;
    }

    // Tasks

    /// Replace the cache with the server's list
    pub fn load_tasks(&mut self) -> Outcome {
        let Some(token) = self.require_token() else {
            return Outcome::Failed;
        };

        let ticket = self.cache.begin_fetch();
        match self.tasks.list(&token) {
            Ok(tasks) => {
                self.cache.complete_fetch(ticket, tasks);
                Outcome::Done
            }
            Err(e) => {
                self.notify(
                    fixed_message(&e, "Failed to load tasks", "Network error while loading tasks"),
                    NotificationKind::Error,
                );
                Outcome::Failed
            }
        }
    }

    /// Create or update, then reload. The editor stays open on failure.
    pub fn save_task(&mut self, command: SaveTask) -> Outcome {
        let Some(token) = self.require_token() else {
            return Outcome::Failed;
        };

        match self.tasks.save(&token, &command) {
            Ok(_) => {
                let msg = match command.mode {
                    SaveMode::Create => "Task created successfully!",
                    SaveMode::Update(_) => "Task updated successfully!",
                };
                self.notify(msg, NotificationKind::Success);
                self.editor = None;
                self.load_tasks();
                Outcome::Done
            }
            Err(e) => {
                self.notify(
                    e.user_message("Failed to save task", "Network error while saving task"),
                    NotificationKind::Error,
                );
                Outcome::Failed
            }
        }
    }

    /// Open an empty form (TODO / MEDIUM)
    pub fn open_create(&mut self) -> &TaskEditor {
        self.editor.insert(TaskEditor {
            mode: SaveMode::Create,
            fields: TaskFields::default(),
        })
    }

    /// Open a form prefilled from the cached task; unknown ids open nothing
    pub fn open_edit(&mut self, id: TaskId) -> Option<&TaskEditor> {
        let fields = self.cache.get(id)?.fields();
        Some(self.editor.insert(TaskEditor {
            mode: SaveMode::Update(id),
            fields,
        }))
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Save the open editor with the submitted fields
    pub fn submit_editor(&mut self, fields: TaskFields) -> Outcome {
        let Some(editor) = self.editor.as_mut() else {
            return Outcome::Skipped;
        };
        editor.fields = fields.clone();
        let command = SaveTask {
            mode: editor.mode,
            fields,
        };
        self.save_task(command)
    }

    /// Delete after explicit confirmation, then reload
    pub fn delete_task(&mut self, id: TaskId, confirmer: &dyn Confirmer) -> Outcome {
        if self.session.is_none() {
            self.require_token();
            return Outcome::Failed;
        }

        match confirmer.confirm(DELETE_PROMPT) {
            Ok(true) => {}
            Ok(false) => return Outcome::Cancelled,
            Err(e) => {
                self.notify(format!("Confirmation failed: {}", e), NotificationKind::Error);
                return Outcome::Failed;
            }
        }

        let Some(token) = self.require_token() else {
            return Outcome::Failed;
        };
        match self.tasks.delete(&token, id) {
            Ok(()) => {
                self.notify("Task deleted successfully!", NotificationKind::Success);
                self.load_tasks();
                Outcome::Done
            }
            Err(e) => {
                self.notify(
                    fixed_message(&e, "Failed to delete task", "Network error while deleting task"),
                    NotificationKind::Error,
                );
                Outcome::Failed
            }
        }
    }

    /// Flip completion of a cached task, then reload
    pub fn toggle_status(&mut self, id: TaskId) -> Outcome {
        let Some(token) = self.require_token() else {
            return Outcome::Failed;
        };
        let Some(change) = self.cache.get(id).map(StatusChange::toggle) else {
            return Outcome::Skipped;
        };

        match self.tasks.set_status(&token, &change) {
            Ok(_) => {
                let msg = if change.completes() {
                    "Task marked as completed!"
                } else {
                    "Task marked as incomplete!"
                };
                self.notify(msg, NotificationKind::Success);
                self.load_tasks();
                Outcome::Done
            }
            Err(e) => {
                self.notify(
                    fixed_message(&e, "Failed to update task status", "Network error while updating task"),
                    NotificationKind::Error,
                );
                Outcome::Failed
            }
        }
    }

    /// One task straight from the server; the cache is not touched
    pub fn fetch_task(&mut self, id: TaskId) -> Option<Task> {
        let token = self.require_token()?;
        match self.tasks.get(&token, id) {
            Ok(task) => Some(task),
            Err(e) => {
                self.notify(
                    e.user_message("Failed to load task", "Network error while loading tasks"),
                    NotificationKind::Error,
                );
                None
            }
        }
    }

    /// Overdue tasks as judged by the server; the cache is not touched
    pub fn fetch_overdue(&mut self) -> Option<Vec<Task>> {
        let token = self.require_token()?;
        match self.tasks.overdue(&token) {
            Ok(tasks) => Some(tasks),
            Err(e) => {
                self.notify(
                    fixed_message(&e, "Failed to load tasks", "Network error while loading tasks"),
                    NotificationKind::Error,
                );
                None
            }
        }
    }

    // View

    /// Change the filter; only the rendering changes, no request
    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub fn view_model(&self, now: DateTime<Utc>) -> TaskListView {
        view::render(self.cache.tasks(), &self.filter, now)
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn auth_tab(&self) -> AuthTab {
        self.auth_tab
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// `Welcome, <username>!` while signed in
    pub fn welcome(&self) -> Option<String> {
        self.session.as_ref().map(Session::welcome)
    }

    pub fn tasks(&self) -> &[Task] {
        self.cache.tasks()
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub fn editor(&self) -> Option<&TaskEditor> {
        self.editor.as_ref()
    }

    // Notices

    pub fn notices(&self) -> &NotificationCenter {
        &self.notices
    }

    pub fn dismiss_notice(&mut self, id: Uuid) -> bool {
        self.notices.dismiss(id)
    }

    pub fn expire_notices(&mut self, now: DateTime<Utc>) {
        self.notices.expire(now)
    }

    pub fn drain_notices(&mut self) -> Vec<crate::domain::Notification> {
        self.notices.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::HttpTaskApi;
    use crate::adapters::memory_store::MemoryKeyValueStore;
    use crate::adapters::mock_server::{MockConfig, MockTaskServer};
    use crate::domain::TaskStatus;
    use crate::ports::AlwaysConfirm;

    fn controller(server: &MockTaskServer) -> (AppController, SessionStore) {
        let api = Arc::new(HttpTaskApi::new(&server.base_url()).unwrap());
        let sessions = SessionStore::new(Arc::new(MemoryKeyValueStore::new()));
        (AppController::new(api, sessions.clone()), sessions)
    }

    fn messages(c: &mut AppController) -> Vec<String> {
        c.drain_notices().into_iter().map(|n| n.message).collect()
    }

    #[test]
    fn test_sign_in_over_http() {
        let server = MockTaskServer::start(MockConfig::default()).unwrap();
        let (mut c, sessions) = controller(&server);

        assert_eq!(c.sign_in("ada", "secret"), Outcome::Done);
        assert_eq!(c.view(), View::App);
        assert_eq!(c.welcome().as_deref(), Some("Welcome, ada!"));
        assert!(sessions.load().unwrap().is_some());
        assert_eq!(messages(&mut c), vec!["Login successful!"]);
    }

    #[test]
    fn test_bad_credentials_show_server_message() {
        let server = MockTaskServer::start(MockConfig::default()).unwrap();
        let (mut c, _) = controller(&server);

        assert_eq!(c.sign_in("ada", "wrong"), Outcome::Failed);
        assert_eq!(c.view(), View::Auth);
        assert_eq!(messages(&mut c), vec!["Bad credentials"]);
    }

    #[test]
    fn test_crud_over_http() {
        let server = MockTaskServer::start(MockConfig::default()).unwrap();
        let (mut c, _) = controller(&server);
        c.sign_in("ada", "secret");

        c.open_create();
        assert_eq!(c.submit_editor(TaskFields::new("Write report")), Outcome::Done);
        assert!(c.editor().is_none());
        assert_eq!(c.tasks().len(), 1);
        let id = c.tasks()[0].id;

        assert_eq!(c.toggle_status(id), Outcome::Done);
        assert_eq!(c.tasks()[0].status, TaskStatus::Done);

        assert_eq!(c.delete_task(id, &AlwaysConfirm(true)), Outcome::Done);
        assert!(c.tasks().is_empty());
    }

    #[test]
    fn test_load_failure_keeps_cache() {
        let server = MockTaskServer::start(MockConfig { fail_tasks: true }).unwrap();
        let (mut c, _) = controller(&server);

        assert_eq!(c.sign_in("ada", "secret"), Outcome::Done);
        assert!(c.tasks().is_empty());
        assert_eq!(
            messages(&mut c),
            vec!["Login successful!", "Failed to load tasks"]
        );
    }

    #[test]
    fn test_operations_require_session() {
        let server = MockTaskServer::start(MockConfig::default()).unwrap();
        let (mut c, _) = controller(&server);

        assert_eq!(c.load_tasks(), Outcome::Failed);
        assert_eq!(c.toggle_status(1), Outcome::Failed);
        assert!(c.fetch_overdue().is_none());
        let msgs = messages(&mut c);
        assert_eq!(msgs.len(), 3);
        assert!(msgs.iter().all(|m| m == "Please sign in first"));
        assert!(matches!(c.token(), Err(Error::NotAuthenticated)));
    }
}
