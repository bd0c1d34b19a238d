//! Task service port
//!
//! Defines the interface to the remote task-management API. The controller
//! talks to the server only through this trait, so tests can swap in an
//! in-memory implementation.

use crate::domain::result::Result;
use crate::domain::{Credentials, SignInResponse, SignUpRequest, Task, TaskFields, TaskId, TaskStatus};

/// Remote task service
///
/// Every task call takes the bearer token of the current session; the two
/// auth calls are unauthenticated. Implementations map a non-success
/// response to `Error::Application` and a failed request to
/// `Error::Transport`.
pub trait TaskApi: Send + Sync {
    /// Exchange credentials for a session token
    fn sign_in(&self, credentials: &Credentials) -> Result<SignInResponse>;

    /// Register a new account (does not sign in)
    fn sign_up(&self, request: &SignUpRequest) -> Result<()>;

    /// All tasks of the token's user
    fn list_tasks(&self, token: &str) -> Result<Vec<Task>>;

    /// A single task by id
    fn get_task(&self, token: &str, id: TaskId) -> Result<Task>;

    /// Tasks whose deadline has passed and are not done, as judged by the server
    fn list_overdue(&self, token: &str) -> Result<Vec<Task>>;

    fn create_task(&self, token: &str, fields: &TaskFields) -> Result<Task>;

    fn update_task(&self, token: &str, id: TaskId, fields: &TaskFields) -> Result<Task>;

    /// Partial update carrying only the new status
    fn update_status(&self, token: &str, id: TaskId, status: TaskStatus) -> Result<Task>;

    fn delete_task(&self, token: &str, id: TaskId) -> Result<()>;
}
