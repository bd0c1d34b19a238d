//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O.

mod notification;
mod session;
pub mod result;
pub mod task;

pub use notification::{Notification, NotificationKind};
pub use session::{Credentials, Session, SignInResponse, SignUpRequest, UserProfile};
pub use task::{Task, TaskFields, TaskId, TaskPriority, TaskStatus};
