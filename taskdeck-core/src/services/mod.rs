//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod auth;
pub mod html;
pub mod logging;
pub mod notifications;
pub mod session_store;
pub mod task_cache;
pub mod tasks;
pub mod view;

pub use auth::{AuthService, SignedIn};
pub use logging::{EntryPoint, LogEntry, LogEvent, LogFilter, LoggingService};
pub use notifications::NotificationCenter;
pub use session_store::SessionStore;
pub use task_cache::{FetchTicket, TaskCache};
pub use tasks::{SaveMode, SaveTask, StatusChange, TaskService};
pub use view::{TaskCard, TaskFilter, TaskListBody, TaskListView, TaskStats};
