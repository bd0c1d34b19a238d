//! Task domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Server-assigned task identifier
pub type TaskId = i64;

/// Workflow state of a task.
///
/// Values the client does not know are kept verbatim in `Other` so one odd
/// task never breaks decoding of a whole list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Other(String),
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Wire value (`TODO`, `IN_PROGRESS`, `DONE`, or the raw unknown value)
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::Other(raw) => raw,
        }
    }

    /// Status the completion toggle moves to.
    ///
    /// Only DONE goes back to TODO; everything else goes to DONE.
    pub fn toggle_target(&self) -> TaskStatus {
        match self {
            TaskStatus::Done => TaskStatus::Todo,
            _ => TaskStatus::Done,
        }
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "TODO" => TaskStatus::Todo,
            "IN_PROGRESS" => TaskStatus::InProgress,
            "DONE" => TaskStatus::Done,
            _ => TaskStatus::Other(raw),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "TODO" | "TO_DO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            other => Err(Error::validation(format!(
                "Unknown status '{}'. Expected TODO, IN_PROGRESS or DONE",
                other
            ))),
        }
    }
}

/// Task priority; unknown server values are kept in `Other`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Other(String),
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Other(raw) => raw,
        }
    }
}

impl From<String> for TaskPriority {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "LOW" => TaskPriority::Low,
            "MEDIUM" => TaskPriority::Medium,
            "HIGH" => TaskPriority::High,
            _ => TaskPriority::Other(raw),
        }
    }
}

impl From<TaskPriority> for String {
    fn from(priority: TaskPriority) -> Self {
        match priority {
            TaskPriority::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(TaskPriority::Low),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "HIGH" => Ok(TaskPriority::High),
            other => Err(Error::validation(format!(
                "Unknown priority '{}'. Expected LOW, MEDIUM or HIGH",
                other
            ))),
        }
    }
}

/// A task as returned by the task service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default, with = "timestamp")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a task with required fields (defaults: TODO, MEDIUM)
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            deadline: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Deadline has passed and the task is not done
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) => deadline < now && self.status != TaskStatus::Done,
            None => false,
        }
    }

    /// Editable fields of this task, for prefilling an edit form
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
            priority: self.priority.clone(),
            deadline: self.deadline,
        }
    }
}

/// Body submitted when creating or updating a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(with = "timestamp")]
    pub deadline: Option<DateTime<Utc>>,
}

impl Default for TaskFields {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            deadline: None,
        }
    }
}

impl TaskFields {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Validate and normalize before submission
    ///
    /// Title is trimmed and required; a blank description becomes absent.
    pub fn normalized(mut self) -> Result<Self> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(Error::validation("Title is required"));
        }
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok(self)
    }
}

/// Parse a deadline typed by the user.
///
/// Accepts RFC 3339 (`2024-05-01T17:00:00Z`), or a local date-time in
/// `YYYY-MM-DDTHH:MM` / `YYYY-MM-DD HH:MM` form.
pub fn parse_deadline_input(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    timestamp::parse(trimmed).ok_or_else(|| {
        Error::validation(format!(
            "Invalid deadline '{}'. Use YYYY-MM-DD HH:MM or RFC 3339",
            trimmed
        ))
    })
}

/// Parse a task id typed by the user
pub fn parse_task_id(input: &str) -> Result<TaskId> {
    input
        .trim()
        .parse::<TaskId>()
        .map_err(|_| Error::validation(format!("Invalid task id '{}'", input.trim())))
}

/// Lenient timestamp (de)serialization for task dates.
///
/// Output is ISO-8601 UTC with millisecond precision. Input accepts RFC 3339
/// or a naive date-time, which is read in the local timezone.
pub mod timestamp {
    use super::*;
    use serde::{Deserializer, Serializer};

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&format(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        let value: Option<String> = Option::deserialize(deserializer)?;
        match value {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse(s.trim())
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", s))),
        }
    }
}
