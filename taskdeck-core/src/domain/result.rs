//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// Only two of these ever come back from the task service: `Application`
/// (the server answered with a non-success status) and `Transport` (no usable
/// answer at all). The rest are local failures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .message.as_deref().unwrap_or("Request failed"))]
    Application { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Please sign in first")]
    NotAuthenticated,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an application error from a response status and optional body message
    pub fn application(status: u16, message: Option<String>) -> Self {
        Self::Application { status, message }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// True when the request never produced a usable response
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Text shown to the user for a failed flow.
    ///
    /// Server-supplied messages win over `fallback`; transport failures always
    /// show `network`. Validation and missing-session messages are shown as-is.
    pub fn user_message(&self, fallback: &str, network: &str) -> String {
        match self {
            Self::Application { message: Some(m), .. } if !m.trim().is_empty() => m.clone(),
            Self::Transport(_) => network.to_string(),
            Self::Validation(m) => m.clone(),
            Self::NotAuthenticated => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = Error::application(400, Some("Username is already taken!".to_string()));
        assert_eq!(
            err.user_message("Registration failed", "Network error. Please try again."),
            "Username is already taken!"
        );
    }

    #[test]
    fn test_user_message_falls_back() {
        let err = Error::application(500, None);
        assert_eq!(err.user_message("Login failed", "offline"), "Login failed");

        let blank = Error::application(401, Some("   ".to_string()));
        assert_eq!(blank.user_message("Login failed", "offline"), "Login failed");
    }

    #[test]
    fn test_user_message_transport() {
        let err = Error::transport("connection refused");
        assert!(err.is_transport());
        assert_eq!(
            err.user_message("Failed to load tasks", "Network error while loading tasks"),
            "Network error while loading tasks"
        );
    }

    #[test]
    fn test_user_message_missing_session() {
        assert_eq!(
            Error::NotAuthenticated.user_message("Failed to load tasks", "offline"),
            "Please sign in first"
        );
    }

    #[test]
    fn test_application_display() {
        let err = Error::application(403, Some("Access denied".to_string()));
        assert_eq!(err.to_string(), "Access denied");
        assert_eq!(Error::application(500, None).to_string(), "Request failed");
    }
}
