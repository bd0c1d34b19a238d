//! Configuration management
//!
//! settings.json lives in the taskdeck directory:
//! ```json
//! {
//!   "api": { "baseUrl": "http://localhost:8080", "timeoutSecs": 30 },
//!   "notifications": { "ttlSecs": 5 }
//! }
//! ```
//! Fields this crate does not manage are kept as-is when saving.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::http::DEFAULT_TIMEOUT_SECS;
use crate::services::notifications::DEFAULT_TTL_SECS;

/// Server the client talks to when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Overrides `api.baseUrl` for a single run
pub const API_URL_ENV: &str = "TASKDECK_API_URL";

/// Longest accepted request timeout
pub const MAX_TIMEOUT_SECS: u64 = 3_600;

/// Longest accepted notice lifetime
pub const MAX_TTL_SECS: i64 = 86_400;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(default)]
    notifications: NotificationSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ttl_secs: Option<i64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Effective configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub base_url: String,
    pub timeout_secs: u64,
    pub notification_ttl_secs: i64,
    /// True when the base URL came from the environment
    #[serde(skip)]
    pub base_url_from_env: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            notification_ttl_secs: DEFAULT_TTL_SECS,
            base_url_from_env: false,
        }
    }
}

fn read_settings(settings_path: &Path) -> Result<SettingsFile> {
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(settings_path)
        .with_context(|| format!("Failed to read {:?}", settings_path))?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

impl Config {
    /// Load config from the taskdeck directory
    ///
    /// The base URL can be overridden with `TASKDECK_API_URL`.
    pub fn load(taskdeck_dir: &Path) -> Result<Self> {
        let raw = read_settings(&taskdeck_dir.join("settings.json"))?;
        let defaults = Self::default();

        let env_url = std::env::var(API_URL_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            base_url_from_env: env_url.is_some(),
            base_url: env_url
                .or(raw.api.base_url)
                .unwrap_or(defaults.base_url),
            timeout_secs: raw
                .api
                .timeout_secs
                .filter(|t| (1..=MAX_TIMEOUT_SECS).contains(t))
                .unwrap_or(defaults.timeout_secs),
            notification_ttl_secs: raw
                .notifications
                .ttl_secs
                .filter(|t| (1..=MAX_TTL_SECS).contains(t))
                .unwrap_or(defaults.notification_ttl_secs),
        })
    }

    /// Save config to the taskdeck directory
    ///
    /// An environment override is never written back.
    pub fn save(&self, taskdeck_dir: &Path) -> Result<()> {
        let settings_path = taskdeck_dir.join("settings.json");
        let mut settings = read_settings(&settings_path)?;

        if !self.base_url_from_env {
            settings.api.base_url = Some(self.base_url.clone());
        }
        settings.api.timeout_secs = Some(self.timeout_secs);
        settings.notifications.ttl_secs = Some(self.notification_ttl_secs);

        std::fs::create_dir_all(taskdeck_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {:?}", settings_path))?;
        Ok(())
    }

    /// Change the API base URL (takes effect on the next context)
    pub fn set_base_url(&mut self, url: impl Into<String>) {
        self.base_url = url.into();
        self.base_url_from_env = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        if std::env::var(API_URL_ENV).is_ok() {
            return;
        }
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_settings_file() {
        if std::env::var(API_URL_ENV).is_ok() {
            return;
        }
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"api":{"baseUrl":"https://tasks.example.com","timeoutSecs":10},"notifications":{"ttlSecs":8}}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.base_url, "https://tasks.example.com");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.notification_ttl_secs, 8);
    }

    #[test]
    fn test_out_of_range_values_fall_back_to_defaults() {
        if std::env::var(API_URL_ENV).is_ok() {
            return;
        }
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"api":{"timeoutSecs":18446744073709551615},"notifications":{"ttlSecs":1000000000000000000}}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.notification_ttl_secs, DEFAULT_TTL_SECS);

        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"notifications":{"ttlSecs":86400}}"#,
        )
        .unwrap();
        assert_eq!(Config::load(dir.path()).unwrap().notification_ttl_secs, MAX_TTL_SECS);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        if std::env::var(API_URL_ENV).is_ok() {
            return;
        }
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{not json").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_save_preserves_unknown_fields() {
        if std::env::var(API_URL_ENV).is_ok() {
            return;
        }
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"theme":"dark","api":{"baseUrl":"http://old","proxy":"socks5://x"}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.set_base_url("http://new:9000");
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["api"]["proxy"], "socks5://x");
        assert_eq!(value["api"]["baseUrl"], "http://new:9000");

        let reloaded = Config::load(dir.path()).unwrap();
        assert_eq!(reloaded.base_url, "http://new:9000");
    }
}
