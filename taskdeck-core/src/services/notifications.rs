//! Notification center - transient user-visible notices

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::{Notification, NotificationKind};

/// How long a notice stays visible unless dismissed
pub const DEFAULT_TTL_SECS: i64 = 5;

/// Independent, auto-expiring notices
#[derive(Debug)]
pub struct NotificationCenter {
    ttl: Duration,
    notices: Vec<Notification>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            notices: Vec::new(),
        }
    }

    /// Append a notice; returns its id for dismissal
    pub fn push(&mut self, message: impl Into<String>, kind: NotificationKind, now: DateTime<Utc>) -> Uuid {
        let notice = Notification {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            created_at: now,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        let id = notice.id;
        self.notices.push(notice);
        id
    }

    /// Remove one notice immediately. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Drop every notice whose time is up
    pub fn expire(&mut self, now: DateTime<Utc>) {
        self.notices.retain(|n| !n.is_expired(now));
    }

    /// Notices still visible at `now`, oldest first
    pub fn active(&self, now: DateTime<Utc>) -> Vec<&Notification> {
        self.notices.iter().filter(|n| !n.is_expired(now)).collect()
    }

    /// Take all pending notices (for one-shot output)
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notices)
    }

    /// Most recent notice, if any
    pub fn last(&self) -> Option<&Notification> {
        self.notices.last()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
