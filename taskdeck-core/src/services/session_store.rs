//! Session persistence
//!
//! Mirrors the in-memory session into a key-value store under two keys:
//! `authToken` (the bearer token) and `userData` (the user profile as JSON).

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{Session, UserProfile};
use crate::ports::KeyValueStore;

pub const TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "userData";

/// Reads and writes the persisted session
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Restore a persisted session.
    ///
    /// Both keys must be present and the profile must parse; anything less
    /// counts as no session.
    pub fn load(&self) -> Result<Option<Session>> {
        let token = self.store.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let user = self.store.get(USER_KEY)?;

        let (Some(token), Some(user)) = (token, user) else {
            return Ok(None);
        };

        match serde_json::from_str::<UserProfile>(&user) {
            Ok(profile) => Ok(Some(Session::new(profile, token))),
            Err(_) => Ok(None),
        }
    }

    /// Write both keys. If the second write fails the first is rolled back.
    pub fn save(&self, session: &Session) -> Result<()> {
        let user = serde_json::to_string(&session.user)?;
        self.store.set(TOKEN_KEY, &session.token)?;
        if let Err(e) = self.store.set(USER_KEY, &user) {
            let _ = self.store.remove(TOKEN_KEY);
            return Err(e);
        }
        Ok(())
    }

    /// Remove both keys
    pub fn clear(&self) -> Result<()> {
        let token = self.store.remove(TOKEN_KEY);
        let user = self.store.remove(USER_KEY);
        token.and(user)
    }
}
