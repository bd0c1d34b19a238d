//! Auth service - sign-in, sign-up and the persisted session

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{Credentials, Session, SignUpRequest};
use crate::ports::TaskApi;
use crate::services::session_store::SessionStore;

/// Result of a successful sign-in
#[derive(Debug)]
pub struct SignedIn {
    pub session: Session,
    /// Set when the session could not be written to storage. The session is
    /// still usable for this process.
    pub persist_error: Option<crate::domain::result::Error>,
}

pub struct AuthService {
    api: Arc<dyn TaskApi>,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(api: Arc<dyn TaskApi>, sessions: SessionStore) -> Self {
        Self { api, sessions }
    }

    /// Session left behind by a previous run. The token is not checked
    /// against the server.
    pub fn restore(&self) -> Result<Option<Session>> {
        self.sessions.load()
    }

    /// Exchange credentials for a session and persist it
    pub fn sign_in(&self, credentials: &Credentials) -> Result<SignedIn> {
        let session = self.api.sign_in(credentials)?.into_session();
        let persist_error = self.sessions.save(&session).err();
        Ok(SignedIn {
            session,
            persist_error,
        })
    }

    /// Register an account. Does not sign in.
    pub fn sign_up(&self, request: &SignUpRequest) -> Result<()> {
        self.api.sign_up(request)
    }

    /// Forget the persisted session. No server call.
    pub fn sign_out(&self) -> Result<()> {
        self.sessions.clear()
    }
}
