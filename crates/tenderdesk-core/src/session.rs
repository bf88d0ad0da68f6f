//! Explicit login session
//!
//! A `SessionContext` is created from a successful login, passed to the
//! collaborators that need it, invalidated when any call comes back 401,
//! and torn down at logout. Nothing about the session lives in ambient
//! global state.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Token is believed valid
    Active,
    /// The backend rejected the token; a new login is required
    Invalidated,
    /// The user logged out
    LoggedOut,
}

impl SessionState {
    fn to_u8(self) -> u8 {
        match self {
            Self::Active => 0,
            Self::Invalidated => 1,
            Self::LoggedOut => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Active,
            1 => Self::Invalidated,
            _ => Self::LoggedOut,
        }
    }
}

/// Authenticated company session
#[derive(Debug)]
pub struct SessionContext {
    company_id: i64,
    company_name: String,
    email: String,
    token: String,
    state: AtomicU8,
}

impl SessionContext {
    /// Create an active session from login data
    pub fn new(
        company_id: i64,
        company_name: impl Into<String>,
        email: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            company_id,
            company_name: company_name.into(),
            email: email.into(),
            token: token.into(),
            state: AtomicU8::new(SessionState::Active.to_u8()),
        }
    }

    pub fn company_id(&self) -> i64 {
        self.company_id
    }

    /// Company name sent with prediction requests
    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Bearer token, only while the session is active
    pub fn bearer_token(&self) -> Option<&str> {
        self.is_active().then_some(self.token.as_str())
    }

    /// Mark the session invalid after a 401. A logged-out session stays
    /// logged out.
    pub fn invalidate(&self) {
        let _ = self.state.compare_exchange(
            SessionState::Active.to_u8(),
            SessionState::Invalidated.to_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Tear the session down
    pub fn logout(&self) {
        self.state
            .store(SessionState::LoggedOut.to_u8(), Ordering::SeqCst);
    }
}
