//! Biometric session model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::types::DriverProfile;

/// Long-running backend operation tracked through a session handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Login,
    Registration,
}

impl SessionKind {
    pub const ALL: [SessionKind; 2] = [SessionKind::Login, SessionKind::Registration];
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Login => f.write_str("face login"),
            SessionKind::Registration => f.write_str("face registration"),
        }
    }
}

/// Parameters for starting a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRequest {
    Login,
    Registration { driver_id: String },
}

impl SessionRequest {
    pub fn kind(&self) -> SessionKind {
        match self {
            SessionRequest::Login => SessionKind::Login,
            SessionRequest::Registration { .. } => SessionKind::Registration,
        }
    }
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Pending,
    InProgress,
    Success,
    /// The backend ran the operation and reported failure
    Failed,
    /// Transport or start-up error
    Error,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Success | SessionState::Failed | SessionState::Error
        )
    }

    /// Map a backend status string. Unknown values yield `None` and are
    /// treated as non-terminal by the poller.
    pub fn from_remote(status: &str) -> Option<Self> {
        match status {
            "initializing" => Some(SessionState::Pending),
            "capturing" | "processing" | "scanning" => Some(SessionState::InProgress),
            "success" => Some(SessionState::Success),
            "failed" => Some(SessionState::Failed),
            "error" => Some(SessionState::Error),
            _ => None,
        }
    }
}

/// Data accompanying a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionPayload {
    /// Latest user-facing message
    pub message: String,
    /// Recognised driver, set when a face login succeeds
    pub driver: Option<DriverProfile>,
}

/// A backend session as seen by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Backend handle; `None` when the start call failed
    pub id: Option<String>,
    pub kind: SessionKind,
    pub state: SessionState,
    /// Clock time the session was initiated
    pub started_at: Duration,
    /// Clock time of the most recent status request
    pub last_polled_at: Option<Duration>,
    pub payload: SessionPayload,
}

impl Session {
    pub(crate) fn new(kind: SessionKind, started_at: Duration) -> Self {
        Self {
            id: None,
            kind,
            state: SessionState::Pending,
            started_at,
            last_polled_at: None,
            payload: SessionPayload::default(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
