//! Driver Authentication Module
//!
//! Client side of driver sign-in against the dashboard backend:
//! - Credential, guest and registration REST calls
//! - Face login and face registration sessions, polled to completion
//! - The signed-in driver context

mod client;
mod context;
mod error;
mod poller;
mod session;
mod types;

pub use client::{FaceSessionApi, HttpAuthClient};
pub use context::{driver_id_for, AuthContext, AuthenticatedDriver};
pub use error::ApiError;
pub use poller::{PollEvent, PollerConfig, SessionPoller};
pub use session::{Session, SessionKind, SessionPayload, SessionRequest, SessionState};
pub use types::{
    CheckRegistrationResponse, DriverProfile, LoginResponse, RegisterResponse,
    RegistrationRequest, SessionStatusResponse, StartSessionResponse,
};
