//! Backend REST client
//!
//! JSON over HTTP against the dashboard backend. Paths are relative to the
//! configured base URL, e.g. `http://localhost:5000/api`.

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::session::{SessionKind, SessionRequest};
use crate::types::{
    CheckRegistrationResponse, ErrorBody, FaceRegistrationRequest, LoginRequest, LoginResponse,
    RegisterResponse, RegistrationRequest, SessionStatusResponse, StartSessionResponse,
};

/// Default timeout for a single request
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Start/status operations behind a polled biometric session
#[allow(async_fn_in_trait)]
pub trait FaceSessionApi {
    /// Ask the backend to start the operation
    async fn start_session(&self, request: &SessionRequest)
        -> Result<StartSessionResponse, ApiError>;

    /// Fetch the current status of a running session
    async fn session_status(
        &self,
        kind: SessionKind,
        session_id: &str,
    ) -> Result<SessionStatusResponse, ApiError>;
}

/// HTTP client for the authentication endpoints
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    base_url: Url,
    http: Client,
}

impl HttpAuthClient {
    /// Create a client for the given base URL
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed =
            Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        info!("Creating auth client for {}", parsed);
        Ok(Self {
            base_url: parsed,
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Credential login
    pub async fn login(&self, driver_name: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            driver_name: driver_name.to_string(),
            password: password.to_string(),
        };
        self.post(&["auth", "login"], Some(&body)).await
    }

    /// Register a new driver profile
    pub async fn register(&self, request: &RegistrationRequest) -> Result<RegisterResponse, ApiError> {
        self.post(&["auth", "register"], Some(request)).await
    }

    /// Temporary guest profile
    pub async fn guest_login(&self) -> Result<LoginResponse, ApiError> {
        self.post::<(), _>(&["auth", "guest"], None).await
    }

    pub async fn start_face_login(&self) -> Result<StartSessionResponse, ApiError> {
        self.post::<(), _>(&["auth", "face", "start"], None).await
    }

    pub async fn face_login_status(&self, session_id: &str) -> Result<SessionStatusResponse, ApiError> {
        self.get(&["auth", "face", "status", session_id]).await
    }

    pub async fn start_face_registration(
        &self,
        driver_id: &str,
    ) -> Result<StartSessionResponse, ApiError> {
        let body = FaceRegistrationRequest {
            driver_id: driver_id.to_string(),
        };
        self.post(&["face", "register"], Some(&body)).await
    }

    pub async fn face_registration_status(
        &self,
        session_id: &str,
    ) -> Result<SessionStatusResponse, ApiError> {
        self.get(&["face", "register", "status", session_id]).await
    }

    /// Whether a driver already has a registered face
    pub async fn check_face_registration(
        &self,
        driver_id: &str,
    ) -> Result<CheckRegistrationResponse, ApiError> {
        self.get(&["face", "check-registration", driver_id]).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        debug!("POST {}", url);
        let mut request = self.http.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            warn!("Backend returned {}: {}", status, message);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl FaceSessionApi for HttpAuthClient {
    async fn start_session(
        &self,
        request: &SessionRequest,
    ) -> Result<StartSessionResponse, ApiError> {
        match request {
            SessionRequest::Login => self.start_face_login().await,
            SessionRequest::Registration { driver_id } => {
                self.start_face_registration(driver_id).await
            }
        }
    }

    async fn session_status(
        &self,
        kind: SessionKind,
        session_id: &str,
    ) -> Result<SessionStatusResponse, ApiError> {
        match kind {
            SessionKind::Login => self.face_login_status(session_id).await,
            SessionKind::Registration => self.face_registration_status(session_id).await,
        }
    }
}
