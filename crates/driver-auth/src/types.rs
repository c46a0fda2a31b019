//! Wire types for the authentication endpoints

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Driver profile as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_receiver: Option<String>,
    /// Contact name -> phone number
    #[serde(default)]
    pub trusted_contacts: BTreeMap<String, String>,
}

/// `POST /auth/login` body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub driver_name: String,
    pub password: String,
}

/// Response of the credential and guest login endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub driver: Option<DriverProfile>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /auth/register` body
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub password: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_receiver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_type: Option<String>,
    pub trusted_contacts: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /face/register` body
#[derive(Debug, Clone, Serialize)]
pub struct FaceRegistrationRequest {
    pub driver_id: String,
}

/// Response of both session start endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartSessionResponse {
    pub success: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of both session status endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionStatusResponse {
    pub success: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Recognised driver (face login only)
    #[serde(default)]
    pub driver: Option<DriverProfile>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckRegistrationResponse {
    pub success: bool,
    #[serde(default)]
    pub registered: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Error body the backend sends with non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
