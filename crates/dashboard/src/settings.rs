//! Runtime settings
//!
//! The backend base URL is the only externally visible setting. It is read
//! from `SMART_DRIVE_API_BASE_URL`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use thiserror::Error;

/// Backend used when nothing is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SMART_DRIVE";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Config(#[from] ConfigError),

    #[error("API base URL must not be empty")]
    EmptyBaseUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
}

impl Settings {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load from an explicit environment source
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        if settings.api_base_url.trim().is_empty() {
            return Err(SettingsError::EmptyBaseUrl);
        }
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}
