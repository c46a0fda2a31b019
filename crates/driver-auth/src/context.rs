//! Authenticated driver context

use serde::Serialize;
use tracing::info;

use crate::types::DriverProfile;

/// The driver currently signed in to the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedDriver {
    pub driver_id: String,
    pub profile: DriverProfile,
    pub face_registered: bool,
}

/// Holds the signed-in driver, if any
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    current: Option<AuthenticatedDriver>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign a driver in. Face registration is unknown until checked.
    pub fn login(&mut self, profile: DriverProfile) -> &AuthenticatedDriver {
        let driver_id = driver_id_for(&profile.name);
        info!("Driver signed in: {} ({})", profile.name, driver_id);
        self.current.insert(AuthenticatedDriver {
            driver_id,
            profile,
            face_registered: false,
        })
    }

    pub fn logout(&mut self) {
        if let Some(driver) = self.current.take() {
            info!("Driver signed out: {}", driver.driver_id);
        }
    }

    /// Record whether the signed-in driver has a registered face
    pub fn update_face_registration(&mut self, registered: bool) {
        if let Some(driver) = self.current.as_mut() {
            driver.face_registered = registered;
        }
    }

    pub fn current(&self) -> Option<&AuthenticatedDriver> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn face_registered(&self) -> bool {
        self.current.as_ref().is_some_and(|d| d.face_registered)
    }
}

/// Driver id derived from a display name: lowercase, spaces as underscores
pub fn driver_id_for(name: &str) -> String {
    if name.is_empty() {
        "unknown".to_string()
    } else {
        name.to_lowercase().replace(' ', "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> DriverProfile {
        DriverProfile {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_driver_id_derivation() {
        assert_eq!(driver_id_for("John Doe"), "john_doe");
        assert_eq!(driver_id_for("Guest User"), "guest_user");
        assert_eq!(driver_id_for(""), "unknown");
    }

    #[test]
    fn test_login_logout() {
        let mut ctx = AuthContext::new();
        assert!(!ctx.is_authenticated());

        let driver = ctx.login(profile("Arman Shaikh"));
        assert_eq!(driver.driver_id, "arman_shaikh");
        assert!(!driver.face_registered);
        assert!(ctx.is_authenticated());

        ctx.logout();
        assert!(ctx.current().is_none());
    }

    #[test]
    fn test_face_registration_flag() {
        let mut ctx = AuthContext::new();
        ctx.update_face_registration(true);
        assert!(!ctx.face_registered());

        ctx.login(profile("Jane"));
        ctx.update_face_registration(true);
        assert!(ctx.face_registered());
    }
}
