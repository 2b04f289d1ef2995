//! Environment-provided configuration
//!
//! Read once at startup. Missing client credentials make `sign_in` fail fast
//! with `MissingConfiguration` before any network call is attempted.

use docrouter_domain::{DocRouterError, Result};

const CLIENT_ID_VAR: &str = "GOOGLE_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "GOOGLE_CLIENT_SECRET";
const FOLDER_ID_VAR: &str = "GOOGLE_DRIVE_FOLDER_ID";

/// OAuth client credentials and upload defaults
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// OAuth client identifier
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Default Drive folder uploads land in when an account has no
    /// preference of its own
    pub default_folder_id: Option<String>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            client_id: std::env::var(CLIENT_ID_VAR).unwrap_or_default(),
            client_secret: std::env::var(CLIENT_SECRET_VAR).unwrap_or_default(),
            default_folder_id: std::env::var(FOLDER_ID_VAR).ok().filter(|v| !v.is_empty()),
        }
    }

    /// Create a configuration directly (tests, embedding).
    #[must_use]
    pub fn new(client_id: String, client_secret: String, default_folder_id: Option<String>) -> Self {
        Self { client_id, client_secret, default_folder_id }
    }

    /// Whether both client credentials are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Fail with `MissingConfiguration` unless credentials are present.
    pub fn require_configured(&self) -> Result<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(DocRouterError::MissingConfiguration)
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration.
    use super::*;

    /// Validates `AppConfig::require_configured` behavior for the missing
    /// credentials scenario.
    ///
    /// Assertions:
    /// - Ensures an empty config is not configured.
    /// - Confirms the failure is `MissingConfiguration`.
    #[test]
    fn missing_credentials_fail_fast() {
        let config = AppConfig::default();
        assert!(!config.is_configured());
        assert!(matches!(
            config.require_configured(),
            Err(DocRouterError::MissingConfiguration)
        ));
    }

    /// Validates `AppConfig::new` behavior for the configured scenario.
    ///
    /// Assertions:
    /// - Ensures a config with both credentials passes the check.
    #[test]
    fn configured_when_both_credentials_present() {
        let config = AppConfig::new("id".to_string(), "secret".to_string(), None);
        assert!(config.is_configured());
        assert!(config.require_configured().is_ok());
    }
}
