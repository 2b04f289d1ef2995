//! Generic keychain provider for secure credential storage
//!
//! A thin wrapper over the platform keychain for storing arbitrary secrets
//! across macOS (Keychain Access), Windows (Credential Manager), and Linux
//! (Secret Service API). Token records never touch the filesystem in the
//! clear; they live here.
//!
//! The [`SecretStore`] trait abstracts the provider so tests can substitute
//! an in-memory implementation (see `crate::testing::MemoryKeychain`).

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

/// Keychain error types
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Keychain access failed (permission denied, not available, etc.)
    #[error("keychain access failed: {0}")]
    AccessFailed(String),

    /// Entry not found in keychain
    #[error("entry not found")]
    NotFound,
}

/// Trait for key/value secret storage
///
/// Implemented by the platform [`KeychainProvider`] and by the in-memory
/// test double.
pub trait SecretStore: Send + Sync {
    /// Store a secret value under `key`.
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if storage fails
    fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError>;

    /// Retrieve the secret stored under `key`.
    ///
    /// # Errors
    /// Returns `KeychainError::NotFound` if the secret doesn't exist
    fn get_secret(&self, key: &str) -> Result<String, KeychainError>;

    /// Delete the secret stored under `key` (idempotent).
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if deletion fails
    fn delete_secret(&self, key: &str) -> Result<(), KeychainError>;

    /// Check if a secret exists under `key`.
    fn secret_exists(&self, key: &str) -> bool {
        self.get_secret(key).is_ok()
    }
}

/// Generic keychain provider for secure credential storage
///
/// Each provider is scoped to one service name; keys are account names
/// within that service.
pub struct KeychainProvider {
    service_name: String,
}

impl KeychainProvider {
    /// Create a new keychain provider for a specific service.
    ///
    /// # Arguments
    /// * `service_name` - Service identifier (e.g., "DocRouter.google")
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    fn create_entry(&self, account: &str) -> Result<Entry, KeychainError> {
        Entry::new(&self.service_name, account).map_err(|e| {
            KeychainError::AccessFailed(format!("failed to create keychain entry: {e}"))
        })
    }
}

impl SecretStore for KeychainProvider {
    fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Storing secret in keychain");

        let entry = self.create_entry(key)?;
        entry.set_password(value).map_err(|e| {
            KeychainError::AccessFailed(format!("failed to store secret for {key}: {e}"))
        })
    }

    fn get_secret(&self, key: &str) -> Result<String, KeychainError> {
        let entry = self.create_entry(key)?;
        entry.get_password().map_err(|e| {
            if matches!(e, keyring::Error::NoEntry) {
                KeychainError::NotFound
            } else {
                KeychainError::AccessFailed(format!("failed to retrieve secret for {key}: {e}"))
            }
        })
    }

    fn delete_secret(&self, key: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Deleting secret from keychain");

        let entry = self.create_entry(key)?;
        if let Err(e) = entry.delete_credential() {
            if !matches!(e, keyring::Error::NoEntry) {
                return Err(KeychainError::AccessFailed(format!(
                    "failed to delete secret for {key}: {e}"
                )));
            }
        }

        Ok(())
    }
}
