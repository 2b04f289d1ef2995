//! Keychain-backed account persistence
//!
//! The whole account list (token records embedded) is serialized as one JSON
//! value under a fixed service/key pair. The platform keychain provides
//! encryption at rest; this layer only handles shaping. A corrupt payload is
//! discarded rather than propagated so a damaged record never wedges
//! sign-in.

use std::sync::Arc;

use docrouter_domain::constants::ACCOUNTS_KEY;
use docrouter_domain::{DocRouterError, GoogleAccount, Result};
use tracing::{debug, warn};

use crate::security::{KeychainError, SecretStore};

/// Durable store for the signed-in account list
pub struct AccountStore {
    keychain: Arc<dyn SecretStore>,
}

impl AccountStore {
    /// Create a store over the given secret backend.
    #[must_use]
    pub fn new(keychain: Arc<dyn SecretStore>) -> Self {
        Self { keychain }
    }

    /// Load all persisted accounts.
    ///
    /// Missing and corrupt records both load as an empty list; the corrupt
    /// record is deleted so the next save starts clean.
    #[must_use]
    pub fn load(&self) -> Vec<GoogleAccount> {
        match self.keychain.get_secret(ACCOUNTS_KEY) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(accounts) => accounts,
                Err(err) => {
                    warn!(error = %err, "discarding corrupt account record");
                    let _ = self.keychain.delete_secret(ACCOUNTS_KEY);
                    Vec::new()
                }
            },
            Err(KeychainError::NotFound) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "keychain unavailable, treating as signed out");
                Vec::new()
            }
        }
    }

    /// Persist the account list, replacing whatever was stored.
    pub fn save(&self, accounts: &[GoogleAccount]) -> Result<()> {
        if accounts.is_empty() {
            self.clear();
            return Ok(());
        }

        let payload = serde_json::to_string(accounts)
            .map_err(|err| DocRouterError::Internal(err.to_string()))?;

        self.keychain
            .set_secret(ACCOUNTS_KEY, &payload)
            .map_err(|err| DocRouterError::Security(err.to_string()))?;

        debug!(count = accounts.len(), "account records persisted");
        Ok(())
    }

    /// Remove the persisted record entirely (idempotent).
    pub fn clear(&self) {
        let _ = self.keychain.delete_secret(ACCOUNTS_KEY);
    }
}
