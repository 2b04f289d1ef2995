//! Secure credential storage

mod keychain;

pub use keychain::{KeychainError, KeychainProvider, SecretStore};
