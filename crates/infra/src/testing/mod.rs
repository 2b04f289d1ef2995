//! Test support doubles
//!
//! In-memory implementations of the secret store and a few ports, shared by
//! unit and integration tests. Not compiled out of test builds because the
//! integration tests of dependent crates need them too.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use docrouter_core::ports::{LinkOpener, TrashProvider};
use docrouter_domain::{DocRouterError, Result as DomainResult};

use crate::security::{KeychainError, SecretStore};

/// In-memory keychain for deterministic tests
#[derive(Default)]
pub struct MemoryKeychain {
    secrets: Mutex<HashMap<String, String>>,
}

impl SecretStore for MemoryKeychain {
    fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        self.secrets.lock().expect("secrets poisoned").insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_secret(&self, key: &str) -> Result<String, KeychainError> {
        self.secrets
            .lock()
            .expect("secrets poisoned")
            .get(key)
            .cloned()
            .ok_or(KeychainError::NotFound)
    }

    fn delete_secret(&self, key: &str) -> Result<(), KeychainError> {
        self.secrets.lock().expect("secrets poisoned").remove(key);
        Ok(())
    }
}

/// Link opener that records URLs instead of launching anything
#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    /// URLs opened so far, in order.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("opened poisoned").clone()
    }
}

impl LinkOpener for RecordingOpener {
    fn open_url(&self, url: &str) -> DomainResult<()> {
        self.opened.lock().expect("opened poisoned").push(url.to_string());
        Ok(())
    }
}

/// Trash provider that relocates files into a directory instead of the OS
/// trash
pub struct DirTrash {
    directory: PathBuf,
}

impl DirTrash {
    /// Create a trash rooted at `directory`.
    #[must_use]
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    /// Where a trashed file of the given name ends up.
    #[must_use]
    pub fn trashed_file(&self, file_name: &str) -> PathBuf {
        self.directory.join(file_name)
    }
}

impl TrashProvider for DirTrash {
    fn trash(&self, path: &Path) -> DomainResult<PathBuf> {
        std::fs::create_dir_all(&self.directory)?;
        let file_name = path
            .file_name()
            .ok_or_else(|| DocRouterError::Io("path has no file name".into()))?;
        std::fs::rename(path, self.directory.join(file_name))?;
        Ok(path.to_path_buf())
    }
}
