//! Content-addressed store for original file bytes
//!
//! Bytes are persisted under a path derived solely from their SHA-256
//! digest, inside a private, lazily-created directory. Re-persisting
//! identical content is a no-op, which makes `persist` idempotent and safe
//! under concurrent routing flows: the destination path is a pure function
//! of content, so the last writer has nothing left to write.
//!
//! Entries are append-only for the lifetime of the installation; nothing
//! here evicts, compacts, or garbage-collects.

use std::fs;
use std::path::PathBuf;

use docrouter_domain::{DocRouterError, Result, StoredOriginal};
use sha2::{Digest, Sha256};
use tracing::debug;

const STORE_DIRECTORY: &str = ".docrouter/originals";

/// Write-once, hash-keyed blob store
pub struct OriginalFileStore {
    directory: PathBuf,
}

impl OriginalFileStore {
    /// Create a store rooted at an explicit directory.
    #[must_use]
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    /// Create the store at its default location under the user's home
    /// directory.
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| DocRouterError::Config("home directory unavailable".to_string()))?;
        Ok(Self::new(home.join(STORE_DIRECTORY)))
    }

    /// Persist `bytes`, returning the content hash and size.
    ///
    /// The write is atomic (tempfile + rename) and skipped entirely when an
    /// entry for this content already exists.
    pub fn persist(&self, bytes: &[u8]) -> Result<StoredOriginal> {
        let hash = Self::sha256_hex(bytes);
        let target = self.path_for(&hash);

        if !target.exists() {
            fs::create_dir_all(&self.directory)?;

            let staging = self.directory.join(format!(".{}.{}", hash, uuid::Uuid::new_v4()));
            fs::write(&staging, bytes)?;
            fs::rename(&staging, &target)?;

            debug!(hash = %hash, size = bytes.len(), "original persisted");
        }

        Ok(StoredOriginal { hash, size_bytes: bytes.len() as u64, stored_path: target })
    }

    /// Path an entry with this hash would live at.
    #[must_use]
    pub fn path_for(&self, hash: &str) -> PathBuf {
        self.directory.join(hash)
    }

    /// Resolve a stored entry by hash.
    ///
    /// # Errors
    /// Returns `NotFound` when no such hash has been stored.
    pub fn retrieve(&self, hash: &str) -> Result<PathBuf> {
        let path = self.path_for(hash);
        if path.exists() {
            Ok(path)
        } else {
            Err(DocRouterError::NotFound(format!("no stored original for hash {hash}")))
        }
    }

    fn sha256_hex(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }
}
