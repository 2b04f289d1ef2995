//! Storage-facing value types

use std::path::PathBuf;

/// Receipt for one persisted original
///
/// Keyed by content hash; write-once. Re-persisting identical bytes yields
/// the same receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOriginal {
    /// SHA-256 hex digest of the stored bytes
    pub hash: String,
    /// Size of the stored bytes
    pub size_bytes: u64,
    /// Absolute path of the stored blob
    pub stored_path: PathBuf,
}

/// Result of applying the replacement protocol to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementOutcome {
    /// Where the original lived before relocation to the OS trash. The trash
    /// destination itself is opaque to the platform facility.
    pub trashed_path: PathBuf,
    /// Path of the shortcut file written in its place
    pub shortcut_path: PathBuf,
}
