//! Shortcut file contents
//!
//! A shortcut is the small JSON document left at the original file's path
//! after a replacement. It carries the remote link plus enough metadata to
//! reverse the operation: the content hash joining back to the original
//! store, the captured file metadata, and provenance fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OS-level metadata captured before a file is replaced
///
/// Reapplied best-effort after the shortcut is written and after a restore.
/// Fields are optional because capture itself is best-effort and the mode is
/// only meaningful on unix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadataSnapshot {
    /// Unix permission bits of the original file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,

    /// Modification time of the original file, seconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_unix: Option<i64>,
}

/// The persisted contents of a `.gdoc` shortcut file
///
/// Immutable once written. A shortcut without `original_content_hash` is a
/// valid view-only reference: it opens the remote document but cannot be
/// restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutFile {
    /// Browser URL of the uploaded remote document
    pub document_url: String,

    /// File name of the replaced original (e.g. `report.xlsx`)
    pub original_filename: String,

    /// When the upload happened
    pub uploaded_at: DateTime<Utc>,

    /// Version of the tool that wrote this shortcut
    pub tool_version: String,

    /// Stable id of the account that owns the remote document
    pub account_id: String,

    /// Email of the owning account at upload time
    pub account_email: String,

    /// SHA-256 hex digest of the original's bytes; the join key into the
    /// original store. Absent for view-only shortcuts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_content_hash: Option<String>,

    /// Content-type hint of the original (e.g. the OOXML mime type)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_type_hint: Option<String>,

    /// Size of the original in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_size_bytes: Option<u64>,

    /// Captured metadata, reapplied on restore
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_metadata: Option<FileMetadataSnapshot>,
}

impl ShortcutFile {
    /// Whether this shortcut references a stored original that can be
    /// reconstructed.
    #[must_use]
    pub fn is_restorable(&self) -> bool {
        self.original_content_hash.is_some()
    }
}
