//! Reversible file replacement
//!
//! Swaps a local office document for a shortcut referencing its uploaded
//! counterpart, preserving the ability to reconstruct the original
//! byte-for-byte.
//!
//! Step ordering is deliberate: bytes and metadata are captured in memory,
//! then the original is relocated to the OS trash, then the bytes are
//! persisted to the content-addressed store, and only then is the shortcut
//! written. A crash between steps can therefore never produce a shortcut
//! claiming a restorable original whose bytes were not durably stored, and
//! if persisting fails the user still recovers the file from the trash.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use chrono::Utc;
use docrouter_core::ports::{ReplacementProtocol, TrashProvider, UploadMarkerStore};
use docrouter_domain::constants::{SHORTCUT_EXTENSION, TOOL_VERSION};
use docrouter_domain::{
    ConversionTarget, DocRouterError, DocumentMarker, FileMetadataSnapshot, GoogleAccount,
    ReplacementOutcome, Result, ShortcutFile, UploadResult,
};
use filetime::FileTime;
use tracing::{info, warn};

use super::original_store::OriginalFileStore;

/// Replacement protocol implementation over the original store and the OS
/// trash
pub struct FileReplacer {
    store: OriginalFileStore,
    trash: std::sync::Arc<dyn TrashProvider>,
    markers: std::sync::Arc<dyn UploadMarkerStore>,
}

impl FileReplacer {
    /// Create a replacer over the given store and platform facilities.
    #[must_use]
    pub fn new(
        store: OriginalFileStore,
        trash: std::sync::Arc<dyn TrashProvider>,
        markers: std::sync::Arc<dyn UploadMarkerStore>,
    ) -> Self {
        Self { store, trash, markers }
    }
}

#[async_trait]
impl ReplacementProtocol for FileReplacer {
    async fn apply(
        &self,
        original: &Path,
        remote: &UploadResult,
        account: &GoogleAccount,
        target: ConversionTarget,
    ) -> Result<ReplacementOutcome> {
        let original_filename = original
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| DocRouterError::Io("original path has no file name".to_string()))?;

        // Capture everything needed for reversal before the file moves.
        let bytes = fs::read(original)?;
        let snapshot = capture_metadata(original);

        let trashed_path = self.trash.trash(original)?;
        let stored = self.store.persist(&bytes)?;

        let link = ShortcutFile {
            document_url: remote.remote_view_url.clone(),
            original_filename,
            uploaded_at: Utc::now(),
            tool_version: TOOL_VERSION.to_string(),
            account_id: account.id.clone(),
            account_email: account.email.clone(),
            original_content_hash: Some(stored.hash.clone()),
            original_type_hint: Some(target.upload_content_type().to_string()),
            original_size_bytes: Some(stored.size_bytes),
            original_metadata: Some(snapshot),
        };

        let shortcut_path = shortcut_path_for(original);
        let payload = serde_json::to_vec_pretty(&link)
            .map_err(|err| DocRouterError::Internal(err.to_string()))?;
        fs::write(&shortcut_path, payload)?;

        reapply_metadata(&shortcut_path, snapshot);

        info!(
            original = %trashed_path.display(),
            shortcut = %shortcut_path.display(),
            hash = %stored.hash,
            "original replaced with shortcut"
        );

        Ok(ReplacementOutcome { trashed_path, shortcut_path })
    }

    async fn restore(&self, shortcut: &Path) -> Result<PathBuf> {
        let link = self.load_shortcut(shortcut)?;

        let hash = link
            .original_content_hash
            .as_deref()
            .ok_or(DocRouterError::MissingOriginalReference)?;

        let destination = restore_destination(shortcut, &link);
        if destination.exists() {
            return Err(DocRouterError::DestinationExists(destination.display().to_string()));
        }

        let source = self.store.retrieve(hash)?;
        fs::copy(&source, &destination)?;

        if let Some(snapshot) = link.original_metadata {
            reapply_metadata(&destination, snapshot);
        }

        // Stamp the prior-upload marker so re-routing the restored file
        // opens the existing remote document instead of uploading again.
        let marker = DocumentMarker {
            document_url: link.document_url.clone(),
            account_id: link.account_id.clone(),
            account_email: link.account_email.clone(),
            uploaded_at: link.uploaded_at,
            tool_version: link.tool_version.clone(),
        };
        if let Err(err) = self.markers.save(&destination, &marker) {
            warn!(error = %err, "could not stamp upload marker on restored file");
        }

        info!(restored = %destination.display(), "original restored from store");

        Ok(destination)
    }

    fn load_shortcut(&self, path: &Path) -> Result<ShortcutFile> {
        let raw = fs::read(path)?;
        serde_json::from_slice(&raw)
            .map_err(|err| DocRouterError::InvalidShortcut(err.to_string()))
    }
}

/// Shortcut path for an original: the original path with the shortcut
/// extension appended (`report.xlsx` → `report.xlsx.gdoc`).
#[must_use]
pub fn shortcut_path_for(original: &Path) -> PathBuf {
    let mut name = original.as_os_str().to_os_string();
    name.push(format!(".{SHORTCUT_EXTENSION}"));
    PathBuf::from(name)
}

/// Destination a restore writes to: the shortcut path with the shortcut
/// extension stripped, falling back to the recorded original file name.
fn restore_destination(shortcut: &Path, link: &ShortcutFile) -> PathBuf {
    let suffix = format!(".{SHORTCUT_EXTENSION}");
    let stripped = shortcut
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(&suffix))
        .filter(|name| !name.is_empty());

    match stripped {
        Some(name) => shortcut.with_file_name(name),
        None => shortcut.with_file_name(&link.original_filename),
    }
}

fn capture_metadata(path: &Path) -> FileMetadataSnapshot {
    let mut snapshot = FileMetadataSnapshot::default();

    if let Ok(metadata) = fs::metadata(path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            snapshot.mode = Some(metadata.permissions().mode());
        }

        snapshot.modified_unix = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|duration| duration.as_secs() as i64);
    }

    snapshot
}

/// Reapply captured metadata. Best-effort: failures are logged, never
/// raised.
fn reapply_metadata(path: &Path, snapshot: FileMetadataSnapshot) {
    #[cfg(unix)]
    if let Some(mode) = snapshot.mode {
        use std::os::unix::fs::PermissionsExt;
        if let Err(err) = fs::set_permissions(path, fs::Permissions::from_mode(mode)) {
            warn!(path = %path.display(), error = %err, "could not reapply permissions");
        }
    }

    if let Some(seconds) = snapshot.modified_unix {
        if let Err(err) = filetime::set_file_mtime(path, FileTime::from_unix_time(seconds, 0)) {
            warn!(path = %path.display(), error = %err, "could not reapply modification time");
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for path derivation.
    use chrono::Utc;

    use super::*;

    fn view_only_link() -> ShortcutFile {
        ShortcutFile {
            document_url: "https://docs.example/x".to_string(),
            original_filename: "report.xlsx".to_string(),
            uploaded_at: Utc::now(),
            tool_version: "0.1.0".to_string(),
            account_id: "sub".to_string(),
            account_email: "user@example.com".to_string(),
            original_content_hash: None,
            original_type_hint: None,
            original_size_bytes: None,
            original_metadata: None,
        }
    }

    /// Validates `shortcut_path_for` behavior for the extension-append
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the shortcut extension is appended, not substituted.
    #[test]
    fn shortcut_path_appends_extension() {
        let path = shortcut_path_for(Path::new("/tmp/report.xlsx"));
        assert_eq!(path, Path::new("/tmp/report.xlsx.gdoc"));
    }

    /// Validates `restore_destination` behavior for both naming scenarios.
    ///
    /// Assertions:
    /// - Confirms stripping the shortcut extension recovers the original
    ///   path.
    /// - Confirms the recorded file name is used when the shortcut was
    ///   renamed.
    #[test]
    fn restore_destination_strips_or_falls_back() {
        let link = view_only_link();

        let stripped = restore_destination(Path::new("/tmp/report.xlsx.gdoc"), &link);
        assert_eq!(stripped, Path::new("/tmp/report.xlsx"));

        let fallback = restore_destination(Path::new("/tmp/renamed.link"), &link);
        assert_eq!(fallback, Path::new("/tmp/report.xlsx"));
    }
}
