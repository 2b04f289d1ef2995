//! Port interfaces for file routing
//!
//! These traits define the boundaries between the routing core and
//! infrastructure implementations. The GUI, the Drive API client, and the
//! OS-level facilities (trash, default handlers, extended attributes) all
//! sit behind one of these seams.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docrouter_domain::{
    ConversionTarget, DocumentMarker, GoogleAccount, ReplacementOutcome, Result, ShortcutFile,
    UploadResult,
};

/// Trait for uploading and converting an office file to its remote form
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload the file at `path`, converting it to the target format on the
    /// remote side.
    ///
    /// # Errors
    /// Returns `UploadFailed` for non-2xx remote responses and
    /// `InvalidResponse` when the response carries no usable link. No
    /// automatic retries.
    async fn upload_and_convert(
        &self,
        path: &Path,
        target: ConversionTarget,
        account: &GoogleAccount,
    ) -> Result<UploadResult>;
}

/// Trait for choosing which account handles a file
///
/// Implementations may involve user interaction.
#[async_trait]
pub trait AccountSelector: Send + Sync {
    /// Select the account that should handle `file_name`.
    ///
    /// # Errors
    /// Returns `NoAccounts` when none are configured and `Cancelled` when
    /// the user dismisses the prompt.
    async fn select_account(&self, file_name: &str) -> Result<GoogleAccount>;
}

/// Trait for the reversible file-replacement protocol
#[async_trait]
pub trait ReplacementProtocol: Send + Sync {
    /// Replace `original` with a shortcut referencing the uploaded document.
    ///
    /// Runs to completion or fails cleanly; routing-flow cancellation must
    /// not interrupt it mid-step.
    async fn apply(
        &self,
        original: &Path,
        remote: &UploadResult,
        account: &GoogleAccount,
        target: ConversionTarget,
    ) -> Result<ReplacementOutcome>;

    /// Reconstruct the original file referenced by the shortcut at
    /// `shortcut`.
    ///
    /// # Errors
    /// Returns `MissingOriginalReference` for view-only shortcuts,
    /// `DestinationExists` when the original's path is occupied, and
    /// `NotFound` when the stored bytes are gone.
    async fn restore(&self, shortcut: &Path) -> Result<PathBuf>;

    /// Parse the shortcut file at `path`.
    fn load_shortcut(&self, path: &Path) -> Result<ShortcutFile>;
}

/// Trait for reading and writing embedded upload markers
pub trait UploadMarkerStore: Send + Sync {
    /// Load the marker embedded on `path`, if any.
    fn load(&self, path: &Path) -> Option<DocumentMarker>;

    /// Embed `marker` on `path`.
    fn save(&self, path: &Path, marker: &DocumentMarker) -> Result<()>;

    /// Remove any marker embedded on `path` (idempotent).
    fn clear(&self, path: &Path);
}

/// Trait for relocating a file to the OS trash
///
/// Never a hard delete: the relocation must be reversible by the user
/// through normal OS mechanisms.
pub trait TrashProvider: Send + Sync {
    /// Move `path` to the OS trash, returning the path it was trashed from.
    fn trash(&self, path: &Path) -> Result<PathBuf>;
}

/// Trait for opening a URL in the user's default handler
pub trait LinkOpener: Send + Sync {
    /// Open `url` with the default application.
    fn open_url(&self, url: &str) -> Result<()>;
}

/// Provides currently valid OAuth access tokens for an account.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Retrieve a bearer token valid for immediate use, refreshing first if
    /// the cached one is about to expire.
    async fn access_token(&self, account_id: &str) -> Result<String>;
}
