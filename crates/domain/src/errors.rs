//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for docrouter
///
/// Variants follow the failure taxonomy of the routing core: configuration
/// errors fail fast before any network call, protocol/validation errors fail
/// the surrounding flow, remote-service errors carry status context verbatim,
/// and user cancellation is a distinct, non-alarming kind so callers can
/// treat it as a silent no-op. Nothing in this taxonomy is retried
/// automatically.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum DocRouterError {
    /// Client credentials are not configured; no network was attempted.
    #[error("missing configuration: set GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET first")]
    MissingConfiguration,

    /// The OAuth callback was unparsable or carried a mismatched state nonce.
    #[error("invalid OAuth redirect: {0}")]
    InvalidRedirect(String),

    /// The provider reported an authorization error.
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Code or refresh exchange yielded no usable token.
    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// No account is signed in for the requested operation.
    #[error("not signed in")]
    NotSignedIn,

    /// The loopback listener could not bind a local port.
    #[error("failed to bind loopback listener: {0}")]
    BindFailed(String),

    /// The user cancelled the flow (browser-side or selection-side).
    #[error("cancelled")]
    Cancelled,

    /// The loopback listener was closed before a callback arrived, or its
    /// single waiter was already consumed.
    #[error("listener closed")]
    Closed,

    /// No accounts are configured.
    #[error("no accounts configured")]
    NoAccounts,

    /// The remote upload failed.
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// A remote response could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A shortcut file could not be parsed.
    #[error("invalid shortcut file: {0}")]
    InvalidShortcut(String),

    /// The shortcut carries no content hash and cannot be restored.
    #[error("shortcut has no stored original to restore")]
    MissingOriginalReference,

    /// Restoring would overwrite an existing file.
    #[error("destination already exists: {0}")]
    DestinationExists(String),

    /// A stored original (or other resource) was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Keychain or other secret-storage failure.
    #[error("security error: {0}")]
    Security(String),

    /// Network-level failure talking to a remote service.
    #[error("network error: {0}")]
    Network(String),

    /// Configuration error other than missing credentials.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for DocRouterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for docrouter operations
pub type Result<T> = std::result::Result<T, DocRouterError>;

/// Convert a `DocRouterError` into a stable label suitable for logging.
#[inline]
#[must_use]
pub fn error_label(error: &DocRouterError) -> &'static str {
    match error {
        DocRouterError::MissingConfiguration => "missing_configuration",
        DocRouterError::InvalidRedirect(_) => "invalid_redirect",
        DocRouterError::AuthorizationFailed(_) => "authorization_failed",
        DocRouterError::TokenExchangeFailed(_) => "token_exchange_failed",
        DocRouterError::NotSignedIn => "not_signed_in",
        DocRouterError::BindFailed(_) => "bind_failed",
        DocRouterError::Cancelled => "cancelled",
        DocRouterError::Closed => "closed",
        DocRouterError::NoAccounts => "no_accounts",
        DocRouterError::UploadFailed(_) => "upload_failed",
        DocRouterError::InvalidResponse(_) => "invalid_response",
        DocRouterError::InvalidShortcut(_) => "invalid_shortcut",
        DocRouterError::MissingOriginalReference => "missing_original_reference",
        DocRouterError::DestinationExists(_) => "destination_exists",
        DocRouterError::NotFound(_) => "not_found",
        DocRouterError::Security(_) => "security",
        DocRouterError::Network(_) => "network",
        DocRouterError::Config(_) => "config",
        DocRouterError::Io(_) => "io",
        DocRouterError::Internal(_) => "internal",
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for domain errors.
    use super::*;

    /// Validates the serde round-trip scenario for tagged errors.
    ///
    /// Assertions:
    /// - Ensures the tagged representation carries the variant name.
    /// - Confirms the deserialized error matches the original message.
    #[test]
    fn error_serde_roundtrip() {
        let err = DocRouterError::UploadFailed("status 500".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("UploadFailed"));

        let back: DocRouterError = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, DocRouterError::UploadFailed(msg) if msg == "status 500"));
    }

    /// Validates `error_label` behavior for the non-alarming cancellation
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms `error_label(&DocRouterError::Cancelled)` equals
    ///   `"cancelled"`.
    /// - Confirms `error_label(&DocRouterError::NoAccounts)` equals
    ///   `"no_accounts"`.
    #[test]
    fn cancellation_is_distinguished_from_no_accounts() {
        assert_eq!(error_label(&DocRouterError::Cancelled), "cancelled");
        assert_eq!(error_label(&DocRouterError::NoAccounts), "no_accounts");
    }

    /// Validates the io error conversion scenario.
    ///
    /// Assertions:
    /// - Ensures `matches!(err, DocRouterError::Io(_))` evaluates to true.
    #[test]
    fn io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DocRouterError = io.into();
        assert!(matches!(err, DocRouterError::Io(_)));
    }
}
