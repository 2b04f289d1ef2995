//! Workspace-wide constants

/// Keychain service identifier under which account records are stored.
pub const KEYCHAIN_SERVICE: &str = "DocRouter.google";

/// Keychain account key holding the serialized account list.
pub const ACCOUNTS_KEY: &str = "google-accounts";

/// File extension of shortcut files left behind after a replacement.
pub const SHORTCUT_EXTENSION: &str = "gdoc";

/// Fixed path component of the loopback OAuth redirect URI.
pub const LOOPBACK_CALLBACK_PATH: &str = "/oauth2redirect";

/// Refresh the access token when it expires within this many seconds.
pub const REFRESH_THRESHOLD_SECONDS: i64 = 60;

/// Version stamped into shortcut files and upload markers.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
