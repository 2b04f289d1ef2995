//! # docrouter Domain
//!
//! Shared domain types and errors for the docrouter workspace.
//!
//! This crate contains:
//! - The `DocRouterError` taxonomy and `Result` alias
//! - Token, account, shortcut, and upload types
//! - Pure file classification helpers
//! - Workspace-wide constants
//!
//! ## Architecture Principles
//! - No I/O, no network, no platform code
//! - Everything here is serializable and cheaply cloneable
//! - Higher layers (`docrouter-core`, `docrouter-infra`) depend on this
//!   crate, never the other way around

pub mod constants;
pub mod errors;
pub mod types;

pub use errors::{error_label, DocRouterError, Result};
pub use types::account::GoogleAccount;
pub use types::classification::FileKind;
pub use types::events::RouterEvent;
pub use types::marker::DocumentMarker;
pub use types::session::SessionState;
pub use types::shortcut::{FileMetadataSnapshot, ShortcutFile};
pub use types::storage::{ReplacementOutcome, StoredOriginal};
pub use types::token::{TokenEndpointResponse, TokenSet};
pub use types::upload::{ConversionTarget, UploadResult};
