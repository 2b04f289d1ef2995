//! # docrouter Core
//!
//! Pure orchestration layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for every external effect
//! - The Router orchestration service
//!
//! ## Architecture Principles
//! - Only depends on `docrouter-domain`
//! - No network, keychain, or platform code
//! - All external dependencies via traits
//! - Pure, testable routing logic

pub mod ports;
pub mod routing;

pub use ports::{
    AccessTokenProvider, AccountSelector, LinkOpener, ReplacementProtocol, TrashProvider,
    UploadMarkerStore, Uploader,
};
pub use routing::RouterService;
