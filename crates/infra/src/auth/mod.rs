//! OAuth 2.0 sign-in and token lifecycle
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  GoogleAuthenticator │  Session state machine + refresh-on-use policy
//! └──────────┬───────────┘
//!            │
//!            ├──► LoopbackListener   (single-use redirect capture)
//!            ├──► OAuthHttpClient    (code/refresh exchange, userinfo)
//!            ├──► PendingFlow        (state nonce + PKCE pair per sign-in)
//!            └──► AccountStore       (keychain persistence)
//! ```
//!
//! The listener and the pending flow live only for the duration of one
//! `sign_in` call; the account store and the authenticator's in-memory
//! account list are the durable state.

pub mod authenticator;
pub mod client;
pub mod flow;
pub mod listener;
pub mod store;

pub use authenticator::GoogleAuthenticator;
pub use client::{OAuthHttpClient, UserInfo};
pub use flow::PendingFlow;
pub use listener::LoopbackListener;
pub use store::AccountStore;
