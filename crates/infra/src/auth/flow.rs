//! Per-sign-in flow secrets
//!
//! Implements the state nonce (CSRF protection) and the RFC 7636 PKCE pair
//! for one sign-in attempt. A `PendingFlow` is generated when a sign-in
//! starts and discarded after success, failure, or cancellation; the nonce
//! returned in the callback must equal the generated one or the flow fails
//! closed.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use docrouter_domain::{DocRouterError, Result};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a cryptographically random URL-safe token (32 bytes, 43 chars).
fn random_token() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Ephemeral correlation state for one sign-in flow
#[derive(Debug, Clone)]
pub struct PendingFlow {
    /// Random CSRF protection nonce; must match between the authorization
    /// request and the callback
    pub state: String,

    /// PKCE code verifier, kept secret until token exchange
    pub code_verifier: String,

    /// BASE64URL(SHA256(code_verifier)), sent in the authorization request
    pub code_challenge: String,
}

impl PendingFlow {
    /// Generate a new flow with fresh random values.
    pub fn generate() -> Result<Self> {
        let state = random_token();
        let code_verifier = random_token();

        let mut hasher = Sha256::new();
        hasher.update(code_verifier.as_bytes());
        let code_challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());

        if state.is_empty() || code_verifier.is_empty() {
            return Err(DocRouterError::Internal("random token generation failed".to_string()));
        }

        Ok(Self { state, code_verifier, code_challenge })
    }

    /// The PKCE challenge method (always "S256").
    #[must_use]
    pub fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for flow secrets.
    use super::*;

    /// Validates `PendingFlow::generate` behavior for the token shape
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures verifier length satisfies RFC 7636 (43-128 chars).
    /// - Ensures the challenge is the base64url SHA-256 of the verifier.
    #[test]
    fn generated_flow_has_valid_pkce_pair() {
        let flow = PendingFlow::generate().unwrap();

        assert!(flow.code_verifier.len() >= 43 && flow.code_verifier.len() <= 128);

        let mut hasher = Sha256::new();
        hasher.update(flow.code_verifier.as_bytes());
        let expected = URL_SAFE_NO_PAD.encode(hasher.finalize());
        assert_eq!(flow.code_challenge, expected);
        assert_eq!(flow.challenge_method(), "S256");
    }

    /// Validates `PendingFlow::generate` behavior for the uniqueness
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures two generated flows never share a nonce or verifier.
    #[test]
    fn flows_are_unique() {
        let a = PendingFlow::generate().unwrap();
        let b = PendingFlow::generate().unwrap();

        assert_ne!(a.state, b.state);
        assert_ne!(a.code_verifier, b.code_verifier);
    }
}
