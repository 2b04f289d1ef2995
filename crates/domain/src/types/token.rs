//! OAuth token records
//!
//! A `TokenSet` is the unit of persistence for one signed-in account: the
//! access token in use, the refresh token that renews it, and the absolute
//! expiry instant used by the refresh-on-use policy.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// OAuth 2.0 access and refresh tokens with expiry metadata
///
/// Unlike provider token responses, both fields are required here: a token
/// set is only persisted after a fully successful exchange, and an exchange
/// that yields no refresh token is rejected upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer access token for API authentication
    pub access_token: String,

    /// Refresh token for obtaining new access tokens
    pub refresh_token: String,

    /// Absolute expiration timestamp (UTC), calculated from the provider's
    /// `expires_in` at token creation time
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Create a new `TokenSet` with calculated expiration time.
    #[must_use]
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self { access_token, refresh_token, expires_at: Utc::now() + Duration::seconds(expires_in) }
    }

    /// Check if the access token is expired or will expire within the given
    /// threshold.
    ///
    /// # Arguments
    /// * `threshold_seconds` - Number of seconds before expiry to consider
    ///   expired
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        Utc::now() + Duration::seconds(threshold_seconds) >= self.expires_at
    }

    /// Get seconds until token expiration (negative once expired).
    #[must_use]
    pub fn seconds_until_expiry(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds()
    }
}

/// Token response from the provider's token endpoint
///
/// Standard OAuth 2.0 token response format (RFC 6749). Deserializes both
/// authorization-code and refresh-token exchange responses; `refresh_token`
/// is optional on the wire because refresh exchanges may omit it.
#[derive(Debug, Deserialize)]
pub struct TokenEndpointResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    //! Unit tests for token types.
    use super::*;

    /// Validates `TokenSet::new` behavior for the token set creation scenario.
    ///
    /// Assertions:
    /// - Confirms `tokens.access_token` equals `"access_123"`.
    /// - Confirms `tokens.refresh_token` equals `"refresh_456"`.
    /// - Ensures the expiry lands roughly one hour out.
    #[test]
    fn token_set_creation() {
        let tokens = TokenSet::new("access_123".to_string(), "refresh_456".to_string(), 3600);

        assert_eq!(tokens.access_token, "access_123");
        assert_eq!(tokens.refresh_token, "refresh_456");

        let secs = tokens.seconds_until_expiry();
        assert!(secs > 3590 && secs <= 3600);
    }

    /// Validates `TokenSet::is_expired` behavior for the expiry threshold
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures `!tokens.is_expired(60)` evaluates to true for a fresh token.
    /// - Ensures `tokens.is_expired(7200)` evaluates to true with a threshold
    ///   larger than the lifetime.
    #[test]
    fn token_expiry_threshold() {
        let tokens = TokenSet::new("access".to_string(), "refresh".to_string(), 3600);

        assert!(!tokens.is_expired(60));
        assert!(tokens.is_expired(7200));
    }

    /// Validates `TokenSet::is_expired` behavior for a token already past its
    /// expiry.
    ///
    /// Assertions:
    /// - Ensures `tokens.is_expired(60)` evaluates to true.
    /// - Ensures `tokens.seconds_until_expiry()` is negative.
    #[test]
    fn token_already_expired() {
        let tokens = TokenSet::new("access".to_string(), "refresh".to_string(), -10);

        assert!(tokens.is_expired(60));
        assert!(tokens.seconds_until_expiry() < 0);
    }

    /// Validates the token endpoint response parsing scenario.
    ///
    /// Assertions:
    /// - Confirms the parsed access token and lifetime.
    /// - Ensures a missing `refresh_token` deserializes as `None`.
    #[test]
    fn token_endpoint_response_parsing() {
        let body = r#"{"access_token":"at","expires_in":3599,"token_type":"Bearer"}"#;
        let response: TokenEndpointResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.access_token, "at");
        assert_eq!(response.expires_in, 3599);
        assert!(response.refresh_token.is_none());
    }
}
