//! Signed-in account records

use serde::{Deserialize, Serialize};

use super::token::TokenSet;

/// A signed-in Google account with its token record and upload preferences
///
/// `id` is the provider's stable subject identifier; `email` is refreshed on
/// every sign-in. The optional folder preference names a Drive folder that
/// uploads for this account should land in; the resolved folder id is cached
/// after the first lookup so later uploads skip the Drive query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleAccount {
    pub id: String,
    pub email: String,
    pub tokens: TokenSet,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_folder_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_folder_id: Option<String>,
}

impl GoogleAccount {
    /// Create an account with no folder preference.
    #[must_use]
    pub fn new(id: String, email: String, tokens: TokenSet) -> Self {
        Self { id, email, tokens, preferred_folder_name: None, preferred_folder_id: None }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for account records.
    use super::*;

    /// Validates the account serde round-trip scenario.
    ///
    /// Assertions:
    /// - Confirms the deserialized account equals the original.
    /// - Ensures absent folder preferences stay absent on the wire.
    #[test]
    fn account_roundtrip() {
        let account = GoogleAccount::new(
            "sub-1".to_string(),
            "user@example.com".to_string(),
            TokenSet::new("a".to_string(), "r".to_string(), 3600),
        );

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("preferred_folder_name"));

        let back: GoogleAccount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, account);
    }
}
