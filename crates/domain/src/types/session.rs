//! Authenticator session state

use serde::{Deserialize, Serialize};

/// Session state of the authenticator
///
/// `Ready` implies at least one account record exists (not necessarily with
/// an unexpired access token). Transitions are driven only by the
/// authenticator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    SignedOut,
    SigningIn,
    Ready,
}

impl SessionState {
    /// Whether a sign-in is required before tokens can be handed out.
    #[must_use]
    pub fn requires_sign_in(self) -> bool {
        !matches!(self, Self::Ready)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for session state.
    use super::*;

    /// Validates `SessionState::requires_sign_in` across all states.
    ///
    /// Assertions:
    /// - Ensures `SignedOut` and `SigningIn` require sign-in.
    /// - Ensures `Ready` does not.
    #[test]
    fn requires_sign_in_matrix() {
        assert!(SessionState::SignedOut.requires_sign_in());
        assert!(SessionState::SigningIn.requires_sign_in());
        assert!(!SessionState::Ready.requires_sign_in());
    }
}
