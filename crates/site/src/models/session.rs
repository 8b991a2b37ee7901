//! Session-related types.
//!
//! Types stored in the server-side session for authentication state.

use serde::{Deserialize, Serialize};

use pawmilya_core::{Email, ProfileId, Role};

/// Bearer token from the remote identity provider.
///
/// `Debug` is redacted so the token never reaches logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// The signed-in user as handlers see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: ProfileId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_admin: bool,
    /// Present when the identity comes from a remote session.
    pub access_token: Option<AccessToken>,
}

impl CurrentUser {
    /// Whether requests on behalf of this user can go to the remote store.
    #[must_use]
    pub const fn has_remote_session(&self) -> bool {
        self.access_token.is_some()
    }
}

/// What the session remembers about who is signed in.
///
/// Remote identities are cached whole; local accounts are stored as a
/// pointer and re-read on every request so edits and deletions take effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SessionIdentity {
    Remote { user: CurrentUser },
    Local { user_id: ProfileId },
}

/// Session keys.
pub mod keys {
    /// Key for the signed-in identity.
    pub const IDENTITY: &str = "identity";

    /// Key for the one-shot notification shown on the next page.
    pub const FLASH: &str = "flash";

    /// Key for a validated booking awaiting confirmation.
    pub const PENDING_BOOKING: &str = "pending_booking";

    /// Key for the last confirmed booking (used by "change schedule").
    pub const LAST_BOOKING: &str = "last_booking";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("eyJ.secret.sig");
        assert!(!format!("{token:?}").contains("secret"));
    }

    #[test]
    fn test_local_identity_serializes_pointer_only() {
        let identity = SessionIdentity::Local {
            user_id: ProfileId::new("u-1"),
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json, serde_json::json!({"source": "local", "user_id": "u-1"}));
    }
}
