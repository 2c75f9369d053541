//! Session-related types.
//!
//! Types describing who is signed in and with which tokens.

use secrecy::SecretString;

use bazaar_core::SessionUser;

/// An authenticated session as handed to `SessionStore::login`.
///
/// Implements `Debug` manually to redact tokens.
#[derive(Clone)]
pub struct Session {
    /// Bearer token attached to every API call.
    pub access_token: SecretString,
    /// Refresh token. Stored but never used to refresh.
    pub refresh_token: Option<SecretString>,
    /// Profile of the signed-in user.
    pub user: SessionUser,
    /// Whether the user may open the admin console.
    pub is_admin: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("user", &self.user.username)
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

/// Observable view of the session consumed by route guards and the cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub is_logged_in: bool,
    pub is_admin: bool,
    pub user: Option<SessionUser>,
}

impl SessionState {
    /// Username of the signed-in user, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_debug_redacts_tokens() {
        let session = Session {
            access_token: SecretString::from("super_secret_access"),
            refresh_token: Some(SecretString::from("super_secret_refresh")),
            user: SessionUser::new("ana"),
            is_admin: false,
        };

        let debug_output = format!("{session:?}");
        assert!(debug_output.contains("ana"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_access"));
        assert!(!debug_output.contains("super_secret_refresh"));
    }
}
