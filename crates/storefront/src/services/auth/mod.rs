//! Account service.
//!
//! Registration, sign-in, sign-out and password recovery against the REST
//! API. Sign-in hands the normalized token payload to the
//! [`SessionStore`](crate::session::SessionStore); sign-out always clears
//! the local session, even when the backend call fails.

mod error;

pub use error::AuthError;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{info, instrument, warn};

use bazaar_core::Email;

use crate::api::normalize::{AuthPayload, ItemPayload};
use crate::api::{ApiClient, ApiError, Registration, Route};
use crate::models::SessionState;
use crate::storage::keys;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LogoutRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh: Option<&'a str>,
}

#[derive(Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct ResetPasswordRequest<'a> {
    token: &'a str,
    password: &'a str,
}

/// Account operations.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Create an account, then send the user to sign-in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField`, `AuthError::InvalidEmail` or
    /// `AuthError::WeakPassword` before calling the API, or
    /// `AuthError::Api` if the backend rejects the registration.
    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> Result<(), AuthError> {
        if registration.username.trim().is_empty() {
            return Err(AuthError::MissingField("Username"));
        }
        let email = Email::parse(&registration.email)?;
        validate_password(&registration.password)?;

        let body = Registration {
            username: registration.username.trim().to_string(),
            email: email.into_inner(),
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            password: registration.password.clone(),
        };
        self.api.post_ignore("register", &body).await?;

        info!("Account registered");
        self.api.navigator().navigate(&Route::SignIn);
        Ok(())
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Sign in and persist the session.
    ///
    /// Admins land on the dashboard, everyone else on the home page.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the backend rejects the
    /// credentials, `AuthError::Api` for other API failures, or
    /// `AuthError::Storage` if the session cannot be saved.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SessionState, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingField("Username"));
        }
        if password.expose_secret().is_empty() {
            return Err(AuthError::MissingField("Password"));
        }

        let credentials = Credentials {
            username,
            password: password.expose_secret(),
        };
        let payload = match self
            .api
            .post::<ItemPayload<AuthPayload>, _>("login", &credentials)
            .await
        {
            Ok(payload) => payload.into_inner(),
            Err(ApiError::Unauthorized) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        let session = payload.into_session();
        let is_admin = session.is_admin;
        self.api.session().login(session)?;
        info!(is_admin, "Signed in");

        let landing = if is_admin { Route::Dashboard } else { Route::Home };
        self.api.navigator().navigate(&landing);
        Ok(self.api.session().state())
    }

    /// Sign out.
    ///
    /// The backend is told best-effort; its answer never blocks the local
    /// sign-out. Carts are kept.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the local session cannot be cleared.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        let session = self.api.session();
        if session.is_logged_in() {
            let refresh = match session.storage().get(keys::REFRESH_TOKEN) {
                Ok(token) => token,
                Err(e) => {
                    warn!(error = %e, "Failed to read refresh token");
                    None
                }
            };
            let body = LogoutRequest {
                refresh: refresh.as_deref(),
            };
            if let Err(e) = self.api.post_ignore("logout", &body).await {
                warn!(error = %e, "Logout request failed, clearing local session anyway");
            }
        }

        session.logout()?;
        info!("Signed out");
        self.api.navigator().navigate(&Route::Home);
        Ok(())
    }

    // =========================================================================
    // Password Recovery
    // =========================================================================

    /// Ask the backend to email a reset link.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::Api`.
    #[instrument(skip(self, email))]
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        self.api
            .post_ignore(
                "forgot-password",
                &ForgotPasswordRequest {
                    email: email.as_str(),
                },
            )
            .await?;
        info!(domain = email.domain(), "Password reset requested");
        Ok(())
    }

    /// Set a new password using the token from the reset email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField`, `AuthError::WeakPassword` or
    /// `AuthError::Api`.
    #[instrument(skip(self, token, password))]
    pub async fn reset_password(
        &self,
        token: &str,
        password: &SecretString,
    ) -> Result<(), AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingField("Reset token"));
        }
        validate_password(password.expose_secret())?;

        self.api
            .post_ignore(
                "reset-password",
                &ResetPasswordRequest {
                    token,
                    password: password.expose_secret(),
                },
            )
            .await?;
        info!("Password reset");
        self.api.navigator().navigate(&Route::SignIn);
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        // counted in characters, not bytes
        assert!(validate_password("ééééééé").is_err());
    }

    #[test]
    fn test_user_message_hides_storage_details() {
        let err = AuthError::Storage(crate::storage::StorageError::Poisoned);
        assert!(!err.user_message().contains("poisoned"));
        assert_eq!(
            AuthError::MissingField("Username").user_message(),
            "Username is required"
        );
    }
}
