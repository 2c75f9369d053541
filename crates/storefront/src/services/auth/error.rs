//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bazaar_core::EmailError),

    /// A required field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Invalid credentials (wrong password or unknown user).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// API call failed.
    #[error("auth API error: {0}")]
    Api(#[from] ApiError),

    /// The session could not be persisted.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Message fit for showing under the account form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Invalid email address".to_string(),
            Self::MissingField(field) => format!("{field} is required"),
            Self::InvalidCredentials => "Invalid username or password".to_string(),
            Self::WeakPassword(msg) => msg.clone(),
            Self::Api(err) => err.user_message(),
            Self::Storage(_) => "Could not save your session. Please try again.".to_string(),
        }
    }
}
