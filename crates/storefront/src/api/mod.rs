//! REST API client for the storefront backend.
//!
//! # Architecture
//!
//! - [`ApiClient`] is the only place that talks HTTP. It attaches the bearer
//!   token from the [`SessionStore`](crate::session::SessionStore) and turns a
//!   `401` into a session wipe plus a redirect to sign-in.
//! - [`normalize`] is the boundary where the backend's assorted response
//!   shapes become one typed model. Nothing past it re-checks shapes.
//! - [`Navigator`] is the seam for "go to this route" side effects, so the
//!   same client drives a terminal, a GUI shell, or a test recorder.

mod client;
pub mod navigation;
pub mod normalize;
pub mod types;

pub use client::ApiClient;
pub use navigation::{Navigation, Navigator, NoopNavigator, RecordingNavigator, Route};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when calling the REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the session. The local session has already been
    /// cleared when this is returned.
    #[error("Unauthorized: session expired")]
    Unauthorized,

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Non-success status with the best message we could extract.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint path could not be joined onto the base URL.
    #[error("Invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status, when the backend answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::RateLimited(_) => Some(429),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Message fit for showing inline next to the form that failed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) => "Could not reach the store. Check your connection and try again.".to_string(),
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            Self::RateLimited(secs) => format!("Too many requests. Try again in {secs} seconds."),
            Self::Api { message, .. } => message.clone(),
            Self::Parse(_) | Self::Url(_) => "Unexpected response from the store.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 400,
            message: "Invalid coupon".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 400 - Invalid coupon");
        assert_eq!(err.user_message(), "Invalid coupon");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn test_not_found() {
        let err = ApiError::Api {
            status: 404,
            message: "Not found".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!ApiError::Unauthorized.is_not_found());
    }
}
