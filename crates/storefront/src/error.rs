//! Unified error handling with Sentry integration.
//!
//! Provides a unified `Error` type over every service error. Front ends call
//! [`Error::report`] once per failed action; it captures unexpected failures
//! to Sentry and returns the message to show the user.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::{AuthError, CartError, CheckoutError};
use crate::storage::StorageError;

/// Library-level error type for the storefront.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Account operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl Error {
    /// Message fit for showing the user.
    ///
    /// Storage and transport failures never leak their details.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Storage(_) => "Something went wrong. Please try again.".to_string(),
            Self::Api(err) => err.user_message(),
            Self::Cart(err) => err.user_message(),
            Self::Checkout(err) => err.user_message(),
            Self::Auth(err) => err.user_message(),
        }
    }

    /// Whether this is a failure on our side rather than a user mistake or
    /// an expected backend answer.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        match self {
            Self::Storage(_)
            | Self::Cart(CartError::Storage(_))
            | Self::Checkout(CheckoutError::Storage(_) | CheckoutError::MissingRedirectUrl)
            | Self::Auth(AuthError::Storage(_)) => true,
            Self::Api(err)
            | Self::Cart(CartError::Api(err))
            | Self::Checkout(CheckoutError::Api(err))
            | Self::Auth(AuthError::Api(err)) => api_error_is_unexpected(err),
            _ => false,
        }
    }

    /// Log the error, capture unexpected ones to Sentry, and return the user
    /// message.
    pub fn report(&self) -> String {
        if self.is_unexpected() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Action failed"
            );
        } else {
            tracing::warn!(error = %self, "Action rejected");
        }
        self.user_message()
    }
}

const fn api_error_is_unexpected(err: &ApiError) -> bool {
    match err {
        ApiError::Parse(_) | ApiError::Url(_) => true,
        ApiError::Api { status, .. } => *status >= 500,
        ApiError::Http(_) | ApiError::Unauthorized | ApiError::RateLimited(_) => false,
    }
}

/// Result type alias for `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Set the Sentry user context.
///
/// Call this after signing in to associate errors with the user.
pub fn set_sentry_user(username: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_item_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::from(CartError::InvalidQuantity(0));
        assert_eq!(err.to_string(), "Cart error: quantity must be at least 1 (got 0)");
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        let err = Error::from(StorageError::Poisoned);
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");

        let err = Error::from(CheckoutError::Storage(StorageError::Poisoned));
        assert!(!err.user_message().contains("lock"));
    }

    #[test]
    fn test_unexpected_classification() {
        assert!(Error::from(StorageError::Poisoned).is_unexpected());
        assert!(
            Error::from(ApiError::Api {
                status: 502,
                message: "Bad gateway".to_string()
            })
            .is_unexpected()
        );
        assert!(
            !Error::from(ApiError::Api {
                status: 400,
                message: "Invalid".to_string()
            })
            .is_unexpected()
        );
        assert!(!Error::from(ApiError::Unauthorized).is_unexpected());
        assert!(!Error::from(CheckoutError::MissingFields(vec!["City"])).is_unexpected());
    }
}
