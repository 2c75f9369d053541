//! CLI error type.

use thiserror::Error;

use bazaar_storefront::api::ApiError;
use bazaar_storefront::services::{AuthError, CartError, CheckoutError};
use bazaar_storefront::storage::StorageError;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The library rejected or failed the action.
    #[error(transparent)]
    Storefront(#[from] bazaar_storefront::Error),

    /// Arguments that parse but make no sense.
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Log the error and return the line to show the user.
    pub fn report(&self) -> String {
        match self {
            Self::Storefront(err) => err.report(),
            Self::Usage(msg) => msg.clone(),
        }
    }
}

macro_rules! from_storefront_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for CliError {
                fn from(err: $ty) -> Self {
                    Self::Storefront(err.into())
                }
            }
        )*
    };
}

from_storefront_error!(ApiError, AuthError, CartError, CheckoutError, StorageError);
