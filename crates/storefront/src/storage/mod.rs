//! Persistent key-value storage for client state.
//!
//! Everything the storefront remembers between runs - auth tokens, the user
//! profile, cart buckets, the pending payment id - lives in a flat string
//! key-value store. Services receive the store as an injected
//! [`KeyValueStore`] so tests can swap in [`MemoryStore`].
//!
//! # Keys
//!
//! | Key                     | Value                          |
//! |-------------------------|--------------------------------|
//! | `access_token`          | bearer token                   |
//! | `refresh_token`         | refresh token                  |
//! | `user`                  | `SessionUser` JSON             |
//! | `is_admin`              | `"true"` / `"false"`           |
//! | `authToken`             | legacy token key, only cleared |
//! | `cart_<username>`       | `CartItem[]` JSON              |
//! | `cart_guest`            | `CartItem[]` JSON              |
//! | `pending_payment_id`    | payment id awaiting provider   |
//!
//! Writes replace the whole value. There is no locking across processes, so
//! two clients sharing a bucket race and the last write wins.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Storage keys.
pub mod keys {
    /// Bearer access token.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Refresh token.
    pub const REFRESH_TOKEN: &str = "refresh_token";

    /// Serialized `SessionUser`.
    pub const USER: &str = "user";

    /// Admin flag, stored as `"true"` or `"false"`.
    pub const IS_ADMIN: &str = "is_admin";

    /// Token key written by older builds. Never read, only cleared.
    pub const LEGACY_AUTH_TOKEN: &str = "authToken";

    /// Payment id saved before redirecting to an external provider.
    pub const PENDING_PAYMENT_ID: &str = "pending_payment_id";

    /// Prefix of every cart bucket.
    pub const CART_PREFIX: &str = "cart_";

    /// Bucket used when nobody is signed in.
    pub const CART_GUEST: &str = "cart_guest";

    /// The four keys that make up a session.
    pub const SESSION: [&str; 4] = [ACCESS_TOKEN, REFRESH_TOKEN, USER, IS_ADMIN];
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store contents could not be encoded.
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A previous writer panicked while holding the lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// String key-value store with browser local-storage semantics.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Cart bucket key for a username, or the shared guest bucket.
///
/// ```
/// use bazaar_storefront::storage::cart_bucket_key;
///
/// assert_eq!(cart_bucket_key(Some("ana")), "cart_ana");
/// assert_eq!(cart_bucket_key(None), "cart_guest");
/// assert_eq!(cart_bucket_key(Some("  ")), "cart_guest");
/// ```
#[must_use]
pub fn cart_bucket_key(username: Option<&str>) -> String {
    match username.map(str::trim).filter(|u| !u.is_empty()) {
        Some(username) => format!("{}{username}", keys::CART_PREFIX),
        None => keys::CART_GUEST.to_string(),
    }
}
