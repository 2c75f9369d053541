//! Cart synchronization service.
//!
//! The cart lives in storage under a bucket derived from the current session:
//! `cart_<username>` when signed in, `cart_guest` otherwise. The bucket key is
//! recomputed on every call, so signing in or out switches carts without any
//! explicit hand-off. Guest items are not merged into the user cart on login.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use bazaar_core::{CartItem, Coupon, ProductItemId};

use crate::api::normalize::ItemPayload;
use crate::api::{ApiClient, ApiError};
use crate::session::SessionStore;
use crate::storage::{KeyValueStore, StorageError, cart_bucket_key};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantity below 1.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(i64),

    /// The cart could not be written.
    #[error("cart storage error: {0}")]
    Storage(#[from] StorageError),

    /// The backend does not accept this coupon right now.
    #[error("coupon {code} cannot be applied")]
    CouponRejected { code: String },

    /// The coupon lookup failed.
    #[error("coupon lookup failed: {0}")]
    Api(#[from] ApiError),
}

impl CartError {
    /// Message fit for showing next to the cart.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidQuantity(_) => "Quantity must be at least 1.".to_string(),
            Self::Storage(_) => "Your cart could not be saved. Please try again.".to_string(),
            Self::CouponRejected { .. } => "This coupon code is invalid or expired.".to_string(),
            Self::Api(err) => err.user_message(),
        }
    }
}

/// Per-user cart stored in the key-value store.
///
/// Cheaply cloneable; clones share the store and session.
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn KeyValueStore>,
    session: SessionStore,
}

impl CartService {
    /// Create a cart service over `store`, keyed by `session`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, session: SessionStore) -> Self {
        Self { store, session }
    }

    /// Storage key of the active cart.
    #[must_use]
    pub fn bucket_key(&self) -> String {
        cart_bucket_key(self.session.current_username().as_deref())
    }

    /// Read the active cart.
    ///
    /// Missing or malformed data reads as an empty cart; the problem is logged
    /// and never surfaced.
    #[must_use]
    pub fn get_cart(&self) -> Vec<CartItem> {
        let key = self.bucket_key();
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read cart");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<CartItem>>(&raw) {
            Ok(items) => items.into_iter().filter(|item| item.quantity >= 1).collect(),
            Err(e) => {
                warn!(key = %key, error = %e, "Stored cart is malformed, treating as empty");
                Vec::new()
            }
        }
    }

    /// Add `item`, merging with an existing line of the same id.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `item.quantity` is 0, or
    /// `CartError::Storage` if the cart cannot be written.
    #[instrument(skip(self, item), fields(item_id = %item.id, quantity = item.quantity))]
    pub fn add_to_cart(&self, item: CartItem) -> Result<Vec<CartItem>, CartError> {
        if item.quantity < 1 {
            return Err(CartError::InvalidQuantity(i64::from(item.quantity)));
        }

        let mut items = self.get_cart();
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => items.push(item),
        }

        self.save(&items)?;
        Ok(items)
    }

    /// Remove the line with `id`. The cart is rewritten even when nothing
    /// matched.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be written.
    #[instrument(skip(self))]
    pub fn remove_from_cart(&self, id: ProductItemId) -> Result<Vec<CartItem>, CartError> {
        let mut items = self.get_cart();
        items.retain(|item| item.id != id);
        self.save(&items)?;
        Ok(items)
    }

    /// Overwrite the quantity of the line with `id`.
    ///
    /// An unknown id leaves the cart as it was and succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` without touching the cart if
    /// `quantity < 1`.
    #[instrument(skip(self))]
    pub fn update_quantity(
        &self,
        id: ProductItemId,
        quantity: i64,
    ) -> Result<Vec<CartItem>, CartError> {
        let quantity = match u32::try_from(quantity) {
            Ok(q) if q >= 1 => q,
            _ => return Err(CartError::InvalidQuantity(quantity)),
        };

        let mut items = self.get_cart();
        let Some(line) = items.iter_mut().find(|item| item.id == id) else {
            debug!("No cart line with this id");
            return Ok(items);
        };
        line.quantity = quantity;

        self.save(&items)?;
        Ok(items)
    }

    /// Drop the active cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the bucket cannot be removed.
    #[instrument(skip(self))]
    pub fn clear_cart(&self) -> Result<(), CartError> {
        self.store.remove(&self.bucket_key())?;
        Ok(())
    }

    /// Number of units in the cart.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.get_cart()
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Sum of line totals, unrounded.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.get_cart().iter().map(CartItem::line_total).sum()
    }

    /// Look up `code` on the backend. The cart itself is never modified.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CouponRejected` if the code is blank, unknown or
    /// not redeemable, and `CartError::Api` for other API failures.
    #[instrument(skip(self, api))]
    pub async fn validate_coupon(&self, api: &ApiClient, code: &str) -> Result<Coupon, CartError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CartError::CouponRejected {
                code: String::new(),
            });
        }

        let path = format!("discounts/{}", urlencoding::encode(code));
        let coupon = match api.get::<ItemPayload<Coupon>>(&path).await {
            Ok(payload) => payload.into_inner(),
            Err(e) if e.is_not_found() || e.status() == Some(400) => {
                return Err(CartError::CouponRejected {
                    code: code.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if !coupon.is_redeemable(Utc::now()) {
            debug!(status = ?coupon.status, "Coupon not redeemable");
            return Err(CartError::CouponRejected {
                code: coupon.code,
            });
        }

        Ok(coupon)
    }

    fn save(&self, items: &[CartItem]) -> Result<(), CartError> {
        let json = serde_json::to_string(items).map_err(StorageError::from)?;
        self.store.set(&self.bucket_key(), &json)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use bazaar_core::SessionUser;

    use super::*;
    use crate::models::Session;
    use crate::storage::{MemoryStore, keys};

    fn setup() -> (MemoryStore, SessionStore, CartService) {
        let memory = MemoryStore::new();
        let store: Arc<dyn KeyValueStore> = Arc::new(memory.clone());
        let session = SessionStore::restore(Arc::clone(&store));
        let cart = CartService::new(store, session.clone());
        (memory, session, cart)
    }

    fn sign_in(session: &SessionStore, username: &str) {
        session
            .login(Session {
                access_token: SecretString::from("tok"),
                refresh_token: None,
                user: SessionUser::new(username),
                is_admin: false,
            })
            .unwrap();
    }

    fn item(id: i32, quantity: u32, price: i64) -> CartItem {
        CartItem::new(ProductItemId::new(id), format!("Item {id}"), quantity, Decimal::from(price))
    }

    #[test]
    fn test_add_same_id_sums_quantity() {
        let (_, _, cart) = setup();
        cart.add_to_cart(item(1, 2, 10)).unwrap();
        let items = cart.add_to_cart(item(1, 3, 10)).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let (_, _, cart) = setup();
        cart.add_to_cart(item(2, 1, 5)).unwrap();
        cart.add_to_cart(item(1, 1, 5)).unwrap();
        cart.add_to_cart(item(2, 1, 5)).unwrap();

        let ids: Vec<i32> = cart.get_cart().iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_add_zero_quantity_rejected() {
        let (memory, _, cart) = setup();
        let err = cart.add_to_cart(item(1, 0, 10)).unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(0)));
        assert!(!memory.contains(keys::CART_GUEST));
    }

    #[test]
    fn test_update_quantity_below_one_leaves_cart_unchanged() {
        let (_, _, cart) = setup();
        cart.add_to_cart(item(1, 2, 10)).unwrap();

        for bad in [0, -1] {
            let err = cart.update_quantity(ProductItemId::new(1), bad).unwrap_err();
            assert!(matches!(err, CartError::InvalidQuantity(q) if q == bad));
        }
        assert_eq!(cart.get_cart()[0].quantity, 2);
    }

    #[test]
    fn test_update_quantity_overwrites() {
        let (_, _, cart) = setup();
        cart.add_to_cart(item(1, 2, 10)).unwrap();
        let items = cart.update_quantity(ProductItemId::new(1), 7).unwrap();
        assert_eq!(items[0].quantity, 7);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let (_, _, cart) = setup();
        cart.add_to_cart(item(1, 2, 10)).unwrap();
        let items = cart.update_quantity(ProductItemId::new(99), 4).unwrap();
        assert_eq!(items, cart.get_cart());
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_remove_persists_even_without_match() {
        let (memory, _, cart) = setup();
        let items = cart.remove_from_cart(ProductItemId::new(1)).unwrap();
        assert!(items.is_empty());
        assert_eq!(memory.get(keys::CART_GUEST).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_clear_then_get_is_empty() {
        let (memory, _, cart) = setup();
        cart.add_to_cart(item(1, 1, 10)).unwrap();
        cart.clear_cart().unwrap();
        assert!(cart.get_cart().is_empty());
        assert!(!memory.contains(keys::CART_GUEST));
    }

    #[test]
    fn test_malformed_cart_reads_empty() {
        let (memory, _, cart) = setup();
        memory.set(keys::CART_GUEST, "{broken").unwrap();
        assert!(cart.get_cart().is_empty());
    }

    #[test]
    fn test_buckets_are_isolated_per_user() {
        let (_, session, cart) = setup();

        sign_in(&session, "alice");
        cart.add_to_cart(item(1, 1, 10)).unwrap();
        assert_eq!(cart.bucket_key(), "cart_alice");

        sign_in(&session, "bob");
        assert!(cart.get_cart().is_empty());

        session.logout().unwrap();
        assert_eq!(cart.bucket_key(), "cart_guest");
        assert!(cart.get_cart().is_empty());

        sign_in(&session, "alice");
        assert_eq!(cart.get_cart().len(), 1);
    }

    #[test]
    fn test_subtotal() {
        let (_, _, cart) = setup();
        cart.add_to_cart(item(1, 2, 10)).unwrap();
        cart.add_to_cart(item(2, 1, 5)).unwrap();
        assert_eq!(cart.subtotal(), Decimal::from(25));
    }
}
