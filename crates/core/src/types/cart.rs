//! Cart line items as persisted in a cart bucket.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductItemId;

/// A single line in the customer's cart.
///
/// A cart holds at most one entry per `id`; quantities of repeated adds are
/// merged into the existing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product item (SKU) this line refers to.
    #[serde(alias = "product_item_id")]
    pub id: ProductItemId,
    /// Display name captured when the item was added.
    pub name: String,
    /// Number of units, always at least 1.
    #[serde(alias = "qty")]
    pub quantity: u32,
    /// Unit price captured when the item was added.
    pub price: Decimal,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Size label, if the product has sizes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Category name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CartItem {
    /// Create a cart item with no image, size or category.
    #[must_use]
    pub fn new(id: ProductItemId, name: impl Into<String>, quantity: u32, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            quantity,
            price,
            image: None,
            size: None,
            category: None,
        }
    }

    /// `price × quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
