//! Typed models for API resources and request bodies.
//!
//! These types provide a clean, ergonomic API separate from the raw JSON the
//! backend sends; see [`normalize`](super::normalize) for the envelope
//! handling.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use bazaar_core::{
    AddressId, CartItem, CategoryId, CountryId, ProductId, ProductItemId, StatusId,
};

// =============================================================================
// Catalog
// =============================================================================

/// A product as listed in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Base price; individual items may override it.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default, alias = "image_url", alias = "product_image")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "category_label")]
    pub category: Option<String>,
    /// Purchasable variants (sizes).
    #[serde(default, alias = "product_items", alias = "variants")]
    pub items: Vec<ProductItem>,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductItem {
    pub id: ProductItemId,
    #[serde(default, alias = "size_name")]
    pub size: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default, alias = "qty_in_stock", alias = "stock")]
    pub quantity_in_stock: Option<u32>,
}

impl Product {
    /// Find a variant by id.
    #[must_use]
    pub fn item(&self, id: ProductItemId) -> Option<&ProductItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Unit price of a variant, falling back to the product price.
    #[must_use]
    pub fn unit_price(&self, item: &ProductItem) -> Option<Decimal> {
        item.price.or(self.price)
    }

    /// Build a cart line for `quantity` units of `item`.
    ///
    /// Returns `None` when neither the item nor the product carries a price.
    #[must_use]
    pub fn to_cart_item(&self, item: &ProductItem, quantity: u32) -> Option<CartItem> {
        Some(CartItem {
            id: item.id,
            name: self.name.clone(),
            quantity,
            price: self.unit_price(item)?,
            image: self.image.clone(),
            size: item.size.clone(),
            category: self.category.clone(),
        })
    }
}

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(alias = "category_name")]
    pub name: String,
    #[serde(default, alias = "image_url")]
    pub image: Option<String>,
}

/// Country offered in the shipping form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    #[serde(alias = "country_name")]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Order status from `/statuses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: StatusId,
    #[serde(alias = "status")]
    pub name: String,
}

/// Filters for `/products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

// =============================================================================
// Addresses
// =============================================================================

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
    #[serde(alias = "street", alias = "address_line1")]
    pub address: String,
    pub city: String,
    #[serde(default, alias = "state", alias = "province")]
    pub region: String,
    #[serde(default, alias = "zip", alias = "zip_code")]
    pub postal_code: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "country_ref")]
    pub country: Option<CountryRef>,
    #[serde(default)]
    pub is_default: bool,
}

/// Country as embedded in an address: an id, a name, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryRef {
    pub id: Option<CountryId>,
    pub name: Option<String>,
}

/// Body for `POST /addresses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressInput {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub phone: String,
    pub country: String,
    pub is_default: bool,
}

// =============================================================================
// Accounts
// =============================================================================

/// Body for `POST /register`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Admin
// =============================================================================

/// Body for `POST /discounts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountInput {
    pub code: String,
    pub discount_percentage: Decimal,
    pub usage_limit: Option<u32>,
    pub status: bazaar_core::CouponStatus,
}

// =============================================================================
// Deserialization helpers
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRef {
    Int(i64),
    Str(String),
    Object {
        #[serde(default)]
        id: Option<i64>,
        #[serde(default, alias = "category_name", alias = "country_name")]
        name: Option<String>,
    },
}

/// Categories arrive as an id, a name, or `{id, name}`; keep a label.
fn category_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawRef>::deserialize(deserializer)? {
        None => None,
        Some(RawRef::Int(id)) => Some(id.to_string()),
        Some(RawRef::Str(name)) => Some(name),
        Some(RawRef::Object { id, name }) => name.or_else(|| id.map(|id| id.to_string())),
    })
}

fn country_ref<'de, D>(deserializer: D) -> Result<Option<CountryRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let to_id = |n: i64| i32::try_from(n).ok().map(CountryId::new);
    Ok(match Option::<RawRef>::deserialize(deserializer)? {
        None => None,
        Some(RawRef::Int(id)) => Some(CountryRef {
            id: to_id(id),
            name: None,
        }),
        Some(RawRef::Str(name)) => Some(CountryRef {
            id: None,
            name: Some(name),
        }),
        Some(RawRef::Object { id, name }) => Some(CountryRef {
            id: id.and_then(to_id),
            name,
        }),
    })
}

impl CountryRef {
    /// Value to put in the checkout form's country field.
    #[must_use]
    pub fn form_value(&self) -> Option<String> {
        self.name
            .clone()
            .or_else(|| self.id.map(|id| id.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_to_cart_item_uses_item_price() {
        let product: Product = serde_json::from_str(
            r#"{
                "id": 1, "name": "Hoodie", "price": "40.00",
                "category": {"id": 3, "name": "Tops"},
                "product_items": [
                    {"id": 11, "size": "M"},
                    {"id": 12, "size": "XL", "price": "45.00"}
                ]
            }"#,
        )
        .unwrap();

        let m = product.item(ProductItemId::new(11)).unwrap();
        let line = product.to_cart_item(m, 2).unwrap();
        assert_eq!(line.price, Decimal::from(40));
        assert_eq!(line.size.as_deref(), Some("M"));
        assert_eq!(line.category.as_deref(), Some("Tops"));

        let xl = product.item(ProductItemId::new(12)).unwrap();
        assert_eq!(product.to_cart_item(xl, 1).unwrap().price, Decimal::from(45));
    }

    #[test]
    fn test_product_without_price_has_no_cart_item() {
        let product: Product =
            serde_json::from_str(r#"{"id":1,"title":"Ghost","items":[{"id":2}]}"#).unwrap();
        assert!(product.to_cart_item(&product.items[0], 1).is_none());
    }

    #[test]
    fn test_address_country_shapes() {
        let a: Address = serde_json::from_str(
            r#"{"id":1,"address":"1 Main St","city":"Springfield","state":"IL","zip":"62701","country":4}"#,
        )
        .unwrap();
        assert_eq!(a.region, "IL");
        assert_eq!(a.country.unwrap().form_value().as_deref(), Some("4"));

        let b: Address = serde_json::from_str(
            r#"{"id":2,"address":"x","city":"y","country":{"id":1,"country_name":"Canada"},"is_default":true}"#,
        )
        .unwrap();
        assert!(b.is_default);
        assert_eq!(b.country.unwrap().form_value().as_deref(), Some("Canada"));
    }

    #[test]
    fn test_product_query_serialization() {
        let q = ProductQuery {
            search: Some("shirt".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&q).unwrap(), serde_json::json!({"search": "shirt"}));
    }
}
