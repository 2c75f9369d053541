//! Orders as displayed from the API. The client never builds these itself.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::{OrderId, ProductItemId, StatusId};

/// An order owned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(deserialize_with = "string_or_number")]
    pub order_number: String,
    #[serde(alias = "total")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    #[serde(default, alias = "lines", alias = "items")]
    pub order_lines: Vec<OrderLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(alias = "product_item")]
    pub product_item_id: ProductItemId,
    #[serde(alias = "quantity")]
    pub qty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Order status as a named value from `/statuses`.
///
/// Older endpoints embed the status as a bare string, newer ones as
/// `{"id": 2, "name": "shipped"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<StatusId>,
    pub name: String,
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Object {
                #[serde(default)]
                id: Option<StatusId>,
                #[serde(alias = "status", alias = "status_name")]
                name: String,
            },
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Name(name) => Self { id: None, name },
            Raw::Object { id, name } => Self { id, name },
        })
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Int(n) => n.to_string(),
        Raw::Str(s) => s,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_with_object_status() {
        let json = r#"{
            "id": 9,
            "order_number": 100023,
            "total_amount": "42.50",
            "status": {"id": 1, "name": "pending"},
            "order_lines": [{"product_item_id": 1, "qty": 2}]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.order_number, "100023");
        assert_eq!(order.total_amount, Decimal::new(4250, 2));
        assert_eq!(order.status.id, Some(StatusId::new(1)));
        assert_eq!(order.order_lines.len(), 1);
    }

    #[test]
    fn test_order_with_string_status() {
        let json = r#"{"id":"3","order_number":"ORD-3","total":10,"status":"shipped","items":[]}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status.name, "shipped");
        assert_eq!(order.status.id, None);
        assert_eq!(order.total_amount, Decimal::from(10));
    }
}
