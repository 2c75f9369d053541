//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! The backend is inconsistent about how it encodes primary keys: most
//! endpoints send numbers, a few send numeric strings. Every ID defined here
//! accepts both on the way in and always serializes as a number.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Wire representation of an ID before normalization.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Str(String),
}

/// Deserialize an `i32` ID from either a JSON number or a numeric string.
///
/// # Errors
///
/// Returns a deserialization error if the value is neither, or is out of range.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match RawId::deserialize(deserializer)? {
        RawId::Int(n) => i32::try_from(n).map_err(|_| D::Error::custom(format!("id out of range: {n}"))),
        RawId::Str(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| D::Error::custom(format!("invalid id: {s:?}"))),
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize` as a plain number, `Deserialize` from a number or numeric string
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
///
/// # Example
///
/// ```rust
/// # use bazaar_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new(1);
/// let order_id = OrderId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                $crate::types::id::deserialize_id(deserializer).map(Self)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(ProductItemId);
define_id!(CategoryId);
define_id!(OrderId);
define_id!(AddressId);
define_id!(CountryId);
define_id!(DiscountId);
define_id!(StatusId);

/// Payment identifier returned by `/payments/initiate`.
///
/// Kept as an opaque string: cash-on-delivery payments come back as database
/// integers while provider payments carry the provider's own reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    /// Create a payment ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for PaymentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Self(n.to_string()),
            RawId::Str(s) => Self(s),
        })
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_accepts_number_and_string() {
        let a: ProductItemId = serde_json::from_str("42").unwrap();
        let b: ProductItemId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_i32(), 42);
    }

    #[test]
    fn test_id_serializes_as_number() {
        let json = serde_json::to_string(&OrderId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_id_rejects_garbage() {
        assert!(serde_json::from_str::<OrderId>("\"abc\"").is_err());
        assert!(serde_json::from_str::<OrderId>("true").is_err());
        assert!(serde_json::from_str::<OrderId>("9999999999").is_err());
    }

    #[test]
    fn test_payment_id_from_number() {
        let id: PaymentId = serde_json::from_str("15").unwrap();
        assert_eq!(id.as_str(), "15");

        let id: PaymentId = serde_json::from_str("\"PAYID-XYZ\"").unwrap();
        assert_eq!(id.to_string(), "PAYID-XYZ");
    }
}
