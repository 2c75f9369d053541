//! Status and method enums shared across the client.

use serde::{Deserialize, Serialize};

/// Payment method selected at checkout.
///
/// Cash on delivery completes immediately; the other two hand the customer off
/// to an external provider page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cod,
    /// PayPal checkout redirect.
    Paypal,
    /// Stripe checkout redirect.
    Stripe,
}

impl PaymentMethod {
    /// Wire code sent to `/payments/initiate`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Paypal => "paypal",
            Self::Stripe => "stripe",
        }
    }

    /// Whether this method redirects to an external provider.
    #[must_use]
    pub const fn is_external(self) -> bool {
        matches!(self, Self::Paypal | Self::Stripe)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" | "cash" | "cash_on_delivery" => Ok(Self::Cod),
            "paypal" => Ok(Self::Paypal),
            "stripe" | "card" => Ok(Self::Stripe),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Lifecycle status of a discount coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    Active,
    #[default]
    Inactive,
    Expired,
}

impl<'de> Deserialize<'de> for CouponStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Text(String),
        }

        // The admin API has shipped both `"status": "active"` and `"status": true`.
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Self::Active,
            Raw::Flag(false) => Self::Inactive,
            Raw::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "active" | "enabled" => Self::Active,
                "expired" => Self::Expired,
                _ => Self::Inactive,
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_codes() {
        assert_eq!(PaymentMethod::Cod.code(), "cod");
        assert!(!PaymentMethod::Cod.is_external());
        assert!(PaymentMethod::Paypal.is_external());
        assert!(PaymentMethod::Stripe.is_external());
        assert_eq!("PayPal".parse::<PaymentMethod>().unwrap(), PaymentMethod::Paypal);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_method_serde() {
        let json = serde_json::to_string(&PaymentMethod::Stripe).unwrap();
        assert_eq!(json, "\"stripe\"");
    }

    #[test]
    fn test_coupon_status_shapes() {
        let parse = |s: &str| serde_json::from_str::<CouponStatus>(s).unwrap();
        assert_eq!(parse("\"active\""), CouponStatus::Active);
        assert_eq!(parse("\"ACTIVE\""), CouponStatus::Active);
        assert_eq!(parse("true"), CouponStatus::Active);
        assert_eq!(parse("false"), CouponStatus::Inactive);
        assert_eq!(parse("\"expired\""), CouponStatus::Expired);
        assert_eq!(parse("\"whatever\""), CouponStatus::Inactive);
    }
}
