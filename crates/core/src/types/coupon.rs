//! Discount coupons as returned by `/discounts`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::DiscountId;
use super::money::round_money;
use super::status::CouponStatus;

/// A discount coupon.
///
/// The client never decides on its own whether a code exists; it only reads
/// what the backend returned and applies the resulting amount to the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DiscountId>,
    pub code: String,
    #[serde(default, alias = "percentage")]
    pub discount_percentage: Decimal,
    /// Fixed amount precomputed by the backend, when it sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Decimal>,
    #[serde(default)]
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    #[serde(default)]
    pub status: CouponStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Coupon {
    /// Whether the coupon can still be applied at `now`.
    #[must_use]
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.status == CouponStatus::Active
            && self.usage_limit.is_none_or(|limit| self.used_count < limit)
            && self.expires_at.is_none_or(|at| at > now)
    }

    /// Discount to subtract from `subtotal`, rounded to cents and never
    /// larger than the subtotal itself.
    #[must_use]
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        let raw = self.discount_amount.unwrap_or_else(|| {
            let pct = self
                .discount_percentage
                .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
            subtotal * pct / Decimal::ONE_HUNDRED
        });
        round_money(raw.clamp(Decimal::ZERO, subtotal.max(Decimal::ZERO)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn coupon(json: &str) -> Coupon {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_percentage_discount() {
        let c = coupon(r#"{"code":"SAVE10","discount_percentage":"10","status":"active"}"#);
        assert_eq!(c.discount_for(Decimal::new(2550, 2)), Decimal::new(255, 2));
    }

    #[test]
    fn test_fixed_amount_capped_at_subtotal() {
        let c = coupon(r#"{"code":"BIG","discount_amount":50,"status":"active"}"#);
        assert_eq!(c.discount_for(Decimal::from(20)), Decimal::from(20));
    }

    #[test]
    fn test_redeemable_rules() {
        let now = Utc::now();
        let mut c = coupon(r#"{"code":"X","discount_percentage":5,"usage_limit":2,"used_count":1,"status":"active"}"#);
        assert!(c.is_redeemable(now));

        c.used_count = 2;
        assert!(!c.is_redeemable(now));

        c.used_count = 0;
        c.expires_at = Some(now - Duration::hours(1));
        assert!(!c.is_redeemable(now));

        c.expires_at = None;
        c.status = CouponStatus::Inactive;
        assert!(!c.is_redeemable(now));
    }
}
