//! Order totals shown on the checkout page and sent with the payment.

use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::{CartItem, Coupon, round_money};

use crate::config::PricingPolicy;

/// Money breakdown of a checkout, every field rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// Compute totals for `items` with a precomputed `discount`.
    ///
    /// `total = subtotal + shipping + tax - discount`, floored at zero. Tax is
    /// charged on the subtotal before the discount.
    #[must_use]
    pub fn compute(items: &[CartItem], discount: Decimal, pricing: &PricingPolicy) -> Self {
        let subtotal = round_money(items.iter().map(CartItem::line_total).sum());
        let tax = round_money(subtotal * pricing.tax_rate);
        let shipping = round_money(pricing.shipping_flat);
        let discount = round_money(discount.max(Decimal::ZERO));
        let total = round_money((subtotal + shipping + tax - discount).max(Decimal::ZERO));

        Self {
            subtotal,
            shipping,
            tax,
            discount,
            total,
        }
    }

    /// Compute totals with the discount of an applied coupon, if any.
    #[must_use]
    pub fn with_coupon(items: &[CartItem], coupon: Option<&Coupon>, pricing: &PricingPolicy) -> Self {
        let subtotal: Decimal = items.iter().map(CartItem::line_total).sum();
        let discount = coupon.map_or(Decimal::ZERO, |c| c.discount_for(round_money(subtotal)));
        Self::compute(items, discount, pricing)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::{CouponStatus, ProductItemId};

    use super::*;

    fn items() -> Vec<CartItem> {
        vec![
            CartItem::new(ProductItemId::new(1), "Shirt", 2, Decimal::from(10)),
            CartItem::new(ProductItemId::new(2), "Socks", 1, Decimal::from(5)),
        ]
    }

    fn coupon(percentage: i64) -> Coupon {
        Coupon {
            id: None,
            code: "SAVE".to_string(),
            discount_percentage: Decimal::from(percentage),
            discount_amount: None,
            usage_limit: None,
            used_count: 0,
            status: CouponStatus::Active,
            expires_at: None,
        }
    }

    #[test]
    fn test_reference_cart_totals() {
        let totals = Totals::compute(&items(), Decimal::ZERO, &PricingPolicy::default());
        assert_eq!(totals.subtotal, Decimal::new(2500, 2));
        assert_eq!(totals.tax, Decimal::new(250, 2));
        assert_eq!(totals.shipping, Decimal::new(1500, 2));
        assert_eq!(totals.total, Decimal::new(4250, 2));
    }

    #[test]
    fn test_empty_cart_still_pays_shipping() {
        let totals = Totals::compute(&[], Decimal::ZERO, &PricingPolicy::default());
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from(15));
    }

    #[test]
    fn test_total_never_negative() {
        let totals = Totals::compute(&items(), Decimal::from(1000), &PricingPolicy::default());
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        let items = vec![CartItem::new(
            ProductItemId::new(1),
            "Pen",
            1,
            Decimal::new(1999, 2),
        )];
        let totals = Totals::compute(&items, Decimal::ZERO, &PricingPolicy::default());
        // 1.999 rounds up
        assert_eq!(totals.tax, Decimal::new(200, 2));
        assert_eq!(totals.total, Decimal::new(3699, 2));
    }

    #[test]
    fn test_with_coupon_applies_percentage() {
        let totals = Totals::with_coupon(&items(), Some(&coupon(20)), &PricingPolicy::default());
        assert_eq!(totals.discount, Decimal::from(5));
        assert_eq!(totals.total, Decimal::new(3750, 2));

        let none = Totals::with_coupon(&items(), None, &PricingPolicy::default());
        assert_eq!(none.discount, Decimal::ZERO);
    }
}
