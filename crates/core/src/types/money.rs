//! Money helpers on top of `rust_decimal`.
//!
//! Amounts are plain [`Decimal`] values in the store currency. The backend
//! sends them either as JSON numbers or as strings (`"10.00"`); `Decimal`'s
//! own deserializer accepts both, so no wrapper type is needed.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round an amount to cents, half away from zero.
///
/// The result always carries two decimal places, so it serializes as
/// `"25.00"` rather than `"25"`.
///
/// ```
/// use bazaar_core::round_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_money(Decimal::new(2345, 3)), Decimal::new(235, 2));
/// assert_eq!(round_money(Decimal::from(25)).to_string(), "25.00");
/// ```
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Format an amount for display, e.g. `$42.50`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let rounded = round_money(amount);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_midpoint() {
        assert_eq!(round_money(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round_money(Decimal::new(-1005, 3)), Decimal::new(-101, 2));
        assert_eq!(round_money(Decimal::new(25, 1)), Decimal::new(250, 2));
        assert_eq!(round_money(Decimal::new(25, 1)).to_string(), "2.50");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::new(4250, 2)), "$42.50");
        assert_eq!(format_money(Decimal::from(15)), "$15.00");
        assert_eq!(format_money(Decimal::new(-3, 0)), "-$3.00");
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
    }
}
