//! Points accounting rules. Pure functions only: no store access, no clock.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Currency units that earn one point at a rate of 1.
pub const BASE_UNIT: Decimal = Decimal::ONE_HUNDRED;

/// Rate applied when a merchant is registered without one.
pub const DEFAULT_POINTS_RATE: Decimal = Decimal::ONE;

/// Points earned for a purchase: `floor(amount / 100 * rate)`.
///
/// Non-positive inputs earn nothing. Returns `None` only when the result does
/// not fit the ledger's integer range.
#[must_use]
pub fn compute_earn(amount: Decimal, rate: Decimal) -> Option<i64> {
    if amount <= Decimal::ZERO || rate <= Decimal::ZERO {
        return Some(0);
    }
    amount
        .checked_div(BASE_UNIT)
        .and_then(|units| units.checked_mul(rate))
        .and_then(|points| points.floor().to_i64())
}

/// Discount granted for redeeming `points`. One point is one currency unit.
#[must_use]
pub const fn compute_redeem_discount(points: i64) -> i64 {
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap_or_default()
    }

    #[test]
    fn floors_fractional_points() {
        assert_eq!(compute_earn(dec("250"), Decimal::ONE), Some(2));
        assert_eq!(compute_earn(dec("199.99"), Decimal::ONE), Some(1));
    }

    #[test]
    fn applies_merchant_rate() {
        assert_eq!(compute_earn(dec("500"), dec("2")), Some(10));
        assert_eq!(compute_earn(dec("1000"), dec("1.5")), Some(15));
        assert_eq!(compute_earn(dec("1000"), dec("0.25")), Some(2));
    }

    #[test]
    fn zero_amount_earns_nothing() {
        for rate in ["0.5", "1", "3", "10"] {
            assert_eq!(compute_earn(Decimal::ZERO, dec(rate)), Some(0));
        }
    }

    #[test]
    fn small_purchase_is_silent_zero_award() {
        assert_eq!(compute_earn(dec("99"), Decimal::ONE), Some(0));
        assert_eq!(compute_earn(dec("50"), dec("0.5")), Some(0));
    }

    #[test]
    fn monotonic_in_amount_and_rate() {
        let mut previous = 0;
        for amount in (0..5_000).step_by(37) {
            let points = compute_earn(Decimal::from(amount), dec("1.3")).unwrap_or_default();
            assert!(points >= previous);
            previous = points;
        }

        let mut previous = 0;
        for tenths in 1..60 {
            let rate = Decimal::new(tenths, 1);
            let points = compute_earn(dec("730"), rate).unwrap_or_default();
            assert!(points >= previous);
            previous = points;
        }
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(compute_earn(Decimal::MAX, Decimal::MAX), None);
    }

    #[test]
    fn discount_is_one_to_one() {
        for points in [1, 10, 999, 1_000_000] {
            assert_eq!(compute_redeem_discount(points), points);
        }
    }
}
