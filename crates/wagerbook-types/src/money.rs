//! Monetary rounding for ledger amounts.
//!
//! Every amount that lands in a ledger entry is rounded to the smallest
//! currency unit ([`constants::CURRENCY_DP`] decimal places) using
//! round-half-up. Intermediate arithmetic stays at full `Decimal` precision;
//! only the written amounts are rounded.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants;

/// Round an amount to the smallest currency unit, half-up.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(constants::CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2)); // 12.345 -> 12.35
        assert_eq!(round_money(Decimal::new(12344, 3)), Decimal::new(1234, 2)); // 12.344 -> 12.34
    }

    #[test]
    fn half_rounds_up() {
        // 0.005 -> 0.01 (midpoint away from zero, not banker's)
        assert_eq!(round_money(Decimal::new(5, 3)), Decimal::new(1, 2));
    }

    #[test]
    fn already_rounded_unchanged() {
        let amount = Decimal::new(10050, 2); // 100.50
        assert_eq!(round_money(amount), amount);
    }
}
