//! Cart pricing in exact integer cents.
//!
//! Tax is computed once on the subtotal, never per line, so the persisted
//! totals cannot drift from what a per-line rounding would produce.

use crate::errors::ServiceError;

/// Sales tax rate in basis points (7.5%).
pub const TAX_RATE_BASIS_POINTS: i64 = 750;

const BASIS_POINT_SCALE: i64 = 10_000;

/// Computed totals for a cart, all integer cents.
///
/// Invariant: `total_cents = subtotal_cents + tax_cents - discount_cents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

/// Prices a cart of `(unit_price_cents, quantity)` lines.
///
/// Rejects non-positive prices and quantities; callers validate earlier,
/// but the calculator refuses them regardless. Discounts are reserved and
/// always zero.
pub fn price_cart(lines: &[(i64, i32)]) -> Result<CartTotals, ServiceError> {
    let mut subtotal_cents: i64 = 0;

    for &(unit_price_cents, quantity) in lines {
        if unit_price_cents <= 0 {
            return Err(ServiceError::InvalidInput(format!(
                "unit price must be positive, got {unit_price_cents}"
            )));
        }
        if quantity <= 0 {
            return Err(ServiceError::InvalidInput(format!(
                "quantity must be positive, got {quantity}"
            )));
        }

        let line_subtotal = unit_price_cents
            .checked_mul(i64::from(quantity))
            .and_then(|line| subtotal_cents.checked_add(line))
            .ok_or_else(|| ServiceError::InvalidInput("cart subtotal overflows".to_string()))?;
        subtotal_cents = line_subtotal;
    }

    let tax_cents = tax_for_subtotal(subtotal_cents);
    let discount_cents = 0;

    Ok(CartTotals {
        subtotal_cents,
        tax_cents,
        discount_cents,
        total_cents: subtotal_cents + tax_cents - discount_cents,
    })
}

/// Tax on a subtotal, rounded half-up to the nearest cent.
pub fn tax_for_subtotal(subtotal_cents: i64) -> i64 {
    debug_assert!(subtotal_cents >= 0);
    (subtotal_cents * TAX_RATE_BASIS_POINTS + BASIS_POINT_SCALE / 2) / BASIS_POINT_SCALE
}

/// Line subtotal for a snapshot price, exact integer arithmetic.
pub fn line_subtotal(unit_price_cents: i64, quantity: i32) -> i64 {
    unit_price_cents * i64::from(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn coffee_for_two_rounds_half_up() {
        // 250c x 2 -> subtotal 500, tax round(37.5) = 38, total 538
        let totals = price_cart(&[(250, 2)]).unwrap();
        assert_eq!(totals.subtotal_cents, 500);
        assert_eq!(totals.tax_cents, 38);
        assert_eq!(totals.total_cents, 538);
    }

    #[test]
    fn tax_rounds_down_below_half_a_cent() {
        // 150c -> 11.25 -> 11
        assert_eq!(tax_for_subtotal(150), 11);
        // 100c -> 7.5 -> 8
        assert_eq!(tax_for_subtotal(100), 8);
        // 0 -> 0
        assert_eq!(tax_for_subtotal(0), 0);
    }

    #[test]
    fn multi_line_cart_sums_before_taxing() {
        // 250 + 350*2 + 150 = 1100; tax round(82.5) = 83
        let totals = price_cart(&[(250, 1), (350, 2), (150, 1)]).unwrap();
        assert_eq!(totals.subtotal_cents, 1100);
        assert_eq!(totals.tax_cents, 83);
        assert_eq!(totals.total_cents, 1183);
    }

    #[test]
    fn duplicate_lines_are_priced_independently() {
        let merged = price_cart(&[(250, 4)]).unwrap();
        let split = price_cart(&[(250, 2), (250, 2)]).unwrap();
        assert_eq!(merged, split);
    }

    #[test]
    fn rejects_non_positive_inputs() {
        assert!(price_cart(&[(0, 1)]).is_err());
        assert!(price_cart(&[(-250, 1)]).is_err());
        assert!(price_cart(&[(250, 0)]).is_err());
        assert!(price_cart(&[(250, -1)]).is_err());
    }

    #[test]
    fn empty_cart_prices_to_zero() {
        let totals = price_cart(&[]).unwrap();
        assert_eq!(totals.subtotal_cents, 0);
        assert_eq!(totals.total_cents, 0);
    }

    proptest! {
        #[test]
        fn total_is_subtotal_plus_tax(
            lines in prop::collection::vec((1i64..100_000, 1i32..100), 1..20)
        ) {
            let totals = price_cart(&lines).unwrap();
            prop_assert_eq!(
                totals.total_cents,
                totals.subtotal_cents + totals.tax_cents - totals.discount_cents
            );
            prop_assert_eq!(totals.discount_cents, 0);
        }

        #[test]
        fn subtotal_is_exact_line_sum(
            lines in prop::collection::vec((1i64..100_000, 1i32..100), 1..20)
        ) {
            let totals = price_cart(&lines).unwrap();
            let expected: i64 = lines
                .iter()
                .map(|&(price, qty)| line_subtotal(price, qty))
                .sum();
            prop_assert_eq!(totals.subtotal_cents, expected);
        }

        #[test]
        fn tax_is_within_one_cent_of_exact_rate(subtotal in 0i64..10_000_000) {
            let tax = tax_for_subtotal(subtotal);
            let exact_scaled = subtotal * TAX_RATE_BASIS_POINTS;
            let diff = (tax * BASIS_POINT_SCALE - exact_scaled).abs();
            prop_assert!(diff <= BASIS_POINT_SCALE / 2);
        }

        #[test]
        fn taxing_once_never_exceeds_per_line_drift(
            lines in prop::collection::vec((1i64..100_000, 1i32..100), 1..20)
        ) {
            // Taxing the subtotal once can differ from summing per-line
            // rounded taxes, but only by strictly less than one cent per line.
            let totals = price_cart(&lines).unwrap();
            let per_line: i64 = lines
                .iter()
                .map(|&(price, qty)| tax_for_subtotal(line_subtotal(price, qty)))
                .sum();
            prop_assert!((totals.tax_cents - per_line).abs() <= lines.len() as i64);
        }
    }
}
