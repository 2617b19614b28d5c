//! Custom Test Assertions
//!
//! Assertion helpers for amounts and breakdowns with messages that show the
//! offending values.

use rust_decimal::Decimal;

use core_kernel::CURRENCY_SCALE;
use domain_billing::{BillBreakdown, BillRecord};

/// Asserts two decimals are numerically equal regardless of scale
pub fn assert_decimal_eq(actual: Decimal, expected: Decimal) {
    assert_eq!(
        actual.normalize(),
        expected.normalize(),
        "Decimal mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts an amount carries no more than two decimal places
pub fn assert_currency_precision(amount: Decimal) {
    assert!(
        amount.normalize().scale() <= CURRENCY_SCALE,
        "Expected at most {} decimal places, got {}",
        CURRENCY_SCALE,
        amount
    );
}

/// Asserts every monetary field of a breakdown is rounded and non-negative
pub fn assert_breakdown_well_formed(breakdown: &BillBreakdown) {
    let amounts = [
        ("base_amount", breakdown.base_amount),
        ("total_tax", breakdown.total_tax),
        ("total_surcharge", breakdown.total_surcharge),
        ("total_amount", breakdown.total_amount),
    ];
    for (field, amount) in amounts {
        assert!(amount >= Decimal::ZERO, "{} is negative: {}", field, amount);
        assert_currency_precision(amount);
    }
    for line in &breakdown.tier_breakdown {
        assert_currency_precision(line.amount);
    }
    for line in breakdown.taxes.iter().chain(&breakdown.surcharges) {
        assert_currency_precision(line.amount);
    }

    let parts = breakdown.base_amount + breakdown.total_tax + breakdown.total_surcharge;
    assert!(
        (breakdown.total_amount - parts).abs() <= Decimal::new(2, 2),
        "Total {} drifts from parts {}",
        breakdown.total_amount,
        parts
    );
}

/// Asserts a stored record carries the same figures as its breakdown
pub fn assert_record_matches(record: &BillRecord, breakdown: &BillBreakdown) {
    assert_eq!(record.consumer_type, breakdown.consumer_type);
    assert_decimal_eq(record.units_consumed, breakdown.units_consumed);
    assert_decimal_eq(record.base_amount, breakdown.base_amount);
    assert_decimal_eq(record.tax_amount, breakdown.total_tax);
    assert_decimal_eq(record.surcharge_amount, breakdown.total_surcharge);
    assert_decimal_eq(record.total_amount, breakdown.total_amount);
    assert_eq!(record.billing_month, breakdown.billing_month);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_eq_ignores_scale() {
        assert_decimal_eq(dec!(18.8), dec!(18.80));
    }

    #[test]
    #[should_panic(expected = "decimal places")]
    fn test_currency_precision_rejects_fractions_of_cents() {
        assert_currency_precision(dec!(1.005));
    }

    #[test]
    fn test_currency_precision_accepts_trailing_zeros() {
        assert_currency_precision(dec!(1.2000));
    }
}
