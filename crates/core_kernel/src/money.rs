//! Monetary arithmetic on `rust_decimal`
//!
//! Bills are computed in a single implicit currency. Every reported amount is
//! rounded to two decimal places with round-half-away-from-zero, which is the
//! rounding customers expect on a printed bill (0.125 becomes 0.13, not 0.12).

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of decimal places used for reported monetary amounts
pub const CURRENCY_SCALE: u32 = 2;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Negative amount for {field}: {value}")]
    NegativeAmount {
        field: String,
        value: Decimal,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Arithmetic overflow while computing {0}")]
    Overflow(String),
}

/// Rounds an amount to currency precision (0.01), half away from zero
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Checks that a quantity is zero or positive
///
/// # Arguments
///
/// * `value` - The quantity to check
/// * `field` - Field name reported on failure
pub fn ensure_non_negative(value: Decimal, field: &str) -> Result<Decimal, MoneyError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(MoneyError::NegativeAmount {
            field: field.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Multiplies two amounts, failing instead of panicking on overflow
///
/// # Arguments
///
/// * `lhs` - Left operand
/// * `rhs` - Right operand
/// * `what` - Name of the quantity being computed, reported on failure
///
/// # Errors
///
/// Returns `MoneyError::Overflow` when the product exceeds `Decimal` range
pub fn checked_mul(lhs: Decimal, rhs: Decimal, what: &str) -> Result<Decimal, MoneyError> {
    lhs.checked_mul(rhs)
        .ok_or_else(|| MoneyError::Overflow(what.to_string()))
}

/// Adds two amounts, failing instead of panicking on overflow
pub fn checked_add(lhs: Decimal, rhs: Decimal, what: &str) -> Result<Decimal, MoneyError> {
    lhs.checked_add(rhs)
        .ok_or_else(|| MoneyError::Overflow(what.to_string()))
}

/// A percentage expressed in whole points (15 means 15%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(Decimal);

impl Percentage {
    /// Creates a percentage from whole points (e.g., 15 for 15%)
    pub const fn new(points: Decimal) -> Self {
        Self(points)
    }

    /// Zero percent
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the percentage in whole points
    pub fn points(&self) -> Decimal {
        self.0
    }

    /// Returns the rate as a fraction (0.15 for 15%)
    pub fn as_fraction(&self) -> Decimal {
        self.0 / dec!(100)
    }

    /// Applies the percentage to an amount without rounding
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` when `amount * points` exceeds `Decimal` range
    pub fn apply(&self, amount: Decimal) -> Result<Decimal, MoneyError> {
        let scaled = checked_mul(amount, self.0, "percentage")?;
        Ok(scaled / dec!(100))
    }
}

impl From<Decimal> for Percentage {
    fn from(points: Decimal) -> Self {
        Self(points)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_currency(dec!(0.125)), dec!(0.13));
        assert_eq!(round_currency(dec!(0.124)), dec!(0.12));
        assert_eq!(round_currency(dec!(-0.125)), dec!(-0.13));
        assert_eq!(round_currency(dec!(2.675)), dec!(2.68));
    }

    #[test]
    fn test_percentage_application() {
        let vat = Percentage::new(dec!(15));
        assert_eq!(vat.apply(dec!(12.00)), Ok(dec!(1.80)));
        assert_eq!(vat.as_fraction(), dec!(0.15));
    }

    #[test]
    fn test_percentage_overflow_is_an_error() {
        let vat = Percentage::new(dec!(15));
        assert!(matches!(vat.apply(Decimal::MAX), Err(MoneyError::Overflow(_))));
    }

    #[test]
    fn test_negative_rejected() {
        assert!(ensure_non_negative(dec!(-0.01), "units").is_err());
        assert_eq!(ensure_non_negative(dec!(0), "units"), Ok(dec!(0)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rounding_stays_within_half_a_cent(minor in -1_000_000_000i64..1_000_000_000i64) {
            let amount = Decimal::new(minor, 4);
            let rounded = round_currency(amount);
            prop_assert!((rounded - amount).abs() <= dec!(0.005));
            prop_assert!(rounded.scale() <= CURRENCY_SCALE);
        }

        #[test]
        fn rounding_is_idempotent(minor in -1_000_000_000i64..1_000_000_000i64) {
            let once = round_currency(Decimal::new(minor, 3));
            prop_assert_eq!(round_currency(once), once);
        }
    }
}
