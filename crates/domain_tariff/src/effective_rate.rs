//! The effective flat rate used by the bill calculator

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::Percentage;

use crate::rate_entry::RateEntry;

/// Unit price, VAT and fixed surcharge applied to the next flat calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveRate {
    /// Price per kWh
    pub unit_price: Decimal,
    /// VAT applied to the unrounded subtotal
    pub vat_percent: Percentage,
    /// Flat amount added to every bill
    pub fixed_surcharge: Decimal,
}

impl EffectiveRate {
    /// Rate used when no active entry exists
    pub const DEFAULT: EffectiveRate = EffectiveRate {
        unit_price: dec!(0.12),
        vat_percent: Percentage::new(dec!(15)),
        fixed_surcharge: dec!(5),
    };

    /// Creates a rate from a unit price, VAT in whole points and a fixed surcharge
    ///
    /// # Example
    ///
    /// ```rust
    /// use domain_tariff::EffectiveRate;
    /// use rust_decimal_macros::dec;
    ///
    /// let rate = EffectiveRate::new(dec!(0.12), dec!(15), dec!(5));
    /// assert_eq!(rate, EffectiveRate::DEFAULT);
    /// ```
    pub fn new(unit_price: Decimal, vat_percent: Decimal, fixed_surcharge: Decimal) -> Self {
        Self {
            unit_price,
            vat_percent: Percentage::new(vat_percent),
            fixed_surcharge,
        }
    }
}

impl Default for EffectiveRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<&RateEntry> for EffectiveRate {
    fn from(entry: &RateEntry) -> Self {
        Self::new(entry.value, entry.vat_percentage, entry.fixed_service_charge)
    }
}
