//! Property-Based Test Generators
//!
//! Proptest strategies producing values that respect domain invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::BillingMonth;
use domain_tariff::{ConsumerType, EffectiveRate, RateEntry, RateScope};

use crate::fixtures::RateFixtures;

pub fn consumer_type_strategy() -> impl Strategy<Value = ConsumerType> {
    prop_oneof![
        Just(ConsumerType::Residential),
        Just(ConsumerType::Commercial),
        Just(ConsumerType::Industrial),
    ]
}

/// Consumption from 0 to 100 000 kWh with up to two decimals
pub fn units_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Unit price from 0.0001 to 10.0000
pub fn unit_price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|n| Decimal::new(n, 4))
}

/// Percentage points from 0.00 to 100.00
pub fn percent_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Currency amount from 0.00 to 1000.00
pub fn currency_amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=100_000i64).prop_map(|n| Decimal::new(n, 2))
}

pub fn effective_rate_strategy() -> impl Strategy<Value = EffectiveRate> {
    (unit_price_strategy(), percent_strategy(), currency_amount_strategy())
        .prop_map(|(price, vat, surcharge)| EffectiveRate::new(price, vat, surcharge))
}

pub fn billing_month_strategy() -> impl Strategy<Value = BillingMonth> {
    (2000i32..2100i32, 1u32..=12u32).prop_map(|(year, month)| {
        BillingMonth::new(year, month).unwrap()
    })
}

/// Contiguous tier bands starting at zero, the last one open-ended
pub fn tier_schedule_strategy() -> impl Strategy<Value = Vec<RateEntry>> {
    prop::collection::vec((1i64..500i64, unit_price_strategy()), 1..5).prop_map(|bands| {
        let mut lower = Decimal::ZERO;
        let count = bands.len();
        bands
            .into_iter()
            .enumerate()
            .map(|(i, (width, price))| {
                let upper = (i + 1 < count).then(|| lower + Decimal::from(width));
                let entry = RateFixtures::tier(
                    &format!("Tier {}", i + 1),
                    RateScope::All,
                    lower,
                    upper,
                    price,
                );
                if let Some(upper) = upper {
                    lower = upper;
                }
                entry
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_units_are_non_negative(units in units_strategy()) {
            prop_assert!(units >= Decimal::ZERO);
        }

        #[test]
        fn test_tier_schedule_is_contiguous(tiers in tier_schedule_strategy()) {
            prop_assert_eq!(tiers[0].tier_min_units, Decimal::ZERO);
            for pair in tiers.windows(2) {
                prop_assert_eq!(pair[0].tier_max_units, Some(pair[1].tier_min_units));
            }
            prop_assert!(tiers.last().unwrap().tier_max_units.is_none());
        }

        #[test]
        fn test_billing_month_display_parses_back(month in billing_month_strategy()) {
            prop_assert_eq!(month.to_string().parse::<BillingMonth>().unwrap(), month);
        }
    }
}
