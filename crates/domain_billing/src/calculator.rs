//! Bill calculation
//!
//! Pure functions from consumption and rates to a [`BillBreakdown`]. Nothing
//! here touches storage or the clock; callers pass the current instant in.
//!
//! # Flat pricing
//!
//! ```text
//! subtotal = units * unit_price
//! vat      = subtotal * vat_percent / 100
//! total    = subtotal + vat + fixed_surcharge
//! ```
//!
//! `base_amount`, `total_tax`, `total_surcharge` and `total_amount` are each
//! rounded to 0.01 from their unrounded values, half away from zero.
//!
//! # Tiered pricing
//!
//! Units fill the configured bands lowest first. Each band takes at most
//! `max - min` units (unbounded when `max` is absent); units left after the
//! last band are billed at its rate on an "(Additional)" line. Percentage
//! taxes and surcharges apply to the unrounded base amount.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{checked_add, checked_mul, ensure_non_negative, round_currency, BillingMonth, Timezone};
use domain_tariff::{ConsumerType, EffectiveRate, RateEntry, RateKind, ValueKind};

use crate::breakdown::{AppliedRate, BillBreakdown, ChargeKind, ChargeLine, TierLine};
use crate::error::BillingError;

/// Line label of the single flat-rate tier
pub const STANDARD_RATE_LABEL: &str = "Standard Rate";
/// Line label of the flat-rate VAT
pub const VAT_LABEL: &str = "VAT";
/// Line label of the flat-rate fixed surcharge
pub const SERVICE_CHARGE_LABEL: &str = "Service Charge";

/// Exclusive upper bound on billable units; larger readings do not fit the
/// history columns (`NUMERIC(14,4)`)
pub const MAX_UNITS: Decimal = dec!(10000000000);

/// A request to price a period of consumption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRequest {
    pub consumer_type: ConsumerType,
    pub units_consumed: Decimal,
    pub consumer_name: Option<String>,
    pub consumer_id: Option<String>,
    /// Defaults to the current month when absent
    pub billing_month: Option<BillingMonth>,
}

impl BillRequest {
    pub fn new(consumer_type: ConsumerType, units_consumed: Decimal) -> Self {
        Self {
            consumer_type,
            units_consumed,
            consumer_name: None,
            consumer_id: None,
            billing_month: None,
        }
    }

    pub fn with_consumer(mut self, name: Option<String>, id: Option<String>) -> Self {
        self.consumer_name = name;
        self.consumer_id = id;
        self
    }

    pub fn for_month(mut self, month: BillingMonth) -> Self {
        self.billing_month = Some(month);
        self
    }

    /// Checks that consumption is within `0 <= units < MAX_UNITS`
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` naming `unitsConsumed`
    pub fn validate(&self) -> Result<(), BillingError> {
        ensure_non_negative(self.units_consumed, "unitsConsumed")?;
        if self.units_consumed >= MAX_UNITS {
            return Err(BillingError::Validation(format!(
                "unitsConsumed must be below {}",
                MAX_UNITS
            )));
        }
        Ok(())
    }
}

/// The rate entries that make up a tiered bill
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TieredSchedule {
    /// Bands ordered by lower bound
    pub tiers: Vec<RateEntry>,
    pub taxes: Vec<RateEntry>,
    pub surcharges: Vec<RateEntry>,
}

/// Stateless bill calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct BillCalculator {
    timezone: Timezone,
}

impl BillCalculator {
    /// Creates a calculator that derives the default billing month in `timezone`
    pub fn new(timezone: Timezone) -> Self {
        Self { timezone }
    }

    /// Prices consumption at a single flat rate
    ///
    /// # Arguments
    ///
    /// * `request` - Consumption and consumer details
    /// * `rate` - Unit price, VAT and fixed surcharge in effect
    /// * `now` - Calculation instant, also used for the default billing month
    ///
    /// # Errors
    ///
    /// * `BillingError::Validation` when the request is out of range
    /// * `BillingError::Calculation` when an amount overflows
    pub fn flat(
        &self,
        request: &BillRequest,
        rate: &EffectiveRate,
        now: DateTime<Utc>,
    ) -> Result<BillBreakdown, BillingError> {
        request.validate()?;

        let units = request.units_consumed;
        let subtotal = checked_mul(units, rate.unit_price, "subtotal")?;
        let vat = rate.vat_percent.apply(subtotal)?;
        let surcharge = rate.fixed_surcharge;
        let total = checked_add(checked_add(subtotal, vat, "total")?, surcharge, "total")?;

        Ok(BillBreakdown {
            consumer_name: request.consumer_name.clone(),
            consumer_id: request.consumer_id.clone(),
            consumer_type: request.consumer_type,
            units_consumed: units,
            billing_month: self.billing_month(request, now),
            tier_breakdown: vec![TierLine {
                tier_name: STANDARD_RATE_LABEL.to_string(),
                units_in_tier: units,
                rate_per_unit: rate.unit_price,
                amount: round_currency(subtotal),
            }],
            base_amount: round_currency(subtotal),
            taxes: vec![ChargeLine {
                name: VAT_LABEL.to_string(),
                kind: ChargeKind::Percentage,
                value: rate.vat_percent.points(),
                amount: round_currency(vat),
            }],
            total_tax: round_currency(vat),
            surcharges: vec![ChargeLine {
                name: SERVICE_CHARGE_LABEL.to_string(),
                kind: ChargeKind::Fixed,
                value: surcharge,
                amount: round_currency(surcharge),
            }],
            total_surcharge: round_currency(surcharge),
            total_amount: round_currency(total),
            calculation_date: now,
            applied_rates: Vec::new(),
        })
    }

    /// Prices consumption across tier bands with configured taxes and surcharges
    ///
    /// # Arguments
    ///
    /// * `request` - Consumption and consumer details
    /// * `schedule` - Tier bands lowest first, plus taxes and surcharges
    /// * `now` - Calculation instant, also used for the default billing month
    ///
    /// # Errors
    ///
    /// * `BillingError::Validation` when the request is out of range
    /// * `BillingError::Calculation` when the schedule has no tiers or an amount overflows
    pub fn tiered(
        &self,
        request: &BillRequest,
        schedule: &TieredSchedule,
        now: DateTime<Utc>,
    ) -> Result<BillBreakdown, BillingError> {
        request.validate()?;
        if schedule.tiers.is_empty() {
            return Err(BillingError::Calculation(
                "Tiered pricing requires at least one tier".to_string(),
            ));
        }

        let units = request.units_consumed;
        let (tier_lines, base) = tier_breakdown(units, &schedule.tiers)?;
        let (taxes, tax_total) = charge_lines(base, units, &schedule.taxes)?;
        let (surcharges, surcharge_total) = charge_lines(base, units, &schedule.surcharges)?;
        let total = checked_add(checked_add(base, tax_total, "total")?, surcharge_total, "total")?;

        let applied_rates = schedule
            .tiers
            .iter()
            .chain(&schedule.taxes)
            .chain(&schedule.surcharges)
            .map(AppliedRate::from)
            .collect();

        Ok(BillBreakdown {
            consumer_name: request.consumer_name.clone(),
            consumer_id: request.consumer_id.clone(),
            consumer_type: request.consumer_type,
            units_consumed: units,
            billing_month: self.billing_month(request, now),
            tier_breakdown: tier_lines,
            base_amount: round_currency(base),
            taxes,
            total_tax: round_currency(tax_total),
            surcharges,
            total_surcharge: round_currency(surcharge_total),
            total_amount: round_currency(total),
            calculation_date: now,
            applied_rates,
        })
    }

    fn billing_month(&self, request: &BillRequest, now: DateTime<Utc>) -> BillingMonth {
        request
            .billing_month
            .unwrap_or_else(|| BillingMonth::current(&self.timezone, now))
    }
}

/// Splits consumption across tier bands
///
/// Returns the lines, each rounded for display, and the unrounded base amount.
///
/// # Errors
///
/// Returns `BillingError::Calculation` when a band amount or the base overflows
pub fn tier_breakdown(units: Decimal, tiers: &[RateEntry]) -> Result<(Vec<TierLine>, Decimal), BillingError> {
    let mut lines = Vec::new();
    let mut remaining = units;
    let mut base = Decimal::ZERO;

    for tier in tiers {
        if remaining <= Decimal::ZERO {
            break;
        }
        let in_tier = match tier.tier_max_units {
            Some(max) => remaining.min(max - tier.tier_min_units),
            None => remaining,
        };
        if in_tier <= Decimal::ZERO {
            continue;
        }

        let amount = checked_mul(in_tier, tier.value, "tier amount")?;
        lines.push(TierLine {
            tier_name: tier.name.clone(),
            units_in_tier: in_tier,
            rate_per_unit: tier.value,
            amount: round_currency(amount),
        });
        base = checked_add(base, amount, "base amount")?;
        remaining -= in_tier;
    }

    if remaining > Decimal::ZERO {
        if let Some(last) = tiers.last() {
            let amount = checked_mul(remaining, last.value, "tier amount")?;
            lines.push(TierLine {
                tier_name: format!("{} (Additional)", last.name),
                units_in_tier: remaining,
                rate_per_unit: last.value,
                amount: round_currency(amount),
            });
            base = checked_add(base, amount, "base amount")?;
        }
    }

    Ok((lines, base))
}

/// Computes tax or surcharge lines against an unrounded base amount
///
/// Returns the lines, each rounded for display, and their unrounded sum.
///
/// # Errors
///
/// Returns `BillingError::Calculation` when a line or the running sum overflows
pub fn charge_lines(
    base: Decimal,
    units: Decimal,
    entries: &[RateEntry],
) -> Result<(Vec<ChargeLine>, Decimal), BillingError> {
    let mut total = Decimal::ZERO;
    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries {
        let (kind, amount) = match value_kind_of(entry) {
            ValueKind::Percentage => (
                ChargeKind::Percentage,
                checked_mul(base, entry.value, &entry.name)? / dec!(100),
            ),
            ValueKind::Fixed => (ChargeKind::Fixed, entry.value),
            ValueKind::PerKwh => (ChargeKind::PerKwh, checked_mul(units, entry.value, &entry.name)?),
        };
        total = checked_add(total, amount, "charge total")?;
        lines.push(ChargeLine {
            name: entry.name.clone(),
            kind,
            value: entry.value,
            amount: round_currency(amount),
        });
    }
    Ok((lines, total))
}

// Taxes without an explicit value kind are percentages, everything else is fixed
fn value_kind_of(entry: &RateEntry) -> ValueKind {
    entry.value_kind.unwrap_or(match entry.kind {
        RateKind::Tax => ValueKind::Percentage,
        _ => ValueKind::Fixed,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn units() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn rate() -> impl Strategy<Value = EffectiveRate> {
        (1i64..100_000i64, 0i64..5_000i64, 0i64..100_000i64).prop_map(|(price, vat, surcharge)| {
            EffectiveRate::new(Decimal::new(price, 4), Decimal::new(vat, 2), Decimal::new(surcharge, 2))
        })
    }

    proptest! {
        #[test]
        fn flat_amounts_round_independently(units in units(), rate in rate()) {
            let request = BillRequest::new(ConsumerType::Commercial, units);
            let bill = BillCalculator::default().flat(&request, &rate, Utc::now()).unwrap();

            let subtotal = units * rate.unit_price;
            let vat = subtotal * rate.vat_percent.points() / dec!(100);
            prop_assert_eq!(bill.base_amount, round_currency(subtotal));
            prop_assert_eq!(bill.total_tax, round_currency(vat));
            prop_assert_eq!(bill.total_amount, round_currency(subtotal + vat + rate.fixed_surcharge));
        }

        #[test]
        fn flat_total_stays_within_a_cent_of_parts(units in units(), rate in rate()) {
            let request = BillRequest::new(ConsumerType::Industrial, units);
            let bill = BillCalculator::default().flat(&request, &rate, Utc::now()).unwrap();
            prop_assert!(bill.rounding_drift() <= dec!(0.01));
        }

        #[test]
        fn tiered_lines_cover_all_units(
            units in units(),
            first_band in 1i64..1_000i64,
            second_band in 1i64..1_000i64,
        ) {
            let first = Decimal::from(first_band);
            let second = first + Decimal::from(second_band);
            let tiers = vec![
                RateEntry::create(band_request("A", Decimal::ZERO, Some(first)), None, Utc::now()).unwrap(),
                RateEntry::create(band_request("B", first, Some(second)), None, Utc::now()).unwrap(),
            ];

            let (lines, _) = tier_breakdown(units, &tiers).unwrap();
            let covered: Decimal = lines.iter().map(|l| l.units_in_tier).sum();
            prop_assert_eq!(covered, units);
        }
    }

    fn band_request(name: &str, min: Decimal, max: Option<Decimal>) -> domain_tariff::NewRateEntry {
        domain_tariff::NewRateEntry {
            name: name.to_string(),
            kind: RateKind::TierRate,
            value: dec!(0.10),
            tier_min_units: Some(min),
            tier_max_units: max,
            ..Default::default()
        }
    }
}
