//! Test Data Builders
//!
//! Builders that fill every field with sensible defaults so tests only
//! spell out what they care about.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AdminId, BillingMonth, RateEntryId, Timezone};
use domain_billing::{BillCalculator, BillRecord, BillRequest, TieredSchedule};
use domain_tariff::{ConsumerType, EffectiveRate, RateEntry, RateKind, RateScope, ValueKind};

use crate::fixtures::{RateFixtures, TemporalFixtures};

/// Builder for rate entries; defaults to an active, all-scope base rate of 0.12
pub struct RateEntryBuilder {
    entry: RateEntry,
}

impl Default for RateEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateEntryBuilder {
    /// Creates a builder with default values
    pub fn new() -> Self {
        let now = TemporalFixtures::now();
        Self {
            entry: RateEntry {
                id: RateEntryId::new(),
                name: "Standard Rate".to_string(),
                kind: RateKind::BaseRate,
                value: dec!(0.12),
                value_kind: None,
                scope: RateScope::All,
                tier_min_units: Decimal::ZERO,
                tier_max_units: None,
                vat_percentage: Decimal::ZERO,
                fixed_service_charge: Decimal::ZERO,
                description: None,
                is_active: true,
                effective_from: Some(TemporalFixtures::tariff_start()),
                effective_to: None,
                created_by: None,
                created_at: now,
                updated_at: now,
            },
        }
    }

    /// Sets the entry name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.entry.name = name.into();
        self
    }

    /// Sets the rate kind
    pub fn kind(mut self, kind: RateKind) -> Self {
        self.entry.kind = kind;
        self
    }

    /// Sets the rate value
    pub fn value(mut self, value: Decimal) -> Self {
        self.entry.value = value;
        self
    }

    /// Sets how the value is applied
    pub fn value_kind(mut self, value_kind: ValueKind) -> Self {
        self.entry.value_kind = Some(value_kind);
        self
    }

    /// Sets the consumer scope
    pub fn scope(mut self, scope: RateScope) -> Self {
        self.entry.scope = scope;
        self
    }

    /// Sets the tier band bounds
    pub fn tier(mut self, min: Decimal, max: Option<Decimal>) -> Self {
        self.entry.tier_min_units = min;
        self.entry.tier_max_units = max;
        self
    }

    /// Sets the VAT percentage carried by a flat-rate entry
    pub fn vat(mut self, percent: Decimal) -> Self {
        self.entry.vat_percentage = percent;
        self
    }

    /// Sets the fixed service charge
    pub fn service_charge(mut self, amount: Decimal) -> Self {
        self.entry.fixed_service_charge = amount;
        self
    }

    /// Marks the entry inactive
    pub fn inactive(mut self) -> Self {
        self.entry.is_active = false;
        self
    }

    /// Sets the effective window
    pub fn effective(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.entry.effective_from = from;
        self.entry.effective_to = to;
        self
    }

    /// Sets the authoring admin
    pub fn created_by(mut self, admin: AdminId) -> Self {
        self.entry.created_by = Some(admin);
        self
    }

    /// Sets both creation and update timestamps
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.entry.created_at = at;
        self.entry.updated_at = at;
        self
    }

    /// Returns the entry as configured
    pub fn build(self) -> RateEntry {
        self.entry
    }
}

/// Builder for bill records, priced through the real calculator
pub struct BillRecordBuilder {
    request: BillRequest,
    rate: EffectiveRate,
    schedule: Option<TieredSchedule>,
    calculated_at: DateTime<Utc>,
}

impl Default for BillRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BillRecordBuilder {
    /// 100 kWh residential at the default flat rate in March 2024
    pub fn new() -> Self {
        Self {
            request: BillRequest::new(ConsumerType::Residential, dec!(100))
                .for_month(TemporalFixtures::march_2024()),
            rate: RateFixtures::default_rate(),
            schedule: None,
            calculated_at: TemporalFixtures::now(),
        }
    }

    /// Sets the consumer type
    pub fn consumer_type(mut self, consumer_type: ConsumerType) -> Self {
        self.request.consumer_type = consumer_type;
        self
    }

    /// Sets the units consumed
    pub fn units(mut self, units: Decimal) -> Self {
        self.request.units_consumed = units;
        self
    }

    /// Sets the consumer name and ID
    pub fn consumer(mut self, name: Option<&str>, id: Option<&str>) -> Self {
        self.request = self
            .request
            .with_consumer(name.map(str::to_string), id.map(str::to_string));
        self
    }

    /// Sets the billing month
    pub fn month(mut self, month: BillingMonth) -> Self {
        self.request = self.request.for_month(month);
        self
    }

    /// Prices with this flat rate
    pub fn rate(mut self, rate: EffectiveRate) -> Self {
        self.rate = rate;
        self
    }

    /// Prices with tier bands instead of the flat rate
    pub fn tiered(mut self, schedule: TieredSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Sets the calculation instant
    pub fn calculated_at(mut self, at: DateTime<Utc>) -> Self {
        self.calculated_at = at;
        self
    }

    /// Prices the request and converts the breakdown into a record
    ///
    /// # Panics
    ///
    /// Panics if the configured request or rates cannot be priced
    pub fn build(self) -> BillRecord {
        let calculator = BillCalculator::new(Timezone::default());
        let breakdown = match &self.schedule {
            Some(schedule) => calculator.tiered(&self.request, schedule, self.calculated_at),
            None => calculator.flat(&self.request, &self.rate, self.calculated_at),
        }
        .unwrap();
        BillRecord::from_breakdown(&breakdown).unwrap()
    }
}
