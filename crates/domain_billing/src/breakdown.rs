//! Bill breakdown
//!
//! The breakdown is the calculator's output: per-tier base charges, tax and
//! surcharge lines, their rounded totals and the rate entries that produced
//! them. It is returned to the caller and serialized into the bill record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BillingMonth, RateEntryId};
use domain_tariff::{ConsumerType, RateEntry, RateKind};

/// Base charge for the units falling inside one tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierLine {
    pub tier_name: String,
    pub units_in_tier: Decimal,
    pub rate_per_unit: Decimal,
    pub amount: Decimal,
}

/// How a tax or surcharge line was computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeKind {
    /// `value` percent of the base amount
    Percentage,
    /// `value` added as-is
    Fixed,
    /// `value` per unit consumed
    PerKwh,
}

/// A tax or surcharge line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeLine {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChargeKind,
    pub value: Decimal,
    pub amount: Decimal,
}

/// Reference to a rate entry that contributed to a bill
///
/// Copied by value so a stored bill is unaffected by later rate changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedRate {
    pub id: RateEntryId,
    pub name: String,
    pub kind: RateKind,
    pub value: Decimal,
}

impl From<&RateEntry> for AppliedRate {
    fn from(entry: &RateEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name.clone(),
            kind: entry.kind,
            value: entry.value,
        }
    }
}

/// The detail lines persisted alongside a bill's summary amounts
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBreakdown {
    pub tier_breakdown: Vec<TierLine>,
    pub taxes: Vec<ChargeLine>,
    pub surcharges: Vec<ChargeLine>,
}

/// A computed bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_id: Option<String>,
    pub consumer_type: ConsumerType,
    pub units_consumed: Decimal,
    #[serde(rename = "calculationMonth")]
    pub billing_month: BillingMonth,
    pub tier_breakdown: Vec<TierLine>,
    pub base_amount: Decimal,
    pub taxes: Vec<ChargeLine>,
    pub total_tax: Decimal,
    pub surcharges: Vec<ChargeLine>,
    pub total_surcharge: Decimal,
    pub total_amount: Decimal,
    pub calculation_date: DateTime<Utc>,
    pub applied_rates: Vec<AppliedRate>,
}

impl BillBreakdown {
    /// The detail lines without the summary amounts
    pub fn rate_breakdown(&self) -> RateBreakdown {
        RateBreakdown {
            tier_breakdown: self.tier_breakdown.clone(),
            taxes: self.taxes.clone(),
            surcharges: self.surcharges.clone(),
        }
    }

    /// Difference between the rounded total and the sum of rounded parts
    ///
    /// Each part is rounded independently, so with surcharges stated at
    /// currency precision this never exceeds 0.01.
    pub fn rounding_drift(&self) -> Decimal {
        (self.total_amount - (self.base_amount + self.total_tax + self.total_surcharge)).abs()
    }
}
