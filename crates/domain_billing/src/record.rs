//! Persisted bill records
//!
//! A record is written once per successful calculation and never updated.
//! Detail lines and applied rates are stored as JSON text so the record stays
//! readable after the rates that produced it have changed or been deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BillRecordId, BillingMonth};
use domain_tariff::ConsumerType;

use crate::breakdown::{AppliedRate, BillBreakdown, RateBreakdown};
use crate::error::BillingError;

/// An immutable record of a computed bill
///
/// Summary amounts are stored as columns so history can be aggregated in
/// SQL; the detail lines travel as JSON text and are decoded on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    pub id: BillRecordId,
    pub consumer_name: Option<String>,
    pub consumer_id: Option<String>,
    pub consumer_type: ConsumerType,
    pub units_consumed: Decimal,
    /// Rounded energy charge before taxes and surcharges
    pub base_amount: Decimal,
    /// Rounded sum of all taxes
    pub tax_amount: Decimal,
    /// Rounded sum of all surcharges
    pub surcharge_amount: Decimal,
    /// Rounded from the unrounded parts, so it may differ from their rounded sum by 0.01
    pub total_amount: Decimal,
    #[serde(rename = "calculationMonth")]
    pub billing_month: BillingMonth,
    /// JSON of [`RateBreakdown`]
    pub rate_breakdown: String,
    /// JSON array of [`AppliedRate`]
    pub applied_rates: String,
    pub created_at: DateTime<Utc>,
}

impl BillRecord {
    /// Captures a breakdown as a new record
    pub fn from_breakdown(breakdown: &BillBreakdown) -> Result<Self, BillingError> {
        Ok(Self {
            id: BillRecordId::new(),
            consumer_name: breakdown.consumer_name.clone(),
            consumer_id: breakdown.consumer_id.clone(),
            consumer_type: breakdown.consumer_type,
            units_consumed: breakdown.units_consumed,
            base_amount: breakdown.base_amount,
            tax_amount: breakdown.total_tax,
            surcharge_amount: breakdown.total_surcharge,
            total_amount: breakdown.total_amount,
            billing_month: breakdown.billing_month,
            rate_breakdown: serde_json::to_string(&breakdown.rate_breakdown())?,
            applied_rates: serde_json::to_string(&breakdown.applied_rates)?,
            created_at: breakdown.calculation_date,
        })
    }

    /// Parses the stored detail lines
    pub fn breakdown(&self) -> Result<RateBreakdown, BillingError> {
        Ok(serde_json::from_str(&self.rate_breakdown)?)
    }

    /// Parses the stored applied-rate references
    pub fn applied(&self) -> Result<Vec<AppliedRate>, BillingError> {
        Ok(serde_json::from_str(&self.applied_rates)?)
    }
}

/// Per-consumer-type totals for one billing month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAggregate {
    pub consumer_type: ConsumerType,
    /// Number of bills
    pub count: i64,
    pub total_units: Decimal,
    /// Sum of `total_amount`
    pub total_revenue: Decimal,
}

/// One page of bill records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPage {
    pub items: Vec<BillRecord>,
    /// Number of records across all pages
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{BillCalculator, BillRequest};
    use domain_tariff::EffectiveRate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_keeps_summary_and_detail() {
        let request = BillRequest::new(ConsumerType::Residential, dec!(100))
            .with_consumer(Some("Ada".to_string()), Some("C-1".to_string()));
        let bill = BillCalculator::default()
            .flat(&request, &EffectiveRate::DEFAULT, Utc::now())
            .unwrap();

        let record = BillRecord::from_breakdown(&bill).unwrap();
        assert_eq!(record.total_amount, dec!(18.80));
        assert_eq!(record.tax_amount, bill.total_tax);
        assert_eq!(record.consumer_id.as_deref(), Some("C-1"));
        assert_eq!(record.breakdown().unwrap(), bill.rate_breakdown());
        assert!(record.applied().unwrap().is_empty());
        assert!(record.rate_breakdown.contains("\"tierBreakdown\""));
    }
}
