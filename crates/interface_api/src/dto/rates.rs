//! Rate configuration DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AdminId, RateEntryId};
use domain_tariff::{
    EffectiveRate, NewRateEntry, RateEntry, RateEntryChanges, RateKind, RateScope, TaxesAndSurcharges,
    ValueKind,
};

use super::{double_option, FlexibleDate};

/// Body of `POST /config`
///
/// Only the name, type and value are required; everything else falls back
/// to the entry defaults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRateRequest {
    pub rate_name: String,
    pub rate_type: RateKind,
    pub rate_value: Decimal,
    pub unit_type: Option<ValueKind>,
    pub consumer_type: Option<RateScope>,
    pub tier_min_units: Option<Decimal>,
    pub tier_max_units: Option<Decimal>,
    pub vat_percentage: Option<Decimal>,
    pub fixed_service_charge: Option<Decimal>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub effective_from: Option<FlexibleDate>,
    pub effective_to: Option<FlexibleDate>,
}

impl From<CreateRateRequest> for NewRateEntry {
    fn from(req: CreateRateRequest) -> Self {
        NewRateEntry {
            name: req.rate_name,
            kind: req.rate_type,
            value: req.rate_value,
            value_kind: req.unit_type,
            scope: req.consumer_type,
            tier_min_units: req.tier_min_units,
            tier_max_units: req.tier_max_units,
            vat_percentage: req.vat_percentage,
            fixed_service_charge: req.fixed_service_charge,
            description: req.description,
            is_active: req.is_active,
            effective_from: req.effective_from.map(|d| d.0),
            effective_to: req.effective_to.map(|d| d.0),
        }
    }
}

/// Partial update; an explicit `null` clears a nullable field
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRateRequest {
    pub rate_name: Option<String>,
    pub rate_type: Option<RateKind>,
    pub rate_value: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub unit_type: Option<Option<ValueKind>>,
    pub consumer_type: Option<RateScope>,
    pub tier_min_units: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub tier_max_units: Option<Option<Decimal>>,
    pub vat_percentage: Option<Decimal>,
    pub fixed_service_charge: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub effective_from: Option<Option<FlexibleDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub effective_to: Option<Option<FlexibleDate>>,
}

impl From<UpdateRateRequest> for RateEntryChanges {
    fn from(req: UpdateRateRequest) -> Self {
        let date = |d: Option<Option<FlexibleDate>>| d.map(|inner| inner.map(|d| d.0));
        RateEntryChanges {
            name: req.rate_name,
            kind: req.rate_type,
            value: req.rate_value,
            value_kind: req.unit_type,
            scope: req.consumer_type,
            tier_min_units: req.tier_min_units,
            tier_max_units: req.tier_max_units,
            vat_percentage: req.vat_percentage,
            fixed_service_charge: req.fixed_service_charge,
            description: req.description,
            is_active: req.is_active,
            effective_from: date(req.effective_from),
            effective_to: date(req.effective_to),
        }
    }
}

/// A rate entry as returned by every `/config` route
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateEntryResponse {
    pub id: RateEntryId,
    pub rate_name: String,
    pub rate_type: RateKind,
    pub rate_value: Decimal,
    pub unit_type: Option<ValueKind>,
    pub consumer_type: RateScope,
    pub tier_min_units: Decimal,
    pub tier_max_units: Option<Decimal>,
    pub vat_percentage: Decimal,
    pub fixed_service_charge: Decimal,
    pub description: Option<String>,
    pub is_active: bool,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
    pub created_by: Option<AdminId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RateEntry> for RateEntryResponse {
    fn from(entry: RateEntry) -> Self {
        Self {
            id: entry.id,
            rate_name: entry.name,
            rate_type: entry.kind,
            rate_value: entry.value,
            unit_type: entry.value_kind,
            consumer_type: entry.scope,
            tier_min_units: entry.tier_min_units,
            tier_max_units: entry.tier_max_units,
            vat_percentage: entry.vat_percentage,
            fixed_service_charge: entry.fixed_service_charge,
            description: entry.description,
            is_active: entry.is_active,
            effective_from: entry.effective_from,
            effective_to: entry.effective_to,
            created_by: entry.created_by,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

/// Converts a list of entries for a response body
pub fn entry_list(entries: Vec<RateEntry>) -> Vec<RateEntryResponse> {
    entries.into_iter().map(RateEntryResponse::from).collect()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveRateResponse {
    pub rate_per_unit: Decimal,
    pub vat_percentage: Decimal,
    pub fixed_service_charge: Decimal,
}

impl From<EffectiveRate> for EffectiveRateResponse {
    fn from(rate: EffectiveRate) -> Self {
        Self {
            rate_per_unit: rate.unit_price,
            vat_percentage: rate.vat_percent.points(),
            fixed_service_charge: rate.fixed_surcharge,
        }
    }
}

/// Replacement flat rate
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRateRequest {
    pub rate_per_unit: Decimal,
    pub vat_percentage: Decimal,
    pub fixed_service_charge: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TaxesAndSurchargesResponse {
    pub taxes: Vec<RateEntryResponse>,
    pub surcharges: Vec<RateEntryResponse>,
}

impl From<TaxesAndSurcharges> for TaxesAndSurchargesResponse {
    fn from(value: TaxesAndSurcharges) -> Self {
        Self {
            taxes: entry_list(value.taxes),
            surcharges: entry_list(value.surcharges),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigListQuery {
    pub active: Option<String>,
}

impl ConfigListQuery {
    /// Only the literal `true` selects the active listing
    pub fn active_only(&self) -> bool {
        self.active.as_deref() == Some("true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_request_wire_names() {
        let json = r#"{
            "rateName": "VAT",
            "rateType": "tax",
            "rateValue": 15,
            "unitType": "percentage",
            "consumerType": "residential",
            "effectiveFrom": "2024-01-01T00:00:00.000Z"
        }"#;
        let request: CreateRateRequest = serde_json::from_str(json).unwrap();
        let entry = NewRateEntry::from(request);

        assert_eq!(entry.kind, RateKind::Tax);
        assert_eq!(entry.value, dec!(15));
        assert_eq!(entry.value_kind, Some(ValueKind::Percentage));
        assert_eq!(entry.scope, Some(RateScope::Residential));
        assert_eq!(entry.effective_from, NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn test_update_request_clears_with_null() {
        let request: UpdateRateRequest =
            serde_json::from_str(r#"{"rateValue": "0.2", "tierMaxUnits": null}"#).unwrap();
        let changes = RateEntryChanges::from(request);

        assert_eq!(changes.value, Some(dec!(0.2)));
        assert_eq!(changes.tier_max_units, Some(None));
        assert_eq!(changes.description, None);
    }

    #[test]
    fn test_only_literal_true_selects_active() {
        let query = |v: Option<&str>| ConfigListQuery {
            active: v.map(str::to_string),
        };
        assert!(query(Some("true")).active_only());
        assert!(!query(Some("1")).active_only());
        assert!(!query(None).active_only());
    }
}
