//! Rate entries
//!
//! A rate entry is one administrator-maintained pricing record: a flat unit
//! price with its VAT and service charge, a tier band, a tax or a surcharge.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ensure_non_negative, AdminId, EffectiveWindow, RateEntryId};

use crate::error::TariffError;

/// Category of consumer a bill is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumerType {
    Residential,
    Commercial,
    Industrial,
}

impl ConsumerType {
    /// Lower-case wire name, also used in URL paths
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumerType::Residential => "residential",
            ConsumerType::Commercial => "commercial",
            ConsumerType::Industrial => "industrial",
        }
    }

    /// The rate scope matching exactly this consumer type
    pub fn scope(&self) -> RateScope {
        match self {
            ConsumerType::Residential => RateScope::Residential,
            ConsumerType::Commercial => RateScope::Commercial,
            ConsumerType::Industrial => RateScope::Industrial,
        }
    }
}

impl fmt::Display for ConsumerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsumerType {
    type Err = TariffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "residential" => Ok(ConsumerType::Residential),
            "commercial" => Ok(ConsumerType::Commercial),
            "industrial" => Ok(ConsumerType::Industrial),
            other => Err(TariffError::validation(format!("Unknown consumer type: {}", other))),
        }
    }
}

/// Which consumers a rate entry applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateScope {
    Residential,
    Commercial,
    Industrial,
    #[default]
    All,
}

impl RateScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateScope::Residential => "residential",
            RateScope::Commercial => "commercial",
            RateScope::Industrial => "industrial",
            RateScope::All => "all",
        }
    }

    /// Returns true if entries with this scope apply to the consumer type
    pub fn covers(&self, consumer_type: ConsumerType) -> bool {
        matches!(self, RateScope::All) || *self == consumer_type.scope()
    }
}

/// What a rate entry prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    /// Flat unit price carrying its own VAT and service charge
    #[default]
    BaseRate,
    /// Applied after the base amount; a percentage unless stated otherwise
    Tax,
    /// Added charge, fixed unless stated otherwise
    Surcharge,
    /// One consumption band of a tiered schedule
    TierRate,
}

impl RateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateKind::BaseRate => "base_rate",
            RateKind::Tax => "tax",
            RateKind::Surcharge => "surcharge",
            RateKind::TierRate => "tier_rate",
        }
    }
}

/// How a rate entry's value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Price per kWh consumed
    PerKwh,
    /// Percentage of the base amount
    Percentage,
    /// Fixed amount per bill
    Fixed,
}

/// A persisted rate entry
///
/// Which fields matter depends on `kind`: tier bounds only for tier rates,
/// VAT and service charge only for flat base rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub id: RateEntryId,
    pub name: String,
    pub kind: RateKind,
    /// Unit price, percentage points or fixed amount, per `value_kind`
    pub value: Decimal,
    /// Absent means the kind's default interpretation
    pub value_kind: Option<ValueKind>,
    pub scope: RateScope,
    /// Lower band bound, inclusive
    pub tier_min_units: Decimal,
    /// Upper band bound; `None` leaves the band open-ended
    pub tier_max_units: Option<Decimal>,
    /// VAT in whole points
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

impl RateEntry {
    /// Builds a new entry from a validated creation request
    ///
    /// # Arguments
    ///
    /// * `request` - Entry fields; missing optional values take their defaults
    /// * `created_by` - Authoring admin, if known
    /// * `now` - Creation and update timestamp
    ///
    /// # Errors
    ///
    /// * `TariffError::Validation` for an empty name or inverted tier bounds
    /// * `TariffError::Money` for negative amounts
    /// * `TariffError::Temporal` for an effective window that ends before it starts
    pub fn create(
        request: NewRateEntry,
        created_by: Option<AdminId>,
        now: DateTime<Utc>,
    ) -> Result<Self, TariffError> {
        request.validate()?;

        Ok(Self {
            id: RateEntryId::new(),
            name: request.name.trim().to_string(),
            kind: request.kind,
            value: request.value,
            value_kind: request.value_kind,
            scope: request.scope.unwrap_or_default(),
            tier_min_units: request.tier_min_units.unwrap_or(Decimal::ZERO),
            tier_max_units: request.tier_max_units,
            vat_percentage: request.vat_percentage.unwrap_or(Decimal::ZERO),
            fixed_service_charge: request.fixed_service_charge.unwrap_or(Decimal::ZERO),
            description: request.description,
            is_active: request.is_active.unwrap_or(true),
            effective_from: request.effective_from,
            effective_to: request.effective_to,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// The calendar window in which this entry applies
    pub fn window(&self) -> EffectiveWindow {
        EffectiveWindow {
            from: self.effective_from,
            to: self.effective_to,
        }
    }

    /// Returns true if the entry is active and in effect on the given date
    pub fn is_in_effect(&self, date: NaiveDate) -> bool {
        // Entries without a start date are excluded from windowed queries
        self.is_active && self.effective_from.is_some() && self.window().contains(date)
    }

    /// Applies a partial update and re-validates the result
    ///
    /// The entry is left untouched when the merged result is invalid.
    pub fn apply(&mut self, changes: RateEntryChanges, now: DateTime<Utc>) -> Result<(), TariffError> {
        let mut updated = self.clone();

        if let Some(name) = changes.name {
            updated.name = name.trim().to_string();
        }
        if let Some(kind) = changes.kind {
            updated.kind = kind;
        }
        if let Some(value) = changes.value {
            updated.value = value;
        }
        if let Some(value_kind) = changes.value_kind {
            updated.value_kind = value_kind;
        }
        if let Some(scope) = changes.scope {
            updated.scope = scope;
        }
        if let Some(min) = changes.tier_min_units {
            updated.tier_min_units = min;
        }
        if let Some(max) = changes.tier_max_units {
            updated.tier_max_units = max;
        }
        if let Some(vat) = changes.vat_percentage {
            updated.vat_percentage = vat;
        }
        if let Some(charge) = changes.fixed_service_charge {
            updated.fixed_service_charge = charge;
        }
        if let Some(description) = changes.description {
            updated.description = description;
        }
        if let Some(active) = changes.is_active {
            updated.is_active = active;
        }
        if let Some(from) = changes.effective_from {
            updated.effective_from = from;
        }
        if let Some(to) = changes.effective_to {
            updated.effective_to = to;
        }

        updated.check_invariants()?;
        updated.updated_at = now;
        *self = updated;
        Ok(())
    }

    /// Flips the active flag
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.is_active = !self.is_active;
        self.updated_at = now;
    }

    fn check_invariants(&self) -> Result<(), TariffError> {
        validate_fields(
            &self.name,
            self.value,
            Some(self.tier_min_units),
            self.tier_max_units,
            Some(self.vat_percentage),
            Some(self.fixed_service_charge),
            self.effective_from,
            self.effective_to,
        )
    }
}

/// Request to create a rate entry
#[derive(Debug, Clone, Default)]
pub struct NewRateEntry {
    pub name: String,
    pub kind: RateKind,
    pub value: Decimal,
    pub value_kind: Option<ValueKind>,
    pub scope: Option<RateScope>,
    pub tier_min_units: Option<Decimal>,
    pub tier_max_units: Option<Decimal>,
    pub vat_percentage: Option<Decimal>,
    pub fixed_service_charge: Option<Decimal>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
}

impl NewRateEntry {
    /// Validates field ranges and cross-field constraints
    pub fn validate(&self) -> Result<(), TariffError> {
        validate_fields(
            &self.name,
            self.value,
            self.tier_min_units,
            self.tier_max_units,
            self.vat_percentage,
            self.fixed_service_charge,
            self.effective_from,
            self.effective_to,
        )
    }
}

/// Partial update of a rate entry
///
/// Nullable fields use a nested option: `Some(None)` clears the field.
#[derive(Debug, Clone, Default)]
pub struct RateEntryChanges {
    pub name: Option<String>,
    pub kind: Option<RateKind>,
    pub value: Option<Decimal>,
    pub value_kind: Option<Option<ValueKind>>,
    pub scope: Option<RateScope>,
    pub tier_min_units: Option<Decimal>,
    pub tier_max_units: Option<Option<Decimal>>,
    pub vat_percentage: Option<Decimal>,
    pub fixed_service_charge: Option<Decimal>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub effective_from: Option<Option<NaiveDate>>,
    pub effective_to: Option<Option<NaiveDate>>,
}

#[allow(clippy::too_many_arguments)]
fn validate_fields(
    name: &str,
    value: Decimal,
    tier_min: Option<Decimal>,
    tier_max: Option<Decimal>,
    vat: Option<Decimal>,
    surcharge: Option<Decimal>,
    effective_from: Option<NaiveDate>,
    effective_to: Option<NaiveDate>,
) -> Result<(), TariffError> {
    if name.trim().is_empty() {
        return Err(TariffError::validation("Rate name must not be empty"));
    }

    ensure_non_negative(value, "value")?;
    for (field, amount) in [
        ("tier_min_units", tier_min),
        ("tier_max_units", tier_max),
        ("vat_percentage", vat),
        ("fixed_service_charge", surcharge),
    ] {
        if let Some(amount) = amount {
            ensure_non_negative(amount, field)?;
        }
    }

    if let (Some(min), Some(max)) = (tier_min, tier_max) {
        if max < min {
            return Err(TariffError::validation(format!(
                "tier_max_units ({}) must not be below tier_min_units ({})",
                max, min
            )));
        }
    }

    EffectiveWindow::new(effective_from, effective_to)?;
    Ok(())
}
