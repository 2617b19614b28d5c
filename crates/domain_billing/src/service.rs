//! Billing service
//!
//! Orchestrates a calculation: fetch rates, compute the breakdown, record it.
//! A calculation whose record cannot be written is reported as failed.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use domain_tariff::RateConfigStore;

use crate::breakdown::BillBreakdown;
use crate::calculator::{BillCalculator, BillRequest, TieredSchedule};
use crate::error::BillingError;
use crate::history::HistoryRecorder;

/// Which pricing model the calculator applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// One unit price with VAT and a fixed service charge
    #[default]
    Flat,
    /// Consumer-type tier bands with configured taxes and surcharges
    Tiered,
}

impl fmt::Display for PricingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingMode::Flat => f.write_str("flat"),
            PricingMode::Tiered => f.write_str("tiered"),
        }
    }
}

impl FromStr for PricingMode {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(PricingMode::Flat),
            "tiered" => Ok(PricingMode::Tiered),
            other => Err(BillingError::Validation(format!("Unknown pricing mode: {}", other))),
        }
    }
}

/// Computes and records bills
pub struct BillingService {
    rates: Arc<RateConfigStore>,
    history: Arc<HistoryRecorder>,
    calculator: BillCalculator,
    mode: PricingMode,
}

impl BillingService {
    /// Creates a flat-pricing service
    ///
    /// # Arguments
    ///
    /// * `rates` - Source of the effective rate and tier schedules; its timezone
    ///   also decides the default billing month
    /// * `history` - Where every successful calculation is recorded
    pub fn new(rates: Arc<RateConfigStore>, history: Arc<HistoryRecorder>) -> Self {
        let calculator = BillCalculator::new(rates.timezone());
        Self {
            rates,
            history,
            calculator,
            mode: PricingMode::default(),
        }
    }

    /// Selects flat or tiered pricing
    pub fn with_mode(mut self, mode: PricingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> PricingMode {
        self.mode
    }

    pub fn history(&self) -> &HistoryRecorder {
        &self.history
    }

    /// Prices the request and records the result
    ///
    /// A bill that cannot be recorded is not returned.
    ///
    /// # Arguments
    ///
    /// * `request` - Consumption and consumer details
    ///
    /// # Returns
    ///
    /// The breakdown exactly as recorded
    ///
    /// # Errors
    ///
    /// * `BillingError::Validation` for negative or out-of-range units
    /// * `BillingError::Calculation` if an amount overflows
    /// * `BillingError::Tariff` if the rates cannot be read
    /// * `BillingError::Port` or `BillingError::Serialization` if recording fails
    #[instrument(skip(self, request), fields(consumer_type = %request.consumer_type, mode = %self.mode))]
    pub async fn calculate(&self, request: BillRequest) -> Result<BillBreakdown, BillingError> {
        request.validate()?;

        let breakdown = match self.mode {
            PricingMode::Flat => self.calculate_flat(&request).await?,
            PricingMode::Tiered => self.calculate_tiered(&request).await?,
        };

        if let Err(err) = self.history.record(&breakdown).await {
            warn!(error = %err, "Failed to record bill, discarding calculation");
            return Err(err);
        }
        Ok(breakdown)
    }

    async fn calculate_flat(&self, request: &BillRequest) -> Result<BillBreakdown, BillingError> {
        let rate = self.rates.effective_rate().await?;
        self.calculator.flat(request, &rate, Utc::now())
    }

    async fn calculate_tiered(&self, request: &BillRequest) -> Result<BillBreakdown, BillingError> {
        let tiers = self.rates.tier_rates(request.consumer_type).await?;
        if tiers.is_empty() {
            debug!("No tier rates configured, falling back to flat pricing");
            return self.calculate_flat(request).await;
        }

        let charges = self.rates.taxes_and_surcharges(request.consumer_type).await?;
        let schedule = TieredSchedule {
            tiers,
            taxes: charges.taxes,
            surcharges: charges.surcharges,
        };
        self.calculator.tiered(request, &schedule, Utc::now())
    }
}
