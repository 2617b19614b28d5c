//! Billing domain errors

use core_kernel::{MoneyError, PortError};
use domain_tariff::TariffError;
use thiserror::Error;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Bill record not found
    #[error("Bill record not found: {0}")]
    RecordNotFound(String),

    /// Request failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Calculation could not be performed
    #[error("Calculation error: {0}")]
    Calculation(String),

    /// Breakdown could not be serialized into or read back from a record
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rate lookup failed
    #[error(transparent)]
    Tariff(#[from] TariffError),

    /// The history port failed
    #[error(transparent)]
    Port(PortError),
}

impl BillingError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BillingError::RecordNotFound(_))
    }
}

impl From<MoneyError> for BillingError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::Overflow(_) => BillingError::Calculation(err.to_string()),
            other => BillingError::Validation(other.to_string()),
        }
    }
}

impl From<PortError> for BillingError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { id, .. } => BillingError::RecordNotFound(id),
            PortError::Validation { message, .. } => BillingError::Validation(message),
            other => BillingError::Port(other),
        }
    }
}
