//! Tariff domain errors

use core_kernel::{MoneyError, PortError, TemporalError};
use thiserror::Error;

/// Errors that can occur in the tariff domain
#[derive(Debug, Error)]
pub enum TariffError {
    /// Rate entry not found
    #[error("Rate entry not found: {0}")]
    RateNotFound(String),

    /// Request failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A monetary field is out of range
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The effective window is malformed
    #[error(transparent)]
    Temporal(#[from] TemporalError),

    /// The storage port failed
    #[error(transparent)]
    Port(PortError),
}

impl TariffError {
    pub fn validation(message: impl Into<String>) -> Self {
        TariffError::Validation(message.into())
    }

    /// Returns true if the error means the entry does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, TariffError::RateNotFound(_))
    }
}

impl From<PortError> for TariffError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { id, .. } => TariffError::RateNotFound(id),
            PortError::Validation { message, .. } => TariffError::Validation(message),
            other => TariffError::Port(other),
        }
    }
}
