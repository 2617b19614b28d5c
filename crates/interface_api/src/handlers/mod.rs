//! Request handlers

pub mod auth;
pub mod calculation;
pub mod health;
pub mod rates;

use std::str::FromStr;

use domain_tariff::ConsumerType;

use crate::error::ApiError;

/// Parses an identifier path segment
pub(crate) fn parse_id<T: FromStr>(raw: &str, entity: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} ID: {}", entity, raw)))
}

/// Parses a consumer type path segment
pub(crate) fn parse_consumer_type(raw: &str) -> Result<ConsumerType, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid consumer type: {}", raw)))
}
