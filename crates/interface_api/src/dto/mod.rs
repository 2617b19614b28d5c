//! Request and response bodies

pub mod auth;
pub mod calculation;
pub mod rates;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

/// A calendar date accepted as `YYYY-MM-DD` or as an RFC 3339 timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexibleDate(pub NaiveDate);

impl<'de> Deserialize<'de> for FlexibleDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.date_naive()))
            .map(FlexibleDate)
            .map_err(|_| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Generic message body
#[derive(Debug, serde::Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
