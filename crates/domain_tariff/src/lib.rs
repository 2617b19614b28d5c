//! Tariff Domain
//!
//! This crate manages the billing rate configuration:
//!
//! - Rate entries (flat prices, tier bands, taxes and surcharges)
//! - Effective-rate lookup with a time-boxed in-process cache
//! - Consumer-type scoped rate queries for tiered pricing
//! - The `RateEntryPort` storage boundary

pub mod cache;
pub mod effective_rate;
pub mod error;
pub mod ports;
pub mod rate_entry;
pub mod store;

pub use cache::{CacheLookup, RateCache, RateEvent, DEFAULT_RATE_CACHE_TTL};
pub use effective_rate::EffectiveRate;
pub use error::TariffError;
pub use ports::{RateEntryPort, RateEntryQuery, RateOrder};
pub use rate_entry::{ConsumerType, NewRateEntry, RateEntry, RateEntryChanges, RateKind, RateScope, ValueKind};
pub use store::{RateConfigStore, TaxesAndSurcharges, FLAT_RATE_NAME};

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockRateEntryPort;
