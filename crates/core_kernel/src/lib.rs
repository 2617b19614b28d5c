//! Core Kernel - Foundational types and utilities for the billing system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Monetary rounding and percentage arithmetic on `rust_decimal`
//! - Billing months and effective-date windows
//! - Strongly-typed identifiers
//! - Port abstractions shared by every adapter

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{checked_add, checked_mul, ensure_non_negative, round_currency, MoneyError, Percentage, CURRENCY_SCALE};
pub use temporal::{BillingMonth, EffectiveWindow, Timezone, TemporalError};
pub use identifiers::{RateEntryId, BillRecordId, AdminId};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
pub use error::CoreError;
