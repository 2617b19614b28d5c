//! Billing Domain
//!
//! This crate turns consumption into bills and keeps their history:
//!
//! - `BillCalculator`: pure flat and tiered pricing with per-amount rounding
//! - `BillingService`: fetches rates, calculates and records in one step
//! - `HistoryRecorder`: immutable bill records, pagination and monthly totals
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{BillingService, BillRequest};
//! use domain_tariff::ConsumerType;
//!
//! let bill = service
//!     .calculate(BillRequest::new(ConsumerType::Residential, dec!(100)))
//!     .await?;
//! assert_eq!(bill.total_amount, dec!(18.80));
//! ```

pub mod breakdown;
pub mod calculator;
pub mod error;
pub mod history;
pub mod ports;
pub mod record;
pub mod service;

pub use breakdown::{AppliedRate, BillBreakdown, ChargeKind, ChargeLine, RateBreakdown, TierLine};
pub use calculator::{BillCalculator, BillRequest, TieredSchedule, MAX_UNITS};
pub use error::BillingError;
pub use history::{HistoryRecorder, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use ports::BillHistoryPort;
pub use record::{BillRecord, HistoryPage, MonthlyAggregate};
pub use service::{BillingService, PricingMode};

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockBillHistoryPort;
