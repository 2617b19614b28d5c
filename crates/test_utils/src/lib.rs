//! Test Utilities Crate
//!
//! Shared test infrastructure for the billing service test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built rate schedules, admins and consumers
//! - `builders`: Builder patterns for rate entries and bill records
//! - `database`: PostgreSQL test containers
//! - `assertions`: Money and breakdown assertions
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
