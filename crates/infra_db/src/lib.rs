//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the billing service using SQLx:
//!
//! - `pool`: connection pool configuration and migrations
//! - `repositories`: table-level SQL returning row types
//! - `adapters`: domain port implementations over the repositories
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/voltbill")).await?;
//! run_migrations(&pool).await?;
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PostgresAdminAdapter, PostgresBillHistoryAdapter, PostgresRateEntryAdapter};
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
