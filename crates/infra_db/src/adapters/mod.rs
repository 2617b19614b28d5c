//! Domain Adapters
//!
//! PostgreSQL implementations of the domain ports. Each adapter wraps a
//! repository, converts rows to domain types and reports database
//! connectivity through `HealthCheckable`.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_tariff::{RateConfigStore, RateEntryPort};
//! use infra_db::adapters::PostgresRateEntryAdapter;
//!
//! let port: Arc<dyn RateEntryPort> = Arc::new(PostgresRateEntryAdapter::new(pool));
//! let store = RateConfigStore::new(port);
//! ```

pub mod admin;
pub mod billing;
pub mod tariff;

pub use admin::PostgresAdminAdapter;
pub use billing::PostgresBillHistoryAdapter;
pub use tariff::PostgresRateEntryAdapter;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult};

/// Runs `SELECT 1` against the pool and reports latency
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}
