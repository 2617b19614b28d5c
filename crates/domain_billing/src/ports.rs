//! Billing Domain Ports
//!
//! `BillHistoryPort` stores bill records. The PostgreSQL adapter lives in
//! `infra_db`; an in-memory adapter is available behind the `mock` feature.

use async_trait::async_trait;

use core_kernel::{BillRecordId, BillingMonth, DomainPort, HealthCheckable, PortError};

use crate::record::{BillRecord, MonthlyAggregate};

/// Storage port for bill records
#[async_trait]
pub trait BillHistoryPort: DomainPort + HealthCheckable {
    /// Persists a new record
    async fn insert(&self, record: &BillRecord) -> Result<(), PortError>;

    /// Retrieves a record by ID, or `PortError::NotFound`
    async fn get(&self, id: BillRecordId) -> Result<BillRecord, PortError>;

    /// Returns `limit` records newest first after skipping `offset`, with the total count
    async fn list_page(&self, offset: u64, limit: u32) -> Result<(Vec<BillRecord>, u64), PortError>;

    /// Every record for a consumer, newest first
    async fn list_by_consumer(&self, consumer_id: &str) -> Result<Vec<BillRecord>, PortError>;

    /// Per-consumer-type count, units and revenue for an exact billing month
    async fn monthly_aggregate(&self, month: BillingMonth) -> Result<Vec<MonthlyAggregate>, PortError>;
}

/// In-memory implementation of BillHistoryPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};
    use domain_tariff::ConsumerType;

    /// Records kept in insertion order behind a lock
    #[derive(Debug, Default)]
    pub struct MockBillHistoryPort {
        records: Arc<RwLock<Vec<BillRecord>>>,
        fail_next_insert: AtomicBool,
    }

    impl MockBillHistoryPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with records for testing
        pub async fn with_records(records: Vec<BillRecord>) -> Self {
            let port = Self::new();
            port.records.write().await.extend(records);
            port
        }

        /// Makes the next insert fail with a connection error
        pub fn fail_next_insert(&self) {
            self.fail_next_insert.store(true, Ordering::SeqCst);
        }

        pub async fn count(&self) -> usize {
            self.records.read().await.len()
        }

        async fn newest_first(&self) -> Vec<BillRecord> {
            let mut records = self.records.read().await.clone();
            records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            records
        }
    }

    impl DomainPort for MockBillHistoryPort {}

    #[async_trait]
    impl HealthCheckable for MockBillHistoryPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-bill-history-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl BillHistoryPort for MockBillHistoryPort {
        async fn insert(&self, record: &BillRecord) -> Result<(), PortError> {
            if self.fail_next_insert.swap(false, Ordering::SeqCst) {
                return Err(PortError::connection("mock storage unavailable"));
            }
            self.records.write().await.push(record.clone());
            Ok(())
        }

        async fn get(&self, id: BillRecordId) -> Result<BillRecord, PortError> {
            self.records
                .read()
                .await
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("BillRecord", id))
        }

        async fn list_page(&self, offset: u64, limit: u32) -> Result<(Vec<BillRecord>, u64), PortError> {
            let records = self.newest_first().await;
            let total = records.len() as u64;
            let page = records
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect();
            Ok((page, total))
        }

        async fn list_by_consumer(&self, consumer_id: &str) -> Result<Vec<BillRecord>, PortError> {
            Ok(self
                .newest_first()
                .await
                .into_iter()
                .filter(|r| r.consumer_id.as_deref() == Some(consumer_id))
                .collect())
        }

        async fn monthly_aggregate(&self, month: BillingMonth) -> Result<Vec<MonthlyAggregate>, PortError> {
            let records = self.records.read().await;
            let mut groups: BTreeMap<ConsumerType, MonthlyAggregate> = BTreeMap::new();
            for record in records.iter().filter(|r| r.billing_month == month) {
                let group = groups.entry(record.consumer_type).or_insert(MonthlyAggregate {
                    consumer_type: record.consumer_type,
                    count: 0,
                    total_units: Decimal::ZERO,
                    total_revenue: Decimal::ZERO,
                });
                group.count += 1;
                group.total_units += record.units_consumed;
                group.total_revenue += record.total_amount;
            }
            Ok(groups.into_values().collect())
        }
    }
}
