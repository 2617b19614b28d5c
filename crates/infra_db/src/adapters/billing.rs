//! PostgreSQL Bill History Adapter
//!
//! Implements `BillHistoryPort` over `BillRecordRepository`. Billing months
//! are stored as `YYYY-MM` text and parsed back on read; a stored month
//! that no longer parses surfaces as `PortError::Transformation`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{BillRecordId, BillingMonth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_billing::{BillHistoryPort, BillRecord, MonthlyAggregate};
use domain_tariff::ConsumerType;

use crate::error::DatabaseError;
use crate::repositories::bill_records::{
    BillRecordRepository, BillRecordRow, ConsumerType as DbConsumerType, MonthlyAggregateRow,
};

/// PostgreSQL-backed implementation of `BillHistoryPort`
///
/// Records are insert-only; the adapter offers no update or delete path.
#[derive(Debug, Clone)]
pub struct PostgresBillHistoryAdapter {
    repository: BillRecordRepository,
    pool: PgPool,
}

impl PostgresBillHistoryAdapter {
    /// Creates an adapter over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BillRecordRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresBillHistoryAdapter {}

#[async_trait]
impl HealthCheckable for PostgresBillHistoryAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-bill-history-adapter").await
    }
}

#[async_trait]
impl BillHistoryPort for PostgresBillHistoryAdapter {
    #[instrument(skip(self, record), fields(record_id = %record.id))]
    async fn insert(&self, record: &BillRecord) -> Result<(), PortError> {
        self.repository.insert(&record_to_row(record)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(record_id = %id))]
    async fn get(&self, id: BillRecordId) -> Result<BillRecord, PortError> {
        match self.repository.get(*id.as_uuid()).await {
            Ok(row) => Ok(row_to_record(row)?),
            Err(e) if e.is_not_found() => Err(PortError::not_found("BillRecord", id)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn list_page(&self, offset: u64, limit: u32) -> Result<(Vec<BillRecord>, u64), PortError> {
        let offset = i64::try_from(offset)
            .map_err(|_| PortError::validation_field("Page offset out of range", "page"))?;
        let (rows, total) = self.repository.list_page(offset, i64::from(limit)).await?;
        debug!(count = rows.len(), total, "Fetched bill history page");

        let records = rows
            .into_iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, total.max(0) as u64))
    }

    #[instrument(skip(self))]
    async fn list_by_consumer(&self, consumer_id: &str) -> Result<Vec<BillRecord>, PortError> {
        let rows = self.repository.list_by_consumer(consumer_id).await?;
        Ok(rows
            .into_iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()?)
    }

    #[instrument(skip(self), fields(month = %month))]
    async fn monthly_aggregate(&self, month: BillingMonth) -> Result<Vec<MonthlyAggregate>, PortError> {
        let rows = self.repository.monthly_aggregate(&month.to_string()).await?;
        Ok(rows.into_iter().map(row_to_aggregate).collect())
    }
}

fn record_to_row(record: &BillRecord) -> BillRecordRow {
    BillRecordRow {
        id: *record.id.as_uuid(),
        consumer_name: record.consumer_name.clone(),
        consumer_id: record.consumer_id.clone(),
        consumer_type: record.consumer_type.into(),
        units_consumed: record.units_consumed,
        base_amount: record.base_amount,
        tax_amount: record.tax_amount,
        surcharge_amount: record.surcharge_amount,
        total_amount: record.total_amount,
        billing_month: record.billing_month.to_string(),
        rate_breakdown: record.rate_breakdown.clone(),
        applied_rates: record.applied_rates.clone(),
        created_at: record.created_at,
    }
}

fn row_to_record(row: BillRecordRow) -> Result<BillRecord, DatabaseError> {
    let billing_month = row
        .billing_month
        .trim()
        .parse::<BillingMonth>()
        .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

    Ok(BillRecord {
        id: BillRecordId::from_uuid(row.id),
        consumer_name: row.consumer_name,
        consumer_id: row.consumer_id,
        consumer_type: row.consumer_type.into(),
        units_consumed: row.units_consumed,
        base_amount: row.base_amount,
        tax_amount: row.tax_amount,
        surcharge_amount: row.surcharge_amount,
        total_amount: row.total_amount,
        billing_month,
        rate_breakdown: row.rate_breakdown,
        applied_rates: row.applied_rates,
        created_at: row.created_at,
    })
}

fn row_to_aggregate(row: MonthlyAggregateRow) -> MonthlyAggregate {
    MonthlyAggregate {
        consumer_type: row.consumer_type.into(),
        count: row.count,
        total_units: row.total_units,
        total_revenue: row.total_revenue,
    }
}

impl From<ConsumerType> for DbConsumerType {
    fn from(consumer_type: ConsumerType) -> Self {
        match consumer_type {
            ConsumerType::Residential => DbConsumerType::Residential,
            ConsumerType::Commercial => DbConsumerType::Commercial,
            ConsumerType::Industrial => DbConsumerType::Industrial,
        }
    }
}

impl From<DbConsumerType> for ConsumerType {
    fn from(consumer_type: DbConsumerType) -> Self {
        match consumer_type {
            DbConsumerType::Residential => ConsumerType::Residential,
            DbConsumerType::Commercial => ConsumerType::Commercial,
            DbConsumerType::Industrial => ConsumerType::Industrial,
        }
    }
}
