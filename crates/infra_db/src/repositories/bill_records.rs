//! Bill record repository
//!
//! Records are insert-only. Detail JSON is stored as text and decoded by the
//! billing domain, so this layer never inspects it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const BILL_RECORD_COLUMNS: &str = r#"
    id, consumer_name, consumer_id, consumer_type, units_consumed, base_amount,
    tax_amount, surcharge_amount, total_amount, billing_month, rate_breakdown,
    applied_rates, created_at
"#;

/// Repository for the bill history
#[derive(Debug, Clone)]
pub struct BillRecordRepository {
    pool: PgPool,
}

impl BillRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, row: &BillRecordRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO bill_records (
                id, consumer_name, consumer_id, consumer_type, units_consumed, base_amount,
                tax_amount, surcharge_amount, total_amount, billing_month, rate_breakdown,
                applied_rates, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(row.id)
        .bind(&row.consumer_name)
        .bind(&row.consumer_id)
        .bind(row.consumer_type)
        .bind(row.units_consumed)
        .bind(row.base_amount)
        .bind(row.tax_amount)
        .bind(row.surcharge_amount)
        .bind(row.total_amount)
        .bind(&row.billing_month)
        .bind(&row.rate_breakdown)
        .bind(&row.applied_rates)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<BillRecordRow, DatabaseError> {
        sqlx::query_as::<_, BillRecordRow>(&format!(
            "SELECT {} FROM bill_records WHERE id = $1",
            BILL_RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("BillRecord", id))
    }

    /// One page of records, newest first, plus the total record count
    ///
    /// # Arguments
    ///
    /// * `offset` - Rows to skip
    /// * `limit` - Maximum rows to return
    pub async fn list_page(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<BillRecordRow>, i64), DatabaseError> {
        let rows = sqlx::query_as::<_, BillRecordRow>(&format!(
            "SELECT {} FROM bill_records ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            BILL_RECORD_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bill_records")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    pub async fn list_by_consumer(&self, consumer_id: &str) -> Result<Vec<BillRecordRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, BillRecordRow>(&format!(
            "SELECT {} FROM bill_records WHERE consumer_id = $1 ORDER BY created_at DESC, id DESC",
            BILL_RECORD_COLUMNS
        ))
        .bind(consumer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Count, units and revenue per consumer type for one `YYYY-MM` month
    pub async fn monthly_aggregate(&self, month: &str) -> Result<Vec<MonthlyAggregateRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, MonthlyAggregateRow>(
            r#"
            SELECT
                consumer_type,
                COUNT(*) AS count,
                COALESCE(SUM(units_consumed), 0) AS total_units,
                COALESCE(SUM(total_amount), 0) AS total_revenue
            FROM bill_records
            WHERE billing_month = $1
            GROUP BY consumer_type
            ORDER BY consumer_type
            "#,
        )
        .bind(month)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// Row types

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BillRecordRow {
    pub id: Uuid,
    pub consumer_name: Option<String>,
    pub consumer_id: Option<String>,
    pub consumer_type: ConsumerType,
    pub units_consumed: Decimal,
    pub base_amount: Decimal,
    pub tax_amount: Decimal,
    pub surcharge_amount: Decimal,
    pub total_amount: Decimal,
    pub billing_month: String,
    pub rate_breakdown: String,
    pub applied_rates: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthlyAggregateRow {
    pub consumer_type: ConsumerType,
    pub count: i64,
    pub total_units: Decimal,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "consumer_type", rename_all = "snake_case")]
pub enum ConsumerType {
    Residential,
    Commercial,
    Industrial,
}
