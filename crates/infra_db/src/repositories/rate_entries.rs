//! Rate entry repository
//!
//! SQL access for `rate_entries`. Listing filters are assembled with a
//! `QueryBuilder` since every filter of a `RateEntryQuery` is optional.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use domain_tariff::{RateEntryQuery, RateOrder};

use crate::error::DatabaseError;

const RATE_ENTRY_COLUMNS: &str = r#"
    id, name, kind, value, value_kind, scope, tier_min_units, tier_max_units,
    vat_percentage, fixed_service_charge, description, is_active,
    effective_from, effective_to, created_by, created_at, updated_at
"#;

/// Repository for administrator-maintained rate entries
#[derive(Debug, Clone)]
pub struct RateEntryRepository {
    pool: PgPool,
}

impl RateEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, row: &RateEntryRow) -> Result<(), DatabaseError> {
        insert_row(&self.pool, row).await
    }

    pub async fn get(&self, id: Uuid) -> Result<RateEntryRow, DatabaseError> {
        sqlx::query_as::<_, RateEntryRow>(&format!(
            "SELECT {} FROM rate_entries WHERE id = $1",
            RATE_ENTRY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("RateEntry", id))
    }

    /// Overwrites every mutable column of an existing entry
    pub async fn update(&self, row: &RateEntryRow) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE rate_entries SET
                name = $2,
                kind = $3,
                value = $4,
                value_kind = $5,
                scope = $6,
                tier_min_units = $7,
                tier_max_units = $8,
                vat_percentage = $9,
                fixed_service_charge = $10,
                description = $11,
                is_active = $12,
                effective_from = $13,
                effective_to = $14,
                updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(row.kind)
        .bind(row.value)
        .bind(row.value_kind)
        .bind(row.scope)
        .bind(row.tier_min_units)
        .bind(row.tier_max_units)
        .bind(row.vat_percentage)
        .bind(row.fixed_service_charge)
        .bind(&row.description)
        .bind(row.is_active)
        .bind(row.effective_from)
        .bind(row.effective_to)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("RateEntry", row.id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM rate_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("RateEntry", id));
        }
        Ok(())
    }

    /// Lists entries matching every filter of the query
    ///
    /// Entries without a start date never match a date filter.
    ///
    /// # Arguments
    ///
    /// * `query` - Optional kind, scope, activity and date filters plus the ordering
    ///
    /// # Returns
    ///
    /// Matching rows in the order the query names
    pub async fn list(&self, query: &RateEntryQuery) -> Result<Vec<RateEntryRow>, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM rate_entries WHERE TRUE",
            RATE_ENTRY_COLUMNS
        ));

        if let Some(active) = query.active {
            builder.push(" AND is_active = ").push_bind(active);
        }
        if !query.kinds.is_empty() {
            let kinds: Vec<String> = query.kinds.iter().map(|k| k.as_str().to_string()).collect();
            builder.push(" AND kind::text = ANY(").push_bind(kinds).push(")");
        }
        if !query.scopes.is_empty() {
            let scopes: Vec<String> = query.scopes.iter().map(|s| s.as_str().to_string()).collect();
            builder.push(" AND scope::text = ANY(").push_bind(scopes).push(")");
        }
        if let Some(date) = query.effective_on {
            builder
                .push(" AND effective_from IS NOT NULL AND effective_from <= ")
                .push_bind(date)
                .push(" AND (effective_to IS NULL OR effective_to >= ")
                .push_bind(date)
                .push(")");
        }

        builder.push(match query.order {
            RateOrder::NewestFirst => " ORDER BY created_at DESC, id DESC",
            RateOrder::ScopeThenTier => " ORDER BY scope::text ASC, tier_min_units ASC",
            RateOrder::TierAscending => " ORDER BY tier_min_units ASC",
        });

        let rows = builder
            .build_query_as::<RateEntryRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// The most recently created active entry, ties broken by ID
    pub async fn latest_active(&self) -> Result<Option<RateEntryRow>, DatabaseError> {
        let row = sqlx::query_as::<_, RateEntryRow>(&format!(
            "SELECT {} FROM rate_entries WHERE is_active ORDER BY created_at DESC, id DESC LIMIT 1",
            RATE_ENTRY_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Deactivates all active entries and inserts the new one in one transaction
    ///
    /// # Arguments
    ///
    /// * `row` - The replacement entry; its `created_at` stamps the deactivations
    ///
    /// # Returns
    ///
    /// The number of entries that were deactivated
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::TransactionFailed` if the transaction cannot be
    /// opened or committed; nothing is changed in that case
    pub async fn replace_active(&self, row: &RateEntryRow) -> Result<u64, DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        let deactivated = sqlx::query(
            "UPDATE rate_entries SET is_active = FALSE, updated_at = $1 WHERE is_active",
        )
        .bind(row.created_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        insert_row(&mut *tx, row).await?;

        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(deactivated)
    }
}

async fn insert_row<'e, E>(executor: E, row: &RateEntryRow) -> Result<(), DatabaseError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO rate_entries (
            id, name, kind, value, value_kind, scope, tier_min_units, tier_max_units,
            vat_percentage, fixed_service_charge, description, is_active,
            effective_from, effective_to, created_by, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        "#,
    )
    .bind(row.id)
    .bind(&row.name)
    .bind(row.kind)
    .bind(row.value)
    .bind(row.value_kind)
    .bind(row.scope)
    .bind(row.tier_min_units)
    .bind(row.tier_max_units)
    .bind(row.vat_percentage)
    .bind(row.fixed_service_charge)
    .bind(&row.description)
    .bind(row.is_active)
    .bind(row.effective_from)
    .bind(row.effective_to)
    .bind(row.created_by)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

// Row types

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RateEntryRow {
    pub id: Uuid,
    pub name: String,
    pub kind: RateKind,
    pub value: Decimal,
    pub value_kind: Option<ValueKind>,
    pub scope: RateScope,
    pub tier_min_units: Decimal,
    pub tier_max_units: Option<Decimal>,
    pub vat_percentage: Decimal,
    pub fixed_service_charge: Decimal,
    pub description: Option<String>,
    pub is_active: bool,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Database enum types

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "rate_kind", rename_all = "snake_case")]
pub enum RateKind {
    BaseRate,
    Tax,
    Surcharge,
    TierRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "value_kind", rename_all = "snake_case")]
pub enum ValueKind {
    PerKwh,
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "rate_scope", rename_all = "snake_case")]
pub enum RateScope {
    Residential,
    Commercial,
    Industrial,
    All,
}
