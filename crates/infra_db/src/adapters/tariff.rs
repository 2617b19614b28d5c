//! PostgreSQL Rate Entry Adapter
//!
//! Implements `RateEntryPort` over `RateEntryRepository`. Domain enums map
//! one-to-one onto the Postgres enum types declared next to the row struct.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_tariff::RateEntryPort;
//! use infra_db::adapters::PostgresRateEntryAdapter;
//!
//! let port: Arc<dyn RateEntryPort> = Arc::new(PostgresRateEntryAdapter::new(pool));
//! let latest = port.latest_active().await?;
//! ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{AdminId, DomainPort, HealthCheckResult, HealthCheckable, PortError, RateEntryId};
use domain_tariff::{RateEntry, RateEntryPort, RateEntryQuery, RateKind, RateScope, ValueKind};

use crate::repositories::rate_entries::{
    RateEntryRepository, RateEntryRow, RateKind as DbRateKind, RateScope as DbRateScope,
    ValueKind as DbValueKind,
};

/// PostgreSQL-backed implementation of `RateEntryPort`
///
/// # Error Handling
///
/// Repository errors become `PortError` variants:
/// - a missing row -> `PortError::NotFound` naming the `RateEntry` ID
/// - a unique violation -> `PortError::Conflict`
/// - a check or foreign key violation -> `PortError::Validation`
/// - connection and pool failures -> `PortError::Connection`
#[derive(Debug, Clone)]
pub struct PostgresRateEntryAdapter {
    repository: RateEntryRepository,
    pool: PgPool,
}

impl PostgresRateEntryAdapter {
    /// Creates an adapter over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: RateEntryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Direct access to the repository, for queries the port does not expose
    pub fn repository(&self) -> &RateEntryRepository {
        &self.repository
    }
}

impl DomainPort for PostgresRateEntryAdapter {}

#[async_trait]
impl HealthCheckable for PostgresRateEntryAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-rate-entry-adapter").await
    }
}

#[async_trait]
impl RateEntryPort for PostgresRateEntryAdapter {
    #[instrument(skip(self, entry), fields(rate_id = %entry.id))]
    async fn insert(&self, entry: &RateEntry) -> Result<(), PortError> {
        self.repository.insert(&entry_to_row(entry)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(rate_id = %id))]
    async fn get(&self, id: RateEntryId) -> Result<RateEntry, PortError> {
        match self.repository.get(*id.as_uuid()).await {
            Ok(row) => Ok(row_to_entry(row)),
            Err(e) if e.is_not_found() => Err(PortError::not_found("RateEntry", id)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, entry), fields(rate_id = %entry.id))]
    async fn save(&self, entry: &RateEntry) -> Result<(), PortError> {
        match self.repository.update(&entry_to_row(entry)).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Err(PortError::not_found("RateEntry", entry.id)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(rate_id = %id))]
    async fn delete(&self, id: RateEntryId) -> Result<(), PortError> {
        match self.repository.delete(*id.as_uuid()).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Err(PortError::not_found("RateEntry", id)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn list(&self, query: RateEntryQuery) -> Result<Vec<RateEntry>, PortError> {
        let rows = self.repository.list(&query).await?;
        debug!(count = rows.len(), "Listed rate entries");
        Ok(rows.into_iter().map(row_to_entry).collect())
    }

    async fn latest_active(&self) -> Result<Option<RateEntry>, PortError> {
        Ok(self.repository.latest_active().await?.map(row_to_entry))
    }

    #[instrument(skip(self, entry), fields(rate_id = %entry.id))]
    async fn replace_active(&self, entry: &RateEntry) -> Result<(), PortError> {
        let deactivated = self.repository.replace_active(&entry_to_row(entry)).await?;
        debug!(deactivated, "Replaced active rate entries");
        Ok(())
    }
}

fn entry_to_row(entry: &RateEntry) -> RateEntryRow {
    RateEntryRow {
        id: *entry.id.as_uuid(),
        name: entry.name.clone(),
        kind: entry.kind.into(),
        value: entry.value,
        value_kind: entry.value_kind.map(Into::into),
        scope: entry.scope.into(),
        tier_min_units: entry.tier_min_units,
        tier_max_units: entry.tier_max_units,
        vat_percentage: entry.vat_percentage,
        fixed_service_charge: entry.fixed_service_charge,
        description: entry.description.clone(),
        is_active: entry.is_active,
        effective_from: entry.effective_from,
        effective_to: entry.effective_to,
        created_by: entry.created_by.map(|id| *id.as_uuid()),
        created_at: entry.created_at,
        updated_at: entry.updated_at,
    }
}

fn row_to_entry(row: RateEntryRow) -> RateEntry {
    RateEntry {
        id: RateEntryId::from_uuid(row.id),
        name: row.name,
        kind: row.kind.into(),
        value: row.value,
        value_kind: row.value_kind.map(Into::into),
        scope: row.scope.into(),
        tier_min_units: row.tier_min_units,
        tier_max_units: row.tier_max_units,
        vat_percentage: row.vat_percentage,
        fixed_service_charge: row.fixed_service_charge,
        description: row.description,
        is_active: row.is_active,
        effective_from: row.effective_from,
        effective_to: row.effective_to,
        created_by: row.created_by.map(AdminId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

impl From<RateKind> for DbRateKind {
    fn from(kind: RateKind) -> Self {
        match kind {
            RateKind::BaseRate => DbRateKind::BaseRate,
            RateKind::Tax => DbRateKind::Tax,
            RateKind::Surcharge => DbRateKind::Surcharge,
            RateKind::TierRate => DbRateKind::TierRate,
        }
    }
}

impl From<DbRateKind> for RateKind {
    fn from(kind: DbRateKind) -> Self {
        match kind {
            DbRateKind::BaseRate => RateKind::BaseRate,
            DbRateKind::Tax => RateKind::Tax,
            DbRateKind::Surcharge => RateKind::Surcharge,
            DbRateKind::TierRate => RateKind::TierRate,
        }
    }
}

impl From<ValueKind> for DbValueKind {
    fn from(kind: ValueKind) -> Self {
        match kind {
            ValueKind::PerKwh => DbValueKind::PerKwh,
            ValueKind::Percentage => DbValueKind::Percentage,
            ValueKind::Fixed => DbValueKind::Fixed,
        }
    }
}

impl From<DbValueKind> for ValueKind {
    fn from(kind: DbValueKind) -> Self {
        match kind {
            DbValueKind::PerKwh => ValueKind::PerKwh,
            DbValueKind::Percentage => ValueKind::Percentage,
            DbValueKind::Fixed => ValueKind::Fixed,
        }
    }
}

impl From<RateScope> for DbRateScope {
    fn from(scope: RateScope) -> Self {
        match scope {
            RateScope::Residential => DbRateScope::Residential,
            RateScope::Commercial => DbRateScope::Commercial,
            RateScope::Industrial => DbRateScope::Industrial,
            RateScope::All => DbRateScope::All,
        }
    }
}

impl From<DbRateScope> for RateScope {
    fn from(scope: DbRateScope) -> Self {
        match scope {
            DbRateScope::Residential => RateScope::Residential,
            DbRateScope::Commercial => RateScope::Commercial,
            DbRateScope::Industrial => RateScope::Industrial,
            DbRateScope::All => RateScope::All,
        }
    }
}
