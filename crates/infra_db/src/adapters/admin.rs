//! PostgreSQL Admin Adapter
//!
//! Implements `AdminPort` over `AdminRepository`. Password hashes are stored
//! as produced by the domain and never inspected here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{AdminId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_admin::{Admin, AdminPort, AdminRole};

use crate::repositories::admins::{AdminRepository, AdminRole as DbAdminRole, AdminRow};

/// PostgreSQL-backed implementation of `AdminPort`
#[derive(Debug, Clone)]
pub struct PostgresAdminAdapter {
    repository: AdminRepository,
    pool: PgPool,
}

impl PostgresAdminAdapter {
    /// Creates an adapter over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: AdminRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresAdminAdapter {}

#[async_trait]
impl HealthCheckable for PostgresAdminAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-admin-adapter").await
    }
}

#[async_trait]
impl AdminPort for PostgresAdminAdapter {
    #[instrument(skip(self, admin), fields(username = %admin.username))]
    async fn insert(&self, admin: &Admin) -> Result<(), PortError> {
        self.repository.insert(&admin_to_row(admin)).await?;
        Ok(())
    }

    #[instrument(skip(self, admin), fields(username = %admin.username))]
    async fn insert_first(&self, admin: &Admin) -> Result<bool, PortError> {
        Ok(self.repository.insert_first(&admin_to_row(admin)).await?)
    }

    async fn get(&self, id: AdminId) -> Result<Admin, PortError> {
        match self.repository.get(*id.as_uuid()).await {
            Ok(row) => Ok(row_to_admin(row)),
            Err(e) if e.is_not_found() => Err(PortError::not_found("Admin", id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, PortError> {
        Ok(self.repository.find_by_username(username).await?.map(row_to_admin))
    }

    async fn exists(&self, username: &str, email: &str) -> Result<bool, PortError> {
        Ok(self.repository.exists(username, email).await?)
    }

    async fn count(&self) -> Result<u64, PortError> {
        Ok(self.repository.count().await?.max(0) as u64)
    }

    #[instrument(skip(self), fields(admin_id = %id))]
    async fn record_login(&self, id: AdminId, at: DateTime<Utc>) -> Result<(), PortError> {
        match self.repository.record_login(*id.as_uuid(), at).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Err(PortError::not_found("Admin", id)),
            Err(e) => Err(e.into()),
        }
    }
}

fn admin_to_row(admin: &Admin) -> AdminRow {
    AdminRow {
        id: *admin.id.as_uuid(),
        username: admin.username.clone(),
        email: admin.email.clone(),
        password_hash: admin.password_hash.clone(),
        full_name: admin.full_name.clone(),
        role: match admin.role {
            AdminRole::Admin => DbAdminRole::Admin,
            AdminRole::SuperAdmin => DbAdminRole::SuperAdmin,
        },
        is_active: admin.is_active,
        last_login: admin.last_login,
        created_at: admin.created_at,
        updated_at: admin.updated_at,
    }
}

fn row_to_admin(row: AdminRow) -> Admin {
    Admin {
        id: AdminId::from_uuid(row.id),
        username: row.username,
        email: row.email,
        password_hash: row.password_hash,
        full_name: row.full_name,
        role: match row.role {
            DbAdminRole::Admin => AdminRole::Admin,
            DbAdminRole::SuperAdmin => AdminRole::SuperAdmin,
        },
        is_active: row.is_active,
        last_login: row.last_login,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
