//! Administrator repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const ADMIN_COLUMNS: &str = r#"
    id, username, email, password_hash, full_name, role, is_active,
    last_login, created_at, updated_at
"#;

#[derive(Debug, Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts an admin; a taken username or email yields `DuplicateEntry`
    pub async fn insert(&self, row: &AdminRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO admins (
                id, username, email, password_hash, full_name, role, is_active,
                last_login, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(row.id)
        .bind(&row.username)
        .bind(&row.email)
        .bind(&row.password_hash)
        .bind(&row.full_name)
        .bind(row.role)
        .bind(row.is_active)
        .bind(row.last_login)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;
        Ok(())
    }

    /// Inserts an admin only while the table is empty
    ///
    /// The table is locked against concurrent writers for the duration of the
    /// transaction, so two bootstrap registrations are serialized and the
    /// second one sees the first.
    ///
    /// # Arguments
    ///
    /// * `row` - The admin to store
    ///
    /// # Returns
    ///
    /// `true` if the row was inserted, `false` if any admin already existed
    pub async fn insert_first(&self, row: &AdminRow) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("LOCK TABLE admins IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO admins (
                id, username, email, password_hash, full_name, role, is_active,
                last_login, created_at, updated_at
            )
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10
            WHERE NOT EXISTS (SELECT 1 FROM admins)
            "#,
        )
        .bind(row.id)
        .bind(&row.username)
        .bind(&row.email)
        .bind(&row.password_hash)
        .bind(&row.full_name)
        .bind(row.role)
        .bind(row.is_active)
        .bind(row.last_login)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        tx.commit().await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn get(&self, id: Uuid) -> Result<AdminRow, DatabaseError> {
        sqlx::query_as::<_, AdminRow>(&format!("SELECT {} FROM admins WHERE id = $1", ADMIN_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Admin", id))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<AdminRow>, DatabaseError> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            "SELECT {} FROM admins WHERE username = $1",
            ADMIN_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn exists(&self, username: &str, email: &str) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM admins WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE admins SET last_login = $2, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Admin", id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: AdminRole,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "admin_role", rename_all = "snake_case")]
pub enum AdminRole {
    Admin,
    SuperAdmin,
}
