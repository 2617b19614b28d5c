//! Admin Domain Ports

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{AdminId, DomainPort, HealthCheckable, PortError};

use crate::admin::Admin;

/// Storage port for administrator accounts
#[async_trait]
pub trait AdminPort: DomainPort + HealthCheckable {
    /// Persists a new admin; `PortError::Conflict` if username or email is taken
    async fn insert(&self, admin: &Admin) -> Result<(), PortError>;

    /// Persists the first admin of a deployment
    ///
    /// The emptiness check and the insert are atomic with respect to other
    /// writers, so concurrent bootstrap attempts cannot both succeed.
    ///
    /// # Returns
    ///
    /// `true` if the admin was stored, `false` if an admin already existed
    async fn insert_first(&self, admin: &Admin) -> Result<bool, PortError>;

    /// Retrieves an admin by ID, or `PortError::NotFound`
    async fn get(&self, id: AdminId) -> Result<Admin, PortError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, PortError>;

    /// Returns true if any admin has this username or email
    async fn exists(&self, username: &str, email: &str) -> Result<bool, PortError>;

    /// Number of stored admins
    async fn count(&self) -> Result<u64, PortError>;

    /// Sets `last_login` to `at`
    async fn record_login(&self, id: AdminId, at: DateTime<Utc>) -> Result<(), PortError>;
}

/// In-memory implementation of AdminPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    #[derive(Debug, Default)]
    pub struct MockAdminPort {
        admins: Arc<RwLock<HashMap<AdminId, Admin>>>,
    }

    impl MockAdminPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with admins for testing
        pub async fn with_admins(admins: Vec<Admin>) -> Self {
            let port = Self::new();
            {
                let mut stored = port.admins.write().await;
                for admin in admins {
                    stored.insert(admin.id, admin);
                }
            }
            port
        }
    }

    impl DomainPort for MockAdminPort {}

    #[async_trait]
    impl HealthCheckable for MockAdminPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-admin-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl AdminPort for MockAdminPort {
        async fn insert(&self, admin: &Admin) -> Result<(), PortError> {
            let mut admins = self.admins.write().await;
            if admins
                .values()
                .any(|a| a.username == admin.username || a.email == admin.email)
            {
                return Err(PortError::conflict("username or email already registered"));
            }
            admins.insert(admin.id, admin.clone());
            Ok(())
        }

        async fn insert_first(&self, admin: &Admin) -> Result<bool, PortError> {
            let mut admins = self.admins.write().await;
            if !admins.is_empty() {
                return Ok(false);
            }
            admins.insert(admin.id, admin.clone());
            Ok(true)
        }

        async fn get(&self, id: AdminId) -> Result<Admin, PortError> {
            self.admins
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Admin", id))
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, PortError> {
            Ok(self
                .admins
                .read()
                .await
                .values()
                .find(|a| a.username == username)
                .cloned())
        }

        async fn exists(&self, username: &str, email: &str) -> Result<bool, PortError> {
            Ok(self
                .admins
                .read()
                .await
                .values()
                .any(|a| a.username == username || a.email == email))
        }

        async fn count(&self) -> Result<u64, PortError> {
            Ok(self.admins.read().await.len() as u64)
        }

        async fn record_login(&self, id: AdminId, at: DateTime<Utc>) -> Result<(), PortError> {
            let mut admins = self.admins.write().await;
            let admin = admins.get_mut(&id).ok_or_else(|| PortError::not_found("Admin", id))?;
            admin.last_login = Some(at);
            admin.updated_at = at;
            Ok(())
        }
    }
}
