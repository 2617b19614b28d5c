//! Admin account service

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use validator::Validate;

use core_kernel::AdminId;

use crate::admin::{Admin, AdminProfile, NewAdmin};
use crate::error::AdminError;
use crate::password::{hash_password_task, verify_password_task, Password};
use crate::ports::AdminPort;

/// Who is asking to register a new admin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registrar {
    /// No credentials were presented
    Anonymous,
    /// An authenticated administrator
    Admin(AdminId),
}

/// Registration, authentication and profile lookup
pub struct AdminService {
    port: Arc<dyn AdminPort>,
}

impl AdminService {
    /// Creates a service over an admin storage port
    ///
    /// # Arguments
    ///
    /// * `port` - Storage for admin accounts
    pub fn new(port: Arc<dyn AdminPort>) -> Self {
        Self { port }
    }

    /// Creates an admin account
    ///
    /// Anonymous registration is accepted only while no admin exists, which
    /// lets a fresh deployment create its first account. The final emptiness
    /// check happens inside the port's `insert_first`, so concurrent bootstrap
    /// requests yield exactly one account.
    ///
    /// # Arguments
    ///
    /// * `request` - Account details; validated before anything is stored
    /// * `registrar` - Who is asking
    ///
    /// # Errors
    ///
    /// * `AdminError::Validation` for malformed details
    /// * `AdminError::RegistrationClosed` for anonymous requests once an admin exists
    /// * `AdminError::AlreadyExists` when the username or email is taken
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: NewAdmin, registrar: Registrar) -> Result<AdminProfile, AdminError> {
        request.validate()?;

        if registrar == Registrar::Anonymous && self.port.count().await? > 0 {
            warn!("Anonymous registration attempted after bootstrap");
            return Err(AdminError::RegistrationClosed);
        }
        if self.port.exists(&request.username, &request.email).await? {
            return Err(AdminError::AlreadyExists);
        }

        let now = Utc::now();
        let admin = Admin {
            id: AdminId::new(),
            username: request.username,
            email: request.email,
            password_hash: hash_password_task(Password::new(request.password)).await?,
            full_name: request.full_name,
            role: request.role.unwrap_or_default(),
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        match registrar {
            Registrar::Anonymous => {
                if !self.port.insert_first(&admin).await? {
                    warn!("Concurrent bootstrap registration lost the race");
                    return Err(AdminError::RegistrationClosed);
                }
            }
            Registrar::Admin(_) => self.port.insert(&admin).await?,
        }

        info!(admin_id = %admin.id, role = %admin.role, "Admin registered");
        Ok(AdminProfile::from(&admin))
    }

    /// Verifies credentials of an active admin and records the login
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidCredentials` for an unknown user, an
    /// inactive account or a wrong password alike
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &Password) -> Result<AdminProfile, AdminError> {
        let admin = match self.port.find_by_username(username).await? {
            Some(admin) if admin.is_active => admin,
            _ => return Err(AdminError::InvalidCredentials),
        };
        if !verify_password_task(password.clone(), admin.password_hash.clone()).await? {
            return Err(AdminError::InvalidCredentials);
        }

        let now = Utc::now();
        self.port.record_login(admin.id, now).await?;

        let mut profile = AdminProfile::from(&admin);
        profile.last_login = Some(now);
        info!(admin_id = %admin.id, "Admin logged in");
        Ok(profile)
    }

    /// The admin's profile without credentials
    pub async fn profile(&self, id: AdminId) -> Result<AdminProfile, AdminError> {
        let admin = self.port.get(id).await?;
        Ok(AdminProfile::from(&admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::AdminRole;
    use crate::ports::mock::MockAdminPort;

    fn request(username: &str) -> NewAdmin {
        NewAdmin {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "secret1".to_string(),
            full_name: Some("Grid Operator".to_string()),
            role: None,
        }
    }

    fn service() -> AdminService {
        AdminService::new(Arc::new(MockAdminPort::new()))
    }

    #[tokio::test]
    async fn test_first_admin_may_register_anonymously() {
        let service = service();
        let profile = service.register(request("first"), Registrar::Anonymous).await.unwrap();
        assert_eq!(profile.role, AdminRole::Admin);
        assert!(profile.is_active);
    }

    #[tokio::test]
    async fn test_later_registration_requires_admin() {
        let service = service();
        let first = service.register(request("first"), Registrar::Anonymous).await.unwrap();

        let result = service.register(request("second"), Registrar::Anonymous).await;
        assert!(matches!(result, Err(AdminError::RegistrationClosed)));

        let second = service.register(request("second"), Registrar::Admin(first.id)).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let service = service();
        let first = service.register(request("first"), Registrar::Anonymous).await.unwrap();

        let mut duplicate = request("first");
        duplicate.email = "other@example.com".to_string();
        let result = service.register(duplicate, Registrar::Admin(first.id)).await;
        assert!(matches!(result, Err(AdminError::AlreadyExists)));
    }

    #[tokio::test]
    async fn test_login_records_last_login() {
        let service = service();
        let registered = service.register(request("first"), Registrar::Anonymous).await.unwrap();
        assert!(registered.last_login.is_none());

        let profile = service
            .authenticate("first", &Password::new("secret1"))
            .await
            .unwrap();
        assert!(profile.last_login.is_some());

        let stored = service.profile(registered.id).await.unwrap();
        assert_eq!(stored.last_login, profile.last_login);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let service = service();
        service.register(request("first"), Registrar::Anonymous).await.unwrap();

        let wrong = service.authenticate("first", &Password::new("nope")).await;
        let unknown = service.authenticate("ghost", &Password::new("secret1")).await;
        assert!(matches!(wrong, Err(AdminError::InvalidCredentials)));
        assert!(matches!(unknown, Err(AdminError::InvalidCredentials)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bootstrap_creates_one_admin() {
        let port = Arc::new(MockAdminPort::new());
        let service = Arc::new(AdminService::new(port.clone()));

        let handles: Vec<_> = ["alpha", "bravo", "charlie", "delta"]
            .into_iter()
            .map(|name| {
                let service = service.clone();
                tokio::spawn(async move { service.register(request(name), Registrar::Anonymous).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => assert!(matches!(e, AdminError::RegistrationClosed)),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(port.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_rejected() {
        let mut bad = request("first");
        bad.password = "123".to_string();
        let result = service().register(bad, Registrar::Anonymous).await;
        assert!(matches!(result, Err(AdminError::Validation(_))));
    }
}
