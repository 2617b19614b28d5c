//! Administrator accounts
//!
//! [`Admin`] is the stored account including its password hash.
//! [`AdminProfile`] is the same account with credentials removed and is the
//! only form that leaves the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use core_kernel::AdminId;

use crate::error::AdminError;

/// Administrative role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Manages rates and reads bill history
    #[default]
    Admin,
    /// Same privileges as `Admin`; kept distinct for account management
    SuperAdmin,
}

impl AdminRole {
    /// Wire name, as carried in token roles and stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Admin => "admin",
            AdminRole::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(AdminRole::Admin),
            "super_admin" => Ok(AdminRole::SuperAdmin),
            other => Err(AdminError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// A stored administrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub id: AdminId,
    /// Unique login name
    pub username: String,
    /// Unique contact address
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: AdminRole,
    /// Inactive accounts cannot log in
    pub is_active: bool,
    /// Set on every successful login
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An administrator without credentials, safe to return to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: AdminId,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: AdminRole,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Admin> for AdminProfile {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username.clone(),
            email: admin.email.clone(),
            full_name: admin.full_name.clone(),
            role: admin.role,
            is_active: admin.is_active,
            last_login: admin.last_login,
            created_at: admin.created_at,
            updated_at: admin.updated_at,
        }
    }
}

/// Registration request
#[derive(Debug, Clone, Validate)]
pub struct NewAdmin {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub full_name: Option<String>,
    pub role: Option<AdminRole>,
}
