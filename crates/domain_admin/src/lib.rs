//! Admin Domain
//!
//! Administrator accounts for the rate-management back office: Argon2
//! password hashing, bootstrap-aware registration and credential checks.
//! Token issuance belongs to the HTTP layer.

pub mod admin;
pub mod error;
pub mod password;
pub mod ports;
pub mod service;

pub use admin::{Admin, AdminProfile, AdminRole, NewAdmin};
pub use error::AdminError;
pub use password::{hash_password, verify_password, Password};
pub use ports::AdminPort;
pub use service::{AdminService, Registrar};

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockAdminPort;
