//! Authentication DTOs

use serde::{Deserialize, Serialize};

use domain_admin::{AdminProfile, AdminRole, NewAdmin};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued token plus the profile it was issued to
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    pub admin: AdminProfile,
}

/// Body of `POST /auth/register`; validated by the admin service
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: Option<AdminRole>,
}

impl From<RegisterRequest> for NewAdmin {
    fn from(req: RegisterRequest) -> Self {
        NewAdmin {
            username: req.username,
            email: req.email,
            password: req.password,
            full_name: req.full_name,
            role: req.role,
        }
    }
}
