//! Authentication and authorization

use axum::http::{header, HeaderMap};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::AdminId;
use domain_admin::AdminProfile;

use crate::error::ApiError;

/// Role names carried in tokens
pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const SUPER_ADMIN: &str = "super_admin";
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (admin ID)
    pub sub: String,
    pub username: String,
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    /// The admin this token was issued to
    pub fn admin_id(&self) -> Result<AdminId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    /// True for administrators of any level
    pub fn is_admin(&self) -> bool {
        has_role(self, roles::ADMIN) || has_role(self, roles::SUPER_ADMIN)
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingPermission(_) => {
                ApiError::Forbidden("Access denied. Admin privileges required.".to_string())
            }
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

/// Signs a token for an authenticated admin
///
/// # Arguments
///
/// * `admin` - Profile whose ID becomes `sub` and whose role becomes the only role
/// * `secret` - HMAC signing key
/// * `expiration_secs` - Token validity in seconds; saturates rather than overflowing
pub fn create_token(
    admin: &AdminProfile,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let iat = Utc::now().timestamp();
    let exp = iat.saturating_add(i64::try_from(expiration_secs).unwrap_or(i64::MAX));

    let claims = Claims {
        sub: admin.id.to_string(),
        username: admin.username.clone(),
        roles: vec![admin.role.as_str().to_string()],
        exp,
        iat,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
///
/// # Errors
///
/// Returns `AuthError::TokenExpired` for an expired token and
/// `AuthError::InvalidToken` for any other failure
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Extracts the token from an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Validates the bearer token of a request, if one is present
pub fn optional_claims(headers: &HeaderMap, secret: &str) -> Result<Option<Claims>, AuthError> {
    bearer_token(headers)
        .map(|token| validate_token(token, secret))
        .transpose()
}

/// Checks if the claims carry a role
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims.roles.iter().any(|r| r == required_role)
}
