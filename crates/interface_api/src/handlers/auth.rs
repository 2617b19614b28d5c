//! Authentication handlers

use axum::{extract::State, http::HeaderMap, http::StatusCode, Extension, Json};
use tracing::info;

use domain_admin::{AdminProfile, Password, Registrar};

use crate::auth::{create_token, optional_claims, Claims};
use crate::dto::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::dto::MessageResponse;
use crate::error::ApiError;
use crate::AppState;

/// Exchanges credentials for a bearer token
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for an unknown username, a wrong password
/// or a deactivated account; all three read the same to the caller
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let profile = state
        .admins
        .authenticate(&request.username, &Password::new(request.password))
        .await?;

    let token = create_token(&profile, &state.config.jwt_secret, state.config.jwt_expiration_secs)?;

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.jwt_expiration_secs,
        admin: profile,
    }))
}

/// Registers an admin
///
/// Open while no admin exists; afterwards the caller must present an admin token.
///
/// # Errors
///
/// * `ApiError::Forbidden` - registration is closed to anonymous callers
/// * `ApiError::Conflict` - the username or email is taken
/// * `ApiError::Validation` - the request body fails field checks
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AdminProfile>), ApiError> {
    let registrar = match optional_claims(&headers, &state.config.jwt_secret)? {
        Some(claims) if claims.is_admin() => Registrar::Admin(claims.admin_id()?),
        _ => Registrar::Anonymous,
    };

    let profile = state.admins.register(request.into(), registrar).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// The authenticated admin's profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AdminProfile>, ApiError> {
    let profile = state.admins.profile(claims.admin_id()?).await?;
    Ok(Json(profile))
}

/// Tokens are stateless; the client discards its copy
pub async fn logout(Extension(claims): Extension<Claims>) -> Json<MessageResponse> {
    info!(username = %claims.username, "Admin logged out");
    Json(MessageResponse::new("Logout successful"))
}
