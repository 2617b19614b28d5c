//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::auth::{bearer_token, optional_claims, validate_token, AuthError, Claims};
use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// Validates the bearer token and stores its claims in request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = match bearer_token(request.headers()) {
        Some(token) => token,
        None => {
            warn!("Missing or invalid Authorization header");
            return Err(AuthError::MissingToken.into());
        }
    };

    match validate_token(token, &state.config.jwt_secret) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            warn!("Token validation failed: {:?}", e);
            Err(e.into())
        }
    }
}

/// Authorization middleware: requires an admin or super_admin role
///
/// Must run after [`auth_middleware`].
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let allowed = request
        .extensions()
        .get::<Claims>()
        .is_some_and(Claims::is_admin);

    if !allowed {
        warn!(uri = %request.uri(), "Admin route refused");
        return Err(AuthError::MissingPermission("admin".to_string()).into());
    }
    Ok(next.run(request).await)
}

/// Audit logging middleware
///
/// Logs every API request with the caller resolved from its token, if any
pub async fn audit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user = optional_claims(request.headers(), &state.config.jwt_secret)
        .ok()
        .flatten()
        .map(|c| c.username)
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        user = %user,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
