//! HTTP API Layer
//!
//! This crate provides the REST API for the electricity billing service using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for rates, calculations and admin accounts
//! - **Middleware**: Authentication, admin authorization, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **PDF**: Printable bill documents
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, Ports};
//!
//! let state = AppState::new(config, ports)?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pdf;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use ::config::ConfigError;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_admin::{AdminPort, AdminService};
use domain_billing::{BillHistoryPort, BillingService, HistoryRecorder};
use domain_tariff::{RateConfigStore, RateEntryPort};

use crate::config::ApiConfig;
use crate::handlers::{auth as auth_handlers, calculation, health, rates};
use crate::middleware::{audit_middleware, auth_middleware, require_admin};

/// Storage adapters behind the services
#[derive(Clone)]
pub struct Ports {
    pub rates: Arc<dyn RateEntryPort>,
    pub bills: Arc<dyn BillHistoryPort>,
    pub admins: Arc<dyn AdminPort>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub rates: Arc<RateConfigStore>,
    pub billing: Arc<BillingService>,
    pub history: Arc<HistoryRecorder>,
    pub admins: Arc<AdminService>,
    /// Kept for readiness checks
    pub ports: Ports,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the services over the given adapters using the typed settings of `config`
    ///
    /// # Arguments
    ///
    /// * `config` - Validated API settings
    /// * `ports` - Storage adapters, Postgres in production and mocks in tests
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configured timezone or pricing mode is unknown
    pub fn new(config: ApiConfig, ports: Ports) -> Result<Self, ConfigError> {
        let timezone = config.timezone()?;
        let mode = config.pricing_mode()?;

        let rates = Arc::new(
            RateConfigStore::new(ports.rates.clone())
                .with_cache_ttl(config.rate_cache_ttl())
                .with_timezone(timezone),
        );
        let history = Arc::new(
            HistoryRecorder::new(ports.bills.clone())
                .with_page_sizes(config.history_default_page_size, config.history_max_page_size),
        );
        let billing = Arc::new(BillingService::new(rates.clone(), history.clone()).with_mode(mode));
        let admins = Arc::new(AdminService::new(ports.admins.clone()));

        Ok(Self {
            rates,
            billing,
            history,
            admins,
            ports,
            config,
        })
    }
}

/// Creates the main API router
///
/// Admin routes share paths with public ones; merging keeps one method
/// router per path with the admin methods behind authentication.
///
/// # Arguments
///
/// * `state` - Shared services and settings
///
/// # Returns
///
/// A router serving `/health`, `/health/ready` and the `/api/v1` tree, with
/// request IDs, HTTP tracing and CORS applied to every route
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/register", post(auth_handlers::register))
        .route("/calculation", post(calculation::calculate_bill))
        .route("/calculation/pdf", post(calculation::calculate_bill_pdf))
        .route(
            "/calculation/history/consumer/:consumer_id",
            get(calculation::consumer_history),
        )
        .route("/config", get(rates::list_rates))
        .route("/config/effective-rate", get(rates::effective_rate))
        .route("/config/consumer-type/:type", get(rates::rates_for_consumer_type))
        .route("/config/tier-rates/:type", get(rates::tier_rates))
        .route("/config/taxes-surcharges/:type", get(rates::taxes_and_surcharges))
        .route("/config/:id", get(rates::get_rate));

    // Admin routes (token + admin role)
    let admin_routes = Router::new()
        .route("/auth/profile", get(auth_handlers::profile))
        .route("/auth/logout", post(auth_handlers::logout))
        .route("/config", post(rates::create_rate))
        .route("/config/flat-rate", put(rates::replace_flat_rate))
        .route("/config/:id", patch(rates::update_rate))
        .route("/config/:id", delete(rates::remove_rate))
        .route("/config/:id/toggle", patch(rates::toggle_rate))
        .route("/calculation/history", get(calculation::history))
        .route("/calculation/history/:id", get(calculation::history_record))
        .route("/calculation/stats/:month", get(calculation::monthly_stats))
        .route_layer(axum_middleware::from_fn(require_admin))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api_routes = public_routes
        .merge(admin_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware));

    let cors = cors_layer(&state.config);

    // Combine all routes
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origins = config.origins();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
