//! VoltBill API Server Binary
//!
//! Starts the HTTP API for bill calculation and rate management.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin voltbill-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 DATABASE_URL=postgres://... cargo run --bin voltbill-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token lifetime in seconds (default: 86400)
//! * `DATABASE_URL` / `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_LOG_FORMAT` - `text` or `json` (default: text)
//! * `API_PRICING_MODE` - `flat` or `tiered` (default: flat)
//! * `API_BILLING_TIMEZONE` - Timezone deciding the current month (default: UTC)
//! * `API_RATE_CACHE_TTL_SECS` - Effective-rate cache lifetime (default: 60)
//! * `API_ALLOWED_ORIGINS` - Comma-separated CORS origins (default: any)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_db::{
    create_pool, run_migrations, DatabaseConfig, PostgresAdminAdapter, PostgresBillHistoryAdapter,
    PostgresRateEntryAdapter,
};
use interface_api::{config::ApiConfig, create_router, AppState, Ports};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    init_tracing(&config);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        pricing_mode = %config.pricing_mode,
        "Starting VoltBill API Server"
    );

    tracing::info!("Connecting to database...");
    let pool = create_pool(DatabaseConfig::new(config.database_url.clone()))
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Running database migrations...");
    run_migrations(&pool).await.context("Failed to run migrations")?;

    let ports = Ports {
        rates: Arc::new(PostgresRateEntryAdapter::new(pool.clone())),
        bills: Arc::new(PostgresBillHistoryAdapter::new(pool.clone())),
        admins: Arc::new(PostgresAdminAdapter::new(pool)),
    };
    let state = AppState::new(config.clone(), ports)?;
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(config: &ApiConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Waits for Ctrl+C or SIGTERM so in-flight requests can finish
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
