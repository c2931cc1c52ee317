//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging: it binds the configured address and
//! serves until killed. The workspace's main `hms-run` binary is the
//! deployment entrypoint and adds graceful shutdown.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{app, AppState};
use hms_core::{db, AppConfig, TokenService};

/// Main entry point for the HMS REST API server.
///
/// Starts the REST API server on the configured address (default:
/// 0.0.0.0:3000) and applies the database schema on startup.
///
/// # Environment Variables
/// - `HMS_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `HMS_DATABASE_URL`: SQLite URL (default: "sqlite://hms.db?mode=rwc")
/// - `HMS_JWT_SECRET`: Token signing secret
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - configuration fails to resolve or the database cannot be opened, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("hms_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = AppConfig::from_env()?;

    tracing::info!("-- Starting HMS REST API on {}", cfg.rest_addr());

    let pool = db::connect(cfg.database_url()).await?;
    db::apply_schema(&pool).await?;

    let state = AppState {
        pool,
        tokens: TokenService::from_config(&cfg),
        bcrypt_cost: cfg.bcrypt_cost(),
    };

    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
