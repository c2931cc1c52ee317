//! Workspace entrypoint: runs the HMS REST API with graceful shutdown.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{app, AppState};
use hms_core::{db, AppConfig, TokenService};

/// Main entry point for the HMS application.
///
/// Resolves configuration, opens the SQLite pool and applies the schema,
/// then serves the REST API until the process receives ctrl-c. On shutdown
/// the pool is closed so WAL checkpoints land before exit.
///
/// # Environment Variables
/// - `HMS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HMS_DATABASE_URL`: SQLite URL (default: "sqlite://hms.db?mode=rwc")
/// - `HMS_JWT_SECRET`: Token signing secret
/// - `HMS_TOKEN_TTL_HOURS`, `HMS_BCRYPT_COST`: tuning knobs
///
/// # Returns
/// * `Ok(())` - If the server runs and shuts down cleanly
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("hms_core=info".parse()?)
                .add_directive("hms_run=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = AppConfig::from_env()?;

    tracing::info!("++ Starting HMS REST on {}", cfg.rest_addr());

    let pool = db::connect(cfg.database_url()).await?;
    db::apply_schema(&pool).await?;

    let state = AppState {
        pool: pool.clone(),
        tokens: TokenService::from_config(&cfg),
        bcrypt_cost: cfg.bcrypt_cost(),
    };

    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("-- HMS stopped");

    Ok(())
}

/// Resolves when the process receives ctrl-c.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install ctrl-c handler");
    }
}
