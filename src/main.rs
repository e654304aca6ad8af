mod api;
mod config;
mod storage;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::storage::Database;
use anyhow::Context;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid log level")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("🚀 Starting Reviews API Server");
    info!("📋 Configuration loaded");
    info!("   - Database: {}", config.database.path.display());
    info!("   - Server: {}:{}", config.server.host, config.server.port);
    if !config.server.base_path.is_empty() {
        info!("   - Base path: {}", config.server.base_path);
    }

    // Initialize storage
    let database = Database::new(
        config.database.path.clone(),
        Duration::from_millis(config.database.busy_timeout_ms),
    );
    database
        .initialize()
        .context("Failed to initialize database")?;
    info!("✅ Database ready ({})", database.path().display());

    let state = AppState { database };
    let app = api::app(state, &config.server.base_path);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let base = &config.server.base_path;
    info!("🌐 Server listening on http://{}", addr);
    info!("📡 Available endpoints:");
    info!("   GET          {base}/api/reviews       - List reviews");
    info!("   GET          {base}/api/reviews/{{id}}  - Fetch one review");
    info!("   POST         {base}/api/reviews       - Create review");
    info!("   PUT | PATCH  {base}/api/reviews/{{id}}  - Update review fields");
    info!("   DELETE       {base}/api/reviews/{{id}}  - Delete review");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
