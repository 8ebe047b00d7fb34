use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sage_db::{InMemoryJobStore, JobStore, PgJobStore};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sage_api::config::{ServerConfig, StoreBackend};
use sage_api::router::build_app_router;
use sage_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sage_api=debug,sage_db=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        backend = ?config.store_backend,
        executor = %config.executor.program,
        poll_interval_ms = config.status_poll_interval.as_millis() as u64,
        "Loaded server configuration",
    );

    // --- Job Store ---
    let store = open_store(&config).await?;

    // --- Executor ---
    let executor = Arc::new(config.executor.build());

    // --- App state ---
    let state = AppState::new(store, executor, config.clone());
    let app = build_app_router(state.clone(), &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.shutdown.clone()))
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!(
        in_flight = state.engine.in_flight(),
        "Server stopped accepting connections, waiting for running jobs",
    );
    let drained = state
        .engine
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;
    if drained {
        tracing::info!("Graceful shutdown complete");
    } else {
        tracing::warn!(
            in_flight = state.engine.in_flight(),
            "Shutdown timeout elapsed; unfinished jobs stay pending",
        );
    }

    Ok(())
}

/// Build the configured [`JobStore`], preparing the database if needed.
async fn open_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn JobStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;

            let pool = sage_db::create_pool(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection pool created");

            sage_db::health_check(&pool)
                .await
                .context("Database health check failed")?;
            tracing::info!("Database health check passed");

            sage_db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(PgJobStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory job store; jobs are lost on restart");
            Ok(Arc::new(InMemoryJobStore::new()))
        }
    }
}

/// Wait for a termination signal, then end open status streams.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal(streams: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }

    streams.cancel();
}
