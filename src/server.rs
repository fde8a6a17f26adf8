//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache and counter setup, background jobs, and
//! the Axum server lifecycle including graceful shutdown.

use crate::application::services::LinkService;
use crate::config::Config;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{NullCache, RedisCache, ResolutionCache};
use crate::infrastructure::counter::{ClickCounter, NullCounter, RedisClickCounter};
use crate::infrastructure::persistence::PgLinkRepository;
use crate::infrastructure::redis_conn;
use crate::jobs::{self, JobSchedule};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{error, info, warn};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (with retry)
/// - Apply migrations
/// - Redis cache and click counter (or Null fallbacks)
/// - Expiry sweep and reconciliation jobs
/// - Axum HTTP server
///
/// On Ctrl-C or SIGTERM the server stops accepting connections, drains
/// in-flight requests, then stops the background jobs.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let link_service = build_link_service(&config, pool).await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let job_handles = jobs::spawn(
        Arc::clone(&link_service),
        JobSchedule::from_secs(
            config.sweep_interval_seconds,
            config.reconcile_interval_seconds,
        ),
        shutdown_rx,
    );

    let state = AppState::new(link_service, config.base_url.clone());
    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    let _ = shutdown_tx.send(true);
    for handle in job_handles {
        if let Err(e) = handle.await {
            warn!("Background job ended abnormally: {}", e);
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Opens the PostgreSQL pool, retrying with exponential backoff.
///
/// # Errors
///
/// Returns the last connection error after five failed attempts.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Some(Duration::from_secs(config.db_idle_timeout)))
        .max_lifetime(Some(Duration::from_secs(config.db_max_lifetime)));

    let strategy = ExponentialBackoff::from_millis(10)
        .factor(10)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(5);

    let url = config.database_url.as_str();
    Retry::start(strategy, || {
        let options = options.clone();
        async move {
            options.connect(url).await.inspect_err(|e| {
                warn!("Database connection attempt failed: {}", e);
            })
        }
    })
    .await
    .context("Failed to connect to database")
}

/// Wires the PostgreSQL store with Redis (or Null) cache and counter.
///
/// A Redis outage at start-up is not fatal: the service runs without cache
/// and counter, resolving every code against the store.
pub async fn build_link_service(
    config: &Config,
    pool: PgPool,
) -> Arc<LinkService<dyn LinkRepository>> {
    let (cache, counter) = connect_redis(config.redis_url.as_deref()).await;

    let repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(Arc::new(pool)));

    Arc::new(
        LinkService::new(repository, cache, counter).with_options(config.service_options()),
    )
}

async fn connect_redis(
    redis_url: Option<&str>,
) -> (Arc<dyn ResolutionCache>, Arc<dyn ClickCounter>) {
    let Some(redis_url) = redis_url else {
        info!("Cache and click counter disabled (Null adapters)");
        return (Arc::new(NullCache::new()), Arc::new(NullCounter::new()));
    };

    match redis_conn::connect(redis_url).await {
        Ok(manager) => {
            info!("Cache and click counter enabled (Redis)");
            (
                Arc::new(RedisCache::new(manager.clone())),
                Arc::new(RedisClickCounter::new(manager)),
            )
        }
        Err(e) => {
            warn!("Failed to connect to Redis: {}. Using Null adapters.", e);
            (Arc::new(NullCache::new()), Arc::new(NullCounter::new()))
        }
    }
}

/// Resolves when the process receives Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
