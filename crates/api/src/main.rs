use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use aq_platform_api::{
    app::{create_app, AppState},
    config::Config,
    jobs::{AlertEvaluationJob, AlertEvaluator, JobScheduler, PoolMetricsJob},
    middleware::{logging::init_logging, metrics::init_metrics},
    services::{bootstrap_admin, BootstrapOutcome},
};
use tokio::signal;
use tracing::{info, warn};

const JOB_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config.logging).context("Failed to initialize logging")?;
    init_metrics().context("Failed to install Prometheus recorder")?;

    info!("Starting Air Quality Platform API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&(&config.database).into())
        .await
        .context("Failed to connect to database")?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Migrations completed");

    match bootstrap_admin(&pool, &config.admin).await? {
        BootstrapOutcome::Created(id) => info!(user_id = id, "Bootstrap admin created"),
        BootstrapOutcome::AdminExists => info!("Admin account present, bootstrap skipped"),
        BootstrapOutcome::NotConfigured => {}
    }

    let addr = config.socket_addr().context("Invalid server address")?;
    let state = AppState::new(config, pool.clone())?;

    let mut scheduler = JobScheduler::new();
    scheduler.register(PoolMetricsJob::new(pool.clone()));
    if state.config.alerts.enabled {
        let evaluator = AlertEvaluator::new(pool.clone(), Arc::clone(&state.notifier));
        scheduler.register(AlertEvaluationJob::new(
            evaluator,
            state.config.alerts.interval_minutes,
        ));
    } else {
        info!("Scheduled alert evaluation disabled");
    }
    scheduler.start();

    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(JOB_SHUTDOWN_TIMEOUT).await;
    persistence::db::close_pool(&pool).await;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
