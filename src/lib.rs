pub mod config;
pub mod db;
pub mod errors;
pub mod generation;
pub mod http;
pub mod models;
pub mod practice;
pub mod records;
pub mod service;
pub mod validation;
pub mod views;

use crate::config::{AppConfig, LOG_FILE_PREFIX};
use crate::errors::{AppError, AppResult};
use crate::http::AppState;
use crate::service::PracticeService;
use axum::Router;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(config: &AppConfig) -> AppResult<()> {
    let (writer, guard) = if config.logging.file {
        let log_dir = config.log_dir();
        std::fs::create_dir_all(&log_dir)?;
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX))
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };
    let _ = LOG_GUARD.set(guard);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer);
    let result = if config.logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|error| AppError::Internal(error.to_string()))
}

/// Opens storage, seeds the record views and assembles the router.
pub fn app(config: &AppConfig) -> AppResult<Router> {
    let service = PracticeService::new(config)?;
    Ok(http::router(AppState { service }, &config.server.cors_origins))
}

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let router = app(&config)?;
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "counselflow listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("counselflow stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
