//! Monorepo Tracker Main Entry Point
//!
//! Runs the pending marker sweeper against the configured document store,
//! reporting monorepo groups that have not converged within the wait threshold.

use dotenv::dotenv;
use monorepo_tracker::sweeper::forward_shutdown_signal;
use monorepo_tracker::{Dependencies, TrackerConfig, TrackerError};
use std::env;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), TrackerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("monorepo_tracker=info,monorepo_tracker_repository=info")
    });

    let json_format = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_format {
        // Structured output for log shipping
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(|e| TrackerError::config(format!("Failed to initialize tracing: {e}")))?;

        info!(
            service_name = "monorepo-tracker",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| TrackerError::config(format!("Failed to initialize tracing: {e}")))?;

        info!(
            service_name = "monorepo-tracker",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), TrackerError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    info!("Starting monorepo tracker");

    let config = TrackerConfig::from_env().inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;

    let deps = match Dependencies::new(&config).await {
        Ok(deps) => {
            info!(
                group_count = deps.registry.len(),
                "Dependencies initialized successfully"
            );
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(forward_shutdown_signal(tokio::signal::ctrl_c(), shutdown_tx));

    match deps.sweeper.run(shutdown_rx).await {
        Ok(()) => {
            info!("Monorepo tracker stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Monorepo tracker failed");
            Err(e)
        }
    }
}
