//! Configuration and dependency initialization.

pub mod dependencies;

pub use dependencies::Dependencies;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::errors::TrackerError;
use crate::sweeper::{DEFAULT_SWEEP_INTERVAL, DEFAULT_WAIT_THRESHOLD_MINS};

/// Default maximum number of pooled database connections.
const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Connection mode for the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry the connection on a fixed interval until it succeeds.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode. Unknown values fall back to `Retry`.
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!(value = %value, "Invalid STORE_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// Runtime configuration of the tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// PostgreSQL URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Pool size for the PostgreSQL store.
    pub max_connections: u32,
    /// JSON group definitions. `None` selects the built-in table.
    pub definitions_path: Option<PathBuf>,
    /// How long a pending marker may wait before it is reported.
    pub wait_threshold: chrono::Duration,
    /// Time between sweeps.
    pub sweep_interval: Duration,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            definitions_path: None,
            wait_threshold: chrono::Duration::minutes(DEFAULT_WAIT_THRESHOLD_MINS),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            connection_mode: ConnectionMode::Retry,
            retry_interval: Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS),
        }
    }
}

impl TrackerConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL URL (default: unset, in-memory store)
    /// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 20)
    /// - `MONOREPO_DEFINITIONS_PATH`: JSON group definitions (default: built-in groups)
    /// - `MONOREPO_WAIT_THRESHOLD_MINS`: Minutes before a pending group is reported (default: 30)
    /// - `SWEEP_INTERVAL_SECS`: Seconds between sweeps (default: 60)
    /// - `STORE_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `STORE_RETRY_INTERVAL_SECS`: Seconds between connection attempts (default: 15)
    ///
    /// Empty variables count as unset.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Config` when a numeric variable does not parse or
    /// an interval is zero.
    pub fn from_env() -> Result<Self, TrackerError> {
        let defaults = Self::default();

        let wait_threshold_mins: u32 = parse_var(
            "MONOREPO_WAIT_THRESHOLD_MINS",
            DEFAULT_WAIT_THRESHOLD_MINS as u32,
        )?;
        let sweep_interval_secs: u64 =
            parse_var("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL.as_secs())?;
        if sweep_interval_secs == 0 {
            return Err(TrackerError::config(
                "SWEEP_INTERVAL_SECS must be greater than zero",
            ));
        }
        let retry_interval_secs: u64 =
            parse_var("STORE_RETRY_INTERVAL_SECS", DEFAULT_RETRY_INTERVAL_SECS)?;
        if retry_interval_secs == 0 {
            return Err(TrackerError::config(
                "STORE_RETRY_INTERVAL_SECS must be greater than zero",
            ));
        }

        Ok(Self {
            database_url: read_var("DATABASE_URL"),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            definitions_path: read_var("MONOREPO_DEFINITIONS_PATH").map(PathBuf::from),
            wait_threshold: chrono::Duration::minutes(i64::from(wait_threshold_mins)),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            connection_mode: read_var("STORE_CONNECTION_MODE")
                .map(|mode| ConnectionMode::parse(&mode))
                .unwrap_or(defaults.connection_mode),
            retry_interval: Duration::from_secs(retry_interval_secs),
        })
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, TrackerError> {
    match read_var(name) {
        Some(value) => value
            .parse()
            .map_err(|_| TrackerError::config(format!("{name} has an invalid value: '{value}'"))),
        None => Ok(default),
    }
}
