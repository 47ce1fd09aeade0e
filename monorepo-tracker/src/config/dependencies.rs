//! Dependency initialization and wiring for the monorepo tracker.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{ConnectionMode, TrackerConfig};
use crate::convergence::{ConvergenceCheck, ConvergenceChecker};
use crate::errors::TrackerError;
use crate::groups::GroupRegistry;
use crate::membership::MembershipResolver;
use crate::pending::PendingTracker;
use crate::sweeper::{Sweeper, SweeperConfig};
use crate::tracker::MonorepoTracker;
use monorepo_tracker_repository::{DocumentStore, PostgresStoreConfig, StoreSource};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The document store registry entries and markers live in.
    pub store: Arc<dyn DocumentStore>,
    /// The configured monorepo groups.
    pub registry: Arc<GroupRegistry>,
    /// The tracker facade, for callers feeding publish events.
    pub tracker: Arc<MonorepoTracker>,
    /// The configured sweeper ready to run.
    pub sweeper: Sweeper,
}

impl Dependencies {
    /// Initialize all dependencies from a loaded configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(TrackerError)` - If the group definitions are invalid or the store
    ///   cannot be reached (the latter only in fail-fast mode)
    pub async fn new(config: &TrackerConfig) -> Result<Self, TrackerError> {
        let store_kind = if config.database_url.is_some() {
            "postgres"
        } else {
            "memory"
        };

        info!(
            store = store_kind,
            definitions_path = ?config.definitions_path,
            wait_threshold_mins = config.wait_threshold.num_minutes(),
            sweep_interval_secs = config.sweep_interval.as_secs(),
            connection_mode = ?config.connection_mode,
            "Initializing dependencies"
        );

        let registry = match &config.definitions_path {
            Some(path) => GroupRegistry::from_json_file(path)?,
            None => {
                info!("MONOREPO_DEFINITIONS_PATH not set, using built-in groups");
                GroupRegistry::builtin()
            }
        };

        let source = match &config.database_url {
            Some(url) => StoreSource::Live {
                database_url: url.clone(),
                config: PostgresStoreConfig::with_max_connections(config.max_connections),
            },
            None => {
                warn!("DATABASE_URL not set, using in-memory document store");
                StoreSource::mock()
            }
        };

        let store =
            Self::connect_store(source, config.connection_mode, config.retry_interval).await?;

        info!("Document store ready");

        Ok(Self::from_parts(registry, store, config))
    }

    /// Wire the components around an already connected store.
    pub fn from_parts(
        registry: GroupRegistry,
        store: Arc<dyn DocumentStore>,
        config: &TrackerConfig,
    ) -> Self {
        let registry = Arc::new(registry);
        let resolver: Arc<dyn MembershipResolver> = registry.clone();
        let checker: Arc<dyn ConvergenceCheck> =
            Arc::new(ConvergenceChecker::new(resolver.clone(), store.clone()));
        let pending = PendingTracker::new(store.clone());
        let tracker = Arc::new(MonorepoTracker::new(resolver, checker, pending));

        let sweeper = Sweeper::new(
            tracker.clone(),
            SweeperConfig {
                interval: config.sweep_interval,
                wait_threshold: config.wait_threshold,
            },
        );

        Self {
            store,
            registry,
            tracker,
            sweeper,
        }
    }

    /// Connect to the store with retry logic based on connection mode.
    async fn connect_store(
        source: StoreSource,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<Arc<dyn DocumentStore>, TrackerError> {
        loop {
            match source.clone().into_store().await {
                Ok(store) => return Ok(store),
                Err(e) => match mode {
                    ConnectionMode::FailFast => return Err(e.into()),
                    ConnectionMode::Retry => {
                        warn!(
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to document store, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }
}
