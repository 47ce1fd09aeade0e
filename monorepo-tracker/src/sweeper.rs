//! Periodic sweep of stale pending markers.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, instrument, warn};

use crate::errors::TrackerError;
use crate::tracker::{MonorepoTracker, SweepReport};

/// Default time between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default minutes a marker may wait before it is reported.
pub const DEFAULT_WAIT_THRESHOLD_MINS: i64 = 30;

/// Configuration for the sweeper.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Time between sweeps. Must be non-zero.
    pub interval: Duration,
    /// How long a marker may wait before it is treated as stale.
    pub wait_threshold: chrono::Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SWEEP_INTERVAL,
            wait_threshold: chrono::Duration::minutes(DEFAULT_WAIT_THRESHOLD_MINS),
        }
    }
}

/// Runs reconciliation passes on a fixed interval until shutdown.
pub struct Sweeper {
    tracker: Arc<MonorepoTracker>,
    config: SweeperConfig,
    /// Total number of completed sweeps since startup.
    total_sweeps: AtomicU64,
    /// Total number of stale groups reported since startup.
    total_stale_reported: AtomicU64,
}

impl Sweeper {
    pub fn new(tracker: Arc<MonorepoTracker>, config: SweeperConfig) -> Self {
        Self {
            tracker,
            config,
            total_sweeps: AtomicU64::new(0),
            total_stale_reported: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SweeperConfig {
        &self.config
    }

    /// Run a single reconciliation pass and log what it found.
    pub async fn tick(&self) -> Result<SweepReport, TrackerError> {
        let report = self
            .tracker
            .reconcile_stale(self.config.wait_threshold)
            .await?;

        for marker in &report.stale {
            warn!(
                group = %marker.group(),
                version = marker.latest_version().unwrap_or_default(),
                pending_since = %marker.updated_at,
                "Monorepo group has not converged within the wait threshold"
            );
        }

        self.total_sweeps.fetch_add(1, Ordering::Relaxed);
        self.total_stale_reported
            .fetch_add(report.stale.len() as u64, Ordering::Relaxed);

        if !report.is_empty() {
            info!(
                stale = report.stale.len(),
                converged = report.converged.len(),
                dropped = report.dropped.len(),
                "Sweep completed"
            );
        }

        Ok(report)
    }

    /// Sweep on every interval tick until `shutdown` fires or its sender is
    /// dropped. A failed sweep is logged and retried on the next tick.
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), TrackerError> {
        if self.config.interval.is_zero() {
            return Err(TrackerError::config("sweep interval must be greater than zero"));
        }

        info!(
            interval_secs = self.config.interval.as_secs(),
            wait_threshold_mins = self.config.wait_threshold.num_minutes(),
            "Starting pending marker sweeper"
        );

        let mut timer = interval(self.config.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Received shutdown signal");
                    break;
                }
                _ = timer.tick() => {
                    if let Err(e) = self.tick().await {
                        error!(error = %e, "Sweep failed");
                    }
                }
            }
        }

        info!(
            total_sweeps = self.total_sweeps.load(Ordering::Relaxed),
            total_stale_reported = self.total_stale_reported.load(Ordering::Relaxed),
            "Sweeper shutdown complete"
        );
        Ok(())
    }
}

/// Send on `shutdown_tx` once `signal` resolves successfully.
///
/// If the signal cannot be listened for, nothing is sent and the sender is
/// held open, so the sweeper keeps running instead of stopping at once.
pub async fn forward_shutdown_signal<F>(signal: F, shutdown_tx: broadcast::Sender<()>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
        }
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal, running until killed");
            std::future::pending::<()>().await;
            drop(shutdown_tx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convergence::{ConvergenceCheck, ConvergenceChecker};
    use crate::groups::GroupRegistry;
    use crate::membership::MembershipResolver;
    use crate::pending::PendingTracker;
    use chrono::Utc;
    use monorepo_tracker_repository::MemoryDocumentStore;

    fn sweeper(config: SweeperConfig) -> (Arc<MemoryDocumentStore>, Sweeper) {
        let resolver: Arc<dyn MembershipResolver> = Arc::new(GroupRegistry::builtin());
        let store = Arc::new(MemoryDocumentStore::new());
        let checker: Arc<dyn ConvergenceCheck> =
            Arc::new(ConvergenceChecker::new(resolver.clone(), store.clone()));
        let tracker = MonorepoTracker::new(resolver, checker, PendingTracker::new(store.clone()));
        (store, Sweeper::new(Arc::new(tracker), config))
    }

    #[tokio::test]
    async fn test_tick_reports_stale_markers() {
        let (store, sweeper) = sweeper(SweeperConfig::default());
        let pending = PendingTracker::new(store.clone());
        pending
            .record_pending_at("pouchdb", "9.0.0", Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();

        let report = sweeper.tick().await.unwrap();

        assert_eq!(report.stale.len(), 1);
        assert_eq!(report.stale[0].group(), "pouchdb");
        assert_eq!(sweeper.total_sweeps.load(Ordering::Relaxed), 1);
        assert_eq!(sweeper.total_stale_reported.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (store, sweeper) = sweeper(SweeperConfig {
            interval: Duration::from_millis(10),
            ..SweeperConfig::default()
        });
        PendingTracker::new(store)
            .record_pending_at("retired", "1.0.0", Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();

        let sweeper = Arc::new(sweeper);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn({
            let sweeper = sweeper.clone();
            async move { sweeper.run(shutdown_rx).await }
        });

        tokio::time::timeout(Duration::from_secs(5), async {
            while sweeper.total_sweeps.load(Ordering::Relaxed) == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        shutdown_tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_rejects_zero_interval() {
        let (_store, sweeper) = sweeper(SweeperConfig {
            interval: Duration::ZERO,
            ..SweeperConfig::default()
        });
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let result = sweeper.run(shutdown_rx).await;

        assert!(matches!(result, Err(TrackerError::Config(_))));
    }

    #[tokio::test]
    async fn test_forward_shutdown_signal_sends_on_signal() {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        tokio::spawn(forward_shutdown_signal(async { Ok(()) }, shutdown_tx));

        let received = tokio::time::timeout(Duration::from_secs(5), shutdown_rx.recv())
            .await
            .unwrap();
        assert!(received.is_ok());
    }

    #[tokio::test]
    async fn test_forward_shutdown_signal_keeps_running_when_listener_fails() {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

        tokio::spawn(forward_shutdown_signal(
            async { Err(std::io::Error::other("signal handler unavailable")) },
            shutdown_tx,
        ));

        let received =
            tokio::time::timeout(Duration::from_millis(100), shutdown_rx.recv()).await;
        assert!(received.is_err(), "no shutdown and no closed channel");
    }
}
