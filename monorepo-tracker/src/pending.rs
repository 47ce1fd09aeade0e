//! Pending marker tracking.
//!
//! When a group is seen without full convergence, a marker
//! `monorepo:<group>` is upserted with the observed version and the current
//! time. Sweeping returns the markers that have waited longer than the
//! threshold, oldest first.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use monorepo_tracker_repository::DocumentStore;
use monorepo_tracker_shared::{marker_id, PendingMarker, MONOREPO_PREFIX};
use tracing::{debug, instrument, warn};

use crate::errors::TrackerError;

/// Records and sweeps pending markers in the document store.
pub struct PendingTracker {
    store: Arc<dyn DocumentStore>,
}

impl PendingTracker {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Upsert the marker for `group`, stamped with the current time.
    pub async fn record_pending(
        &self,
        group: &str,
        observed_version: &str,
    ) -> Result<PendingMarker, TrackerError> {
        self.record_pending_at(group, observed_version, Utc::now())
            .await
    }

    /// Upsert the marker for `group`, stamped with `now`.
    ///
    /// There is at most one marker per group; recording again replaces the
    /// version and timestamp.
    #[instrument(skip(self))]
    pub async fn record_pending_at(
        &self,
        group: &str,
        observed_version: &str,
        now: DateTime<Utc>,
    ) -> Result<PendingMarker, TrackerError> {
        let marker = PendingMarker::for_group(group, observed_version, now);
        self.store.put(&marker.to_document()?).await?;

        debug!(marker_id = %marker.id, "Recorded pending marker");
        Ok(marker)
    }

    /// Remove the marker for `group`. Absent markers are not an error.
    #[instrument(skip(self))]
    pub async fn clear_pending(&self, group: &str) -> Result<(), TrackerError> {
        self.store.delete(&marker_id(group)).await?;
        Ok(())
    }

    /// The current marker for `group`, if one exists and decodes.
    pub async fn get_pending(&self, group: &str) -> Result<Option<PendingMarker>, TrackerError> {
        let Some(document) = self.store.get(&marker_id(group)).await? else {
            return Ok(None);
        };

        match PendingMarker::from_document(&document) {
            Ok(marker) => Ok(Some(marker)),
            Err(e) => {
                warn!(marker_id = %document.id, error = %e, "Ignoring undecodable pending marker");
                Ok(None)
            }
        }
    }

    /// Markers last updated more than `threshold` ago, oldest first.
    pub async fn sweep_pending(
        &self,
        threshold: Duration,
    ) -> Result<Vec<PendingMarker>, TrackerError> {
        self.sweep_pending_at(threshold, Utc::now()).await
    }

    /// Markers last updated strictly before `now - threshold`, oldest first.
    ///
    /// Markers with equal timestamps keep the store's id order. Markers that
    /// do not decode are left out; see [`PendingTracker::scan_pending_at`].
    pub async fn sweep_pending_at(
        &self,
        threshold: Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<PendingMarker>, TrackerError> {
        Ok(self.scan_pending_at(threshold, now).await?.stale)
    }

    /// Like [`PendingTracker::sweep_pending_at`], also listing the ids of
    /// markers whose body does not decode.
    #[instrument(skip(self))]
    pub async fn scan_pending_at(
        &self,
        threshold: Duration,
        now: DateTime<Utc>,
    ) -> Result<PendingScan, TrackerError> {
        let cutoff = now
            .checked_sub_signed(threshold)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let documents = self.store.query_by_prefix(MONOREPO_PREFIX).await?;
        let scanned = documents.len();

        let mut scan = PendingScan::default();
        for document in &documents {
            match PendingMarker::from_document(document) {
                Ok(marker) if marker.updated_at < cutoff => scan.stale.push(marker),
                Ok(_) => {}
                Err(e) => {
                    warn!(marker_id = %document.id, error = %e, "Found undecodable pending marker");
                    scan.undecodable.push(document.id.clone());
                }
            }
        }

        // Stable, so equal timestamps stay in id order.
        scan.stale.sort_by_key(|marker| marker.updated_at);

        debug!(
            scanned,
            stale = scan.stale.len(),
            undecodable = scan.undecodable.len(),
            "Swept pending markers"
        );
        Ok(scan)
    }

    /// Delete a marker by its document id.
    pub async fn remove_marker(&self, id: &str) -> Result<(), TrackerError> {
        self.store.delete(id).await?;
        Ok(())
    }
}

/// Result of scanning the pending markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingScan {
    /// Markers past the threshold, oldest first.
    pub stale: Vec<PendingMarker>,
    /// Ids of markers whose body does not decode.
    pub undecodable: Vec<String>,
}
