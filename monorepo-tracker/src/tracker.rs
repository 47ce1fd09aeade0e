//! The tracker facade.
//!
//! Ties membership, convergence and pending markers together. A publish event
//! either settles its group (the marker is cleared) or leaves it pending (the
//! marker is recorded). Periodic reconciliation re-checks markers that have
//! waited past the threshold.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use monorepo_tracker_shared::{PendingMarker, MONOREPO_PREFIX};
use tracing::{debug, info, instrument, warn};

use crate::convergence::ConvergenceCheck;
use crate::errors::TrackerError;
use crate::membership::MembershipResolver;
use crate::pending::PendingTracker;

/// Outcome of observing a single publish event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The package is not part of any monorepo group.
    NotAMember,
    /// Every member of the group reports the same version.
    Converged { group: String },
    /// Some members are still behind; a pending marker was recorded.
    Pending { group: String },
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    /// Markers that are past the threshold and still not converged, oldest
    /// first, as they were before being refreshed.
    pub stale: Vec<PendingMarker>,
    /// Groups that converged since their marker was recorded.
    pub converged: Vec<String>,
    /// Markers removed because their group is no longer configured, they
    /// carry no version, or they do not decode.
    pub dropped: Vec<String>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.stale.is_empty() && self.converged.is_empty() && self.dropped.is_empty()
    }
}

pub struct MonorepoTracker {
    resolver: Arc<dyn MembershipResolver>,
    checker: Arc<dyn ConvergenceCheck>,
    pending: PendingTracker,
}

impl MonorepoTracker {
    pub fn new(
        resolver: Arc<dyn MembershipResolver>,
        checker: Arc<dyn ConvergenceCheck>,
        pending: PendingTracker,
    ) -> Self {
        Self {
            resolver,
            checker,
            pending,
        }
    }

    pub fn pending(&self) -> &PendingTracker {
        &self.pending
    }

    /// Handle a "latest version changed" event for `package`.
    #[instrument(skip(self))]
    pub async fn observe_publish(
        &self,
        package: &str,
        version: &str,
    ) -> Result<Observation, TrackerError> {
        let Some(group) = self.resolver.group_of(package) else {
            debug!("Package is not part of a monorepo group");
            return Ok(Observation::NotAMember);
        };
        let group = group.to_string();

        let status = self.checker.convergence_status(&group, version).await?;

        // A late event for an older release must not reopen a settled group.
        if let Some(settled) = status.settled_version() {
            self.pending.clear_pending(&group).await?;
            info!(group = %group, version = %settled, "Monorepo group converged");
            Ok(Observation::Converged { group })
        } else {
            self.pending.record_pending(&group, version).await?;
            info!(
                group = %group,
                outstanding = status.outstanding(),
                "Monorepo group pending"
            );
            Ok(Observation::Pending { group })
        }
    }

    /// Re-check every marker older than `threshold`.
    pub async fn reconcile_stale(&self, threshold: Duration) -> Result<SweepReport, TrackerError> {
        self.reconcile_stale_at(threshold, Utc::now()).await
    }

    /// Re-check every marker older than `threshold` relative to `now`.
    ///
    /// Groups whose members all report one version get their marker cleared,
    /// even when that version is not the marker's. Groups still behind are
    /// reported and their marker refreshed to `now`, so each is reported again
    /// only after another full threshold. Undecodable markers are deleted. The
    /// first store error aborts the pass.
    #[instrument(skip(self))]
    pub async fn reconcile_stale_at(
        &self,
        threshold: Duration,
        now: DateTime<Utc>,
    ) -> Result<SweepReport, TrackerError> {
        let mut report = SweepReport::default();
        let scan = self.pending.scan_pending_at(threshold, now).await?;

        for id in scan.undecodable {
            warn!(marker_id = %id, "Clearing undecodable marker");
            self.pending.remove_marker(&id).await?;
            let group = id.strip_prefix(MONOREPO_PREFIX).unwrap_or(&id).to_string();
            report.dropped.push(group);
        }

        for marker in scan.stale {
            let group = marker.group().to_string();

            if self.resolver.members_of(&group).is_none() {
                warn!(group = %group, "Clearing marker for unconfigured group");
                self.pending.clear_pending(&group).await?;
                report.dropped.push(group);
                continue;
            }

            let Some(version) = marker.latest_version() else {
                warn!(group = %group, "Clearing marker without a version");
                self.pending.clear_pending(&group).await?;
                report.dropped.push(group);
                continue;
            };

            let status = self.checker.convergence_status(&group, version).await?;
            if let Some(settled) = status.settled_version() {
                self.pending.clear_pending(&group).await?;
                info!(group = %group, version = %settled, "Pending group converged");
                report.converged.push(group);
            } else {
                self.pending.record_pending_at(&group, version, now).await?;
                report.stale.push(marker);
            }
        }

        Ok(report)
    }
}
