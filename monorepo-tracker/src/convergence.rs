//! Convergence checking.
//!
//! A group has converged on a version when every one of its members reports
//! that version as `latest` in the document store. Members whose entry is
//! missing, unreadable or undecodable count as not converged; the store
//! answering only part of a batch is expected while the mirror catches up and
//! is never surfaced as an error.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use monorepo_tracker_repository::{BulkGetRow, DocumentStore};
use monorepo_tracker_shared::RegistryEntry;
use tracing::{debug, instrument};

use crate::errors::TrackerError;
use crate::membership::MembershipResolver;

/// Per-member breakdown of a convergence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStatus {
    pub group: String,
    pub target_version: String,
    /// Members reporting the target version.
    pub converged: Vec<String>,
    /// Members reporting another version, as `(package, version)`.
    pub behind: Vec<(String, String)>,
    /// Members with no readable entry or no `latest` tag.
    pub missing: Vec<String>,
}

impl GroupStatus {
    fn new(group: &str, target_version: &str) -> Self {
        Self {
            group: group.to_string(),
            target_version: target_version.to_string(),
            converged: Vec::new(),
            behind: Vec::new(),
            missing: Vec::new(),
        }
    }

    /// True when every member reports the target version.
    ///
    /// A group without members never converges.
    pub fn is_converged(&self) -> bool {
        !self.converged.is_empty() && self.behind.is_empty() && self.missing.is_empty()
    }

    /// The version every member reports, whether or not it is the target.
    ///
    /// `None` while any member is missing or members disagree.
    pub fn settled_version(&self) -> Option<&str> {
        if !self.missing.is_empty() {
            return None;
        }
        if self.behind.is_empty() {
            return (!self.converged.is_empty()).then_some(self.target_version.as_str());
        }
        if !self.converged.is_empty() {
            return None;
        }

        let (_, first) = &self.behind[0];
        self.behind
            .iter()
            .all(|(_, version)| version == first)
            .then_some(first.as_str())
    }

    /// Number of members still holding the group back.
    pub fn outstanding(&self) -> usize {
        self.behind.len() + self.missing.len()
    }
}

/// Decides whether a group has converged on a version.
#[async_trait]
pub trait ConvergenceCheck: Send + Sync {
    /// Inspect every member of `group` against `target_version`.
    async fn convergence_status(
        &self,
        group: &str,
        target_version: &str,
    ) -> Result<GroupStatus, TrackerError>;

    /// Whether every member of `group` reports `target_version` as latest.
    async fn has_group_converged(
        &self,
        group: &str,
        target_version: &str,
    ) -> Result<bool, TrackerError> {
        Ok(self
            .convergence_status(group, target_version)
            .await?
            .is_converged())
    }
}

/// Convergence check backed by the document store.
pub struct ConvergenceChecker {
    resolver: Arc<dyn MembershipResolver>,
    store: Arc<dyn DocumentStore>,
}

impl ConvergenceChecker {
    pub fn new(resolver: Arc<dyn MembershipResolver>, store: Arc<dyn DocumentStore>) -> Self {
        Self { resolver, store }
    }

    /// Whether the group `package` belongs to has converged on `version`.
    ///
    /// A package outside every group has nothing to wait for and yields
    /// `Ok(false)`.
    pub async fn has_all_updates(&self, package: &str, version: &str) -> Result<bool, TrackerError> {
        match self.resolver.group_of(package) {
            Some(group) => self.has_group_converged(group, version).await,
            None => {
                debug!(package = %package, "Package is not part of a monorepo group");
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl ConvergenceCheck for ConvergenceChecker {
    #[instrument(skip(self))]
    async fn convergence_status(
        &self,
        group: &str,
        target_version: &str,
    ) -> Result<GroupStatus, TrackerError> {
        let members = self
            .resolver
            .members_of(group)
            .ok_or_else(|| TrackerError::unknown_group(group))?;

        let rows = self.store.bulk_get(members).await?;
        let rows: HashMap<&str, &BulkGetRow> = rows.iter().map(|row| (row.key(), row)).collect();

        let mut status = GroupStatus::new(group, target_version);
        for member in members {
            classify(&mut status, member, rows.get(member.as_str()).copied());
        }

        debug!(
            converged = status.converged.len(),
            behind = status.behind.len(),
            missing = status.missing.len(),
            "Convergence status computed"
        );

        Ok(status)
    }
}

fn classify(status: &mut GroupStatus, member: &str, row: Option<&BulkGetRow>) {
    let document = match row {
        Some(BulkGetRow::Found(document)) => document,
        Some(BulkGetRow::Error { reason, .. }) => {
            debug!(package = %member, reason = %reason, "Registry entry unreadable, treating as absent");
            status.missing.push(member.to_string());
            return;
        }
        Some(BulkGetRow::Missing { .. }) | None => {
            status.missing.push(member.to_string());
            return;
        }
    };

    let entry = match RegistryEntry::from_document(document) {
        Ok(entry) => entry,
        Err(e) => {
            debug!(package = %member, error = %e, "Registry entry undecodable, treating as absent");
            status.missing.push(member.to_string());
            return;
        }
    };

    match entry.latest_version() {
        Some(version) if version == status.target_version => {
            status.converged.push(member.to_string());
        }
        Some(version) => {
            status
                .behind
                .push((member.to_string(), version.to_string()));
        }
        None => status.missing.push(member.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::GroupRegistry;
    use monorepo_tracker_repository::MemoryDocumentStore;
    use monorepo_tracker_shared::Document;
    use serde_json::json;

    fn registry() -> Arc<dyn MembershipResolver> {
        Arc::new(
            GroupRegistry::from_json_str(
                r#"{"fruits": ["@avocado/dep", "@banana/dep"], "cities": ["koeln", "hamburg", "berlin"]}"#,
            )
            .unwrap(),
        )
    }

    async fn seeded(entries: &[(&str, &str)]) -> Arc<MemoryDocumentStore> {
        let store = Arc::new(MemoryDocumentStore::new());
        for (package, version) in entries {
            let document = RegistryEntry::new(*package, *version).to_document().unwrap();
            store.put(&document).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_group_converged_when_all_members_match() {
        let store = seeded(&[("@avocado/dep", "2.0.0"), ("@banana/dep", "2.0.0")]).await;
        let checker = ConvergenceChecker::new(registry(), store);

        assert!(checker.has_group_converged("fruits", "2.0.0").await.unwrap());
        assert!(!checker.has_group_converged("fruits", "3.0.0").await.unwrap());
    }

    #[tokio::test]
    async fn test_group_not_converged_when_one_member_behind() {
        let store = seeded(&[("koeln", "2.0.0"), ("hamburg", "1.0.0"), ("berlin", "2.0.0")]).await;
        let checker = ConvergenceChecker::new(registry(), store);

        let status = checker.convergence_status("cities", "2.0.0").await.unwrap();

        assert!(!status.is_converged());
        assert_eq!(status.converged, vec!["koeln", "berlin"]);
        assert_eq!(
            status.behind,
            vec![("hamburg".to_string(), "1.0.0".to_string())]
        );
        assert_eq!(status.outstanding(), 1);
    }

    #[tokio::test]
    async fn test_single_matching_member_is_not_enough() {
        let store = seeded(&[("@avocado/dep", "2.0.0")]).await;
        let checker = ConvergenceChecker::new(registry(), store);

        let status = checker.convergence_status("fruits", "2.0.0").await.unwrap();

        assert!(!status.is_converged());
        assert_eq!(status.missing, vec!["@banana/dep"]);
    }

    #[tokio::test]
    async fn test_undecodable_and_tagless_entries_count_as_missing() {
        let store = seeded(&[("koeln", "2.0.0")]).await;
        store
            .put(&Document::new("hamburg", json!({"distTags": "2.0.0"})))
            .await
            .unwrap();
        store
            .put(&Document::new("berlin", json!({"distTags": {"next": "3.0.0"}})))
            .await
            .unwrap();
        let checker = ConvergenceChecker::new(registry(), store);

        let status = checker.convergence_status("cities", "2.0.0").await.unwrap();

        assert_eq!(status.missing, vec!["hamburg", "berlin"]);
        assert!(!status.is_converged());
    }

    #[tokio::test]
    async fn test_unknown_group_is_an_error() {
        let checker = ConvergenceChecker::new(registry(), seeded(&[]).await);

        let result = checker.has_group_converged("vegetables", "1.0.0").await;

        assert!(matches!(result, Err(TrackerError::UnknownGroup(g)) if g == "vegetables"));
    }

    #[tokio::test]
    async fn test_has_all_updates() {
        let store = seeded(&[("@avocado/dep", "2.0.0"), ("@banana/dep", "2.0.0")]).await;
        let checker = ConvergenceChecker::new(registry(), store);

        assert!(checker.has_all_updates("@banana/dep", "2.0.0").await.unwrap());
        assert!(!checker.has_all_updates("koeln", "2.0.0").await.unwrap());
        assert!(!checker.has_all_updates("some-dep", "2.0.0").await.unwrap());
    }

    #[tokio::test]
    async fn test_settled_version_when_members_agree_on_another_version() {
        let store = seeded(&[("@avocado/dep", "2.0.0"), ("@banana/dep", "2.0.0")]).await;
        let checker = ConvergenceChecker::new(registry(), store);

        let status = checker.convergence_status("fruits", "1.0.0").await.unwrap();

        assert!(!status.is_converged());
        assert_eq!(status.settled_version(), Some("2.0.0"));
    }

    #[tokio::test]
    async fn test_settled_version_requires_every_member() {
        let store = seeded(&[("koeln", "2.0.0"), ("hamburg", "1.0.0"), ("berlin", "2.0.0")]).await;
        let checker = ConvergenceChecker::new(registry(), store);
        assert_eq!(
            checker
                .convergence_status("cities", "2.0.0")
                .await
                .unwrap()
                .settled_version(),
            None
        );

        let partial = seeded(&[("@avocado/dep", "2.0.0")]).await;
        let checker = ConvergenceChecker::new(registry(), partial);
        assert_eq!(
            checker
                .convergence_status("fruits", "2.0.0")
                .await
                .unwrap()
                .settled_version(),
            None
        );
    }

    #[tokio::test]
    async fn test_settled_version_is_target_when_converged() {
        let store = seeded(&[("@avocado/dep", "2.0.0"), ("@banana/dep", "2.0.0")]).await;
        let checker = ConvergenceChecker::new(registry(), store);

        let status = checker.convergence_status("fruits", "2.0.0").await.unwrap();

        assert_eq!(status.settled_version(), Some("2.0.0"));
    }
}
