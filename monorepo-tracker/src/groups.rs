//! Monorepo group definitions.
//!
//! A group is a named, ordered list of packages that are published together.
//! Definitions are fixed at startup, either from the built-in table or from a
//! JSON file shaped like `{ "group": ["package", ...] }`, and never change
//! while the process runs.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use tracing::{debug, info};

use crate::errors::TrackerError;

/// Name of the only built-in group.
pub const POUCHDB_GROUP: &str = "pouchdb";

const POUCHDB_MEMBERS: &[&str] = &[
    "pouchdb",
    "pouchdb-abstract-mapreduce",
    "pouchdb-adapter-fruitdown",
    "pouchdb-adapter-http",
    "pouchdb-adapter-idb",
    "pouchdb-adapter-indexeddb",
    "pouchdb-adapter-leveldb",
    "pouchdb-adapter-leveldb-core",
    "pouchdb-adapter-localstorage",
    "pouchdb-adapter-memory",
    "pouchdb-adapter-node-websql",
    "pouchdb-adapter-utils",
    "pouchdb-adapter-websql",
    "pouchdb-adapter-websql-core",
    "pouchdb-binary-utils",
    "pouchdb-browser",
    "pouchdb-changes-filter",
    "pouchdb-checkpointer",
    "pouchdb-collate",
    "pouchdb-collections",
    "pouchdb-core",
    "pouchdb-debug",
    "pouchdb-errors",
    "pouchdb-fetch",
    "pouchdb-find",
    "pouchdb-for-coverage",
    "pouchdb-generate-replication-id",
    "pouchdb-json",
    "pouchdb-mapreduce",
    "pouchdb-mapreduce-utils",
    "pouchdb-md5",
    "pouchdb-merge",
    "pouchdb-node",
    "pouchdb-replication",
    "pouchdb-selector-core",
    "pouchdb-utils",
    "sublevel-pouchdb",
];

/// Immutable table of monorepo groups with a precomputed reverse index.
///
/// Package lookups go through the reverse index, so resolving the group of a
/// package costs one hash lookup regardless of how many groups exist.
#[derive(Debug, Clone)]
pub struct GroupRegistry {
    groups: BTreeMap<String, Vec<String>>,
    package_to_group: HashMap<String, String>,
}

impl GroupRegistry {
    /// Build a registry from `(group, members)` definitions.
    ///
    /// Duplicate members inside one group are collapsed, keeping the first
    /// position.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidGroups` when a group name is empty or
    /// defined twice, when a group has no members, when a member name is empty,
    /// or when one package is listed in two different groups.
    pub fn new<I>(definitions: I) -> Result<Self, TrackerError>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut package_to_group: HashMap<String, String> = HashMap::new();

        for (group, members) in definitions {
            if group.trim().is_empty() {
                return Err(TrackerError::invalid_groups("group name must not be empty"));
            }
            if groups.contains_key(&group) {
                return Err(TrackerError::invalid_groups(format!(
                    "group '{group}' is defined more than once"
                )));
            }

            let mut ordered = Vec::with_capacity(members.len());
            for package in members {
                if package.trim().is_empty() {
                    return Err(TrackerError::invalid_groups(format!(
                        "group '{group}' contains an empty package name"
                    )));
                }
                match package_to_group.get(&package) {
                    Some(owner) if owner == &group => {
                        debug!(group = %group, package = %package, "Ignoring duplicate group member");
                    }
                    Some(owner) => {
                        return Err(TrackerError::invalid_groups(format!(
                            "package '{package}' is listed in both '{owner}' and '{group}'"
                        )));
                    }
                    None => {
                        package_to_group.insert(package.clone(), group.clone());
                        ordered.push(package);
                    }
                }
            }

            if ordered.is_empty() {
                return Err(TrackerError::invalid_groups(format!(
                    "group '{group}' has no members"
                )));
            }
            groups.insert(group, ordered);
        }

        Ok(Self {
            groups,
            package_to_group,
        })
    }

    /// The built-in table, containing the `pouchdb` group.
    pub fn builtin() -> Self {
        let members: Vec<String> = POUCHDB_MEMBERS.iter().map(|m| m.to_string()).collect();
        let package_to_group = members
            .iter()
            .map(|m| (m.clone(), POUCHDB_GROUP.to_string()))
            .collect();
        let groups = BTreeMap::from([(POUCHDB_GROUP.to_string(), members)]);

        Self {
            groups,
            package_to_group,
        }
    }

    /// Parse definitions from a JSON object mapping group names to member lists.
    pub fn from_json_str(json: &str) -> Result<Self, TrackerError> {
        let definitions: BTreeMap<String, Vec<String>> = serde_json::from_str(json)
            .map_err(|e| TrackerError::invalid_groups(format!("malformed definitions: {e}")))?;
        Self::new(definitions)
    }

    /// Load definitions from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let registry = Self::from_json_str(&json)?;

        info!(
            path = %path.display(),
            group_count = registry.len(),
            "Loaded monorepo group definitions"
        );

        Ok(registry)
    }

    /// The group `package` belongs to, if any.
    pub fn lookup_group(&self, package: &str) -> Option<&str> {
        self.package_to_group.get(package).map(String::as_str)
    }

    /// Members of `group` in configured order.
    pub fn members(&self, group: &str) -> Option<&[String]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    /// All groups, ordered by name.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    /// Number of configured groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
