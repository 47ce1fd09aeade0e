//! Membership resolution.
//!
//! Decides whether a package belongs to a monorepo group. The rest of the
//! tracker only sees this trait, so tests can swap in their own group table.

use crate::groups::GroupRegistry;

/// Resolves packages to their monorepo group.
pub trait MembershipResolver: Send + Sync {
    /// The group `package` belongs to, if any.
    fn group_of(&self, package: &str) -> Option<&str>;

    /// Members of `group` in configured order, or `None` for an unknown group.
    fn members_of(&self, group: &str) -> Option<&[String]>;

    /// Whether `package` is part of any configured monorepo group.
    fn is_part_of_monorepo(&self, package: &str) -> bool {
        self.group_of(package).is_some()
    }
}

impl MembershipResolver for GroupRegistry {
    fn group_of(&self, package: &str) -> Option<&str> {
        self.lookup_group(package)
    }

    fn members_of(&self, group: &str) -> Option<&[String]> {
        self.members(group)
    }
}
