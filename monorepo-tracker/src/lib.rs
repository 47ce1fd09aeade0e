//! # Monorepo Tracker
//!
//! Tracks releases of monorepo package groups: sets of packages that are
//! published together but whose publish events arrive one by one and out of
//! order.
//!
//! ## Architecture
//!
//! 1. **Groups**: Static group definitions with a package → group index
//! 2. **Membership**: Resolves whether a package belongs to a group
//! 3. **Convergence**: Checks whether every member reports the same version
//! 4. **Pending**: Records groups seen without convergence and sweeps the stale ones
//! 5. **Tracker**: Feeds publish events through the steps above
//! 6. **Sweeper**: Reconciles stale markers on a fixed interval
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`groups`]: Group definitions
//! - [`membership`]: Membership resolution
//! - [`convergence`]: Convergence checking
//! - [`pending`]: Pending marker tracking
//! - [`tracker`]: Publish handling and reconciliation
//! - [`sweeper`]: Periodic sweep worker
//! - [`errors`]: Error types for the tracker

pub mod config;
pub mod convergence;
pub mod errors;
pub mod groups;
pub mod membership;
pub mod pending;
pub mod sweeper;
pub mod tracker;

pub use config::{Dependencies, TrackerConfig};
pub use convergence::{ConvergenceCheck, ConvergenceChecker, GroupStatus};
pub use errors::TrackerError;
pub use groups::GroupRegistry;
pub use membership::MembershipResolver;
pub use pending::PendingTracker;
pub use sweeper::{Sweeper, SweeperConfig};
pub use tracker::{MonorepoTracker, Observation, SweepReport};
