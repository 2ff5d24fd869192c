pub mod bootstrap;
pub mod comments;
pub mod config;
pub mod error;
pub mod exclusions;
pub mod pull_requests;
pub mod report;
pub mod repos;
pub mod state;
pub mod state_store;
pub mod store;
pub mod sync;

pub mod types;

pub use crate::config::{Config, TrackingConfig};
pub use crate::error::BackboardError;
pub use crate::report::{BackportStatus, BranchReport, branch_report};
pub use crate::state::RepoState;
pub use crate::state_store::StateStore;
pub use crate::store::Store;
pub use crate::sync::{PullRequestSource, SyncSummary, SyncTarget, Synchronizer};
