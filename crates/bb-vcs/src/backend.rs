use crate::commit::Sha;
use crate::commits::CommitCollection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("parse error: {reason}")]
    Parse { reason: String },
    #[error("missing ref: {reason}")]
    MissingRef { reason: String },
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
    #[error("failed to run git: {reason}")]
    Spawn { reason: String },
}

impl VcsError {
    /// True when the requested revision does not exist, e.g. a pull request
    /// head ref that was garbage-collected upstream.
    pub fn is_missing_ref(&self) -> bool {
        matches!(self, Self::MissingRef { .. })
    }
}

/// Operations the sync and refresh passes need from a repository mirror.
pub trait VcsBackend {
    /// Brings the mirror up to date with its upstream, tags included.
    fn fetch(&self) -> Result<(), VcsError>;

    /// Loads the commits selected by `constraints` in topological order,
    /// newest first. Constraints use git's revision-range syntax, e.g.
    /// `["release-1.0", "^master"]`.
    fn load_history(&self, constraints: &[&str]) -> Result<CommitCollection, VcsError>;

    fn merge_base(&self, left: &str, right: &str) -> Result<Sha, VcsError>;

    /// Branch names matching `pattern`, sorted lexicographically descending.
    fn list_branches(&self, pattern: &str) -> Result<Vec<String>, VcsError>;
}
