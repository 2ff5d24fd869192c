use crate::error::StoreError;
use crate::types::{BranchPullRequest, PullRequestId, PullRequestRecord, RepoId, ShaPullRequest};
use bb_vcs::CommitCollection;
use chrono::{DateTime, Utc};

pub trait PullRequestRepository {
    fn label_count(&self, id: PullRequestId) -> Result<usize, StoreError>;
    fn updated_at(&self, id: PullRequestId) -> Result<Option<DateTime<Utc>>, StoreError>;
    fn upsert(&self, repo_id: RepoId, pr: &PullRequestRecord) -> Result<(), StoreError>;
    /// Replaces the stored commit set of `id` with `commits`, keeping their
    /// order.
    fn replace_commits(
        &self,
        id: PullRequestId,
        commits: &CommitCollection,
    ) -> Result<(), StoreError>;
    fn replace_labels(&self, id: PullRequestId, labels: &[String]) -> Result<(), StoreError>;
    /// Merged pull requests targeting `base_branch`, one row per commit.
    fn merged_by_sha(
        &self,
        repo_id: RepoId,
        base_branch: &str,
    ) -> Result<Vec<ShaPullRequest>, StoreError>;
    /// Merged or open pull requests on any base branch, one row per
    /// fingerprint and base branch.
    fn by_fingerprint(&self, repo_id: RepoId) -> Result<Vec<BranchPullRequest>, StoreError>;
}
