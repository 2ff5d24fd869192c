use crate::BackboardError;
use crate::pull_requests::PullRequestRepository;
use crate::store::Store;
use crate::types::{PullRequest, Repo};
use bb_vcs::{CommitCollection, Fingerprint, Sha, VcsBackend};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Everything derived for one repository by a single refresh pass.
///
/// A `RepoState` is built privately and then published whole; readers only
/// ever hold a shared snapshot.
#[derive(Debug, Clone)]
pub struct RepoState {
    pub repo: Repo,
    pub master_commits: CommitCollection,
    /// Per release branch, the commits not reachable from the primary branch.
    pub branch_commits: HashMap<String, CommitCollection>,
    pub branch_merge_bases: HashMap<String, Sha>,
    /// Merged primary-branch pull requests by commit sha.
    pub master_prs: HashMap<Sha, PullRequest>,
    /// Merged or open pull requests by fingerprint, then base branch. A
    /// backport shows up as the same fingerprint under a release branch.
    pub branch_prs: HashMap<Fingerprint, HashMap<String, PullRequest>>,
    pub last_refresh: Option<DateTime<Utc>>,
}

impl RepoState {
    pub fn new(repo: Repo) -> Self {
        Self {
            repo,
            master_commits: CommitCollection::new(),
            branch_commits: HashMap::new(),
            branch_merge_bases: HashMap::new(),
            master_prs: HashMap::new(),
            branch_prs: HashMap::new(),
            last_refresh: None,
        }
    }

    /// Re-derives every field from git and storage.
    ///
    /// Results are collected first and assigned at the end, so on error
    /// `self` is left exactly as it was.
    pub fn refresh<S: Store, V: VcsBackend>(
        &mut self,
        store: &S,
        vcs: &V,
    ) -> Result<(), BackboardError> {
        let primary = self.repo.primary_branch.as_str();
        let master_commits = vcs.load_history(&[primary])?;

        let exclude_primary = format!("^{primary}");
        let mut branch_commits = HashMap::new();
        let mut branch_merge_bases = HashMap::new();
        for branch in &self.repo.release_branches {
            let commits = vcs.load_history(&[branch.as_str(), exclude_primary.as_str()])?;
            let merge_base = vcs.merge_base(primary, branch)?;
            debug!(%branch, commits = commits.len(), %merge_base, "loaded release branch");
            branch_commits.insert(branch.clone(), commits);
            branch_merge_bases.insert(branch.clone(), merge_base);
        }

        // When several merged pull requests contain the same commit, the last
        // row wins.
        let master_prs = store
            .pull_requests()
            .merged_by_sha(self.repo.id, primary)?
            .into_iter()
            .map(|row| (row.sha, row.pull_request))
            .collect();

        let mut branch_prs: HashMap<Fingerprint, HashMap<String, PullRequest>> = HashMap::new();
        for row in store.pull_requests().by_fingerprint(self.repo.id)? {
            branch_prs
                .entry(row.fingerprint)
                .or_default()
                .insert(row.base_branch, row.pull_request);
        }

        self.master_commits = master_commits;
        self.branch_commits = branch_commits;
        self.branch_merge_bases = branch_merge_bases;
        self.master_prs = master_prs;
        self.branch_prs = branch_prs;
        self.last_refresh = Some(Utc::now());
        Ok(())
    }

    pub fn master_pr(&self, sha: &Sha) -> Option<&PullRequest> {
        self.master_prs.get(sha)
    }

    /// The pull request that carries `fingerprint` into `branch`, if any.
    pub fn branch_pr(&self, fingerprint: &Fingerprint, branch: &str) -> Option<&PullRequest> {
        self.branch_prs
            .get(fingerprint)
            .and_then(|by_branch| by_branch.get(branch))
    }
}
