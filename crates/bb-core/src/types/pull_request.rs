use crate::types::ids::PullRequestId;
use bb_vcs::{Fingerprint, Sha};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
}

/// A pull request as reported by the review service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    pub id: PullRequestId,
    pub number: i64,
    pub title: String,
    pub body: String,
    pub state: PullRequestState,
    pub merged_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub base_branch: String,
    pub base_sha: String,
    pub author: String,
    pub labels: Vec<String>,
}

impl PullRequestRecord {
    pub fn is_open(&self) -> bool {
        self.state == PullRequestState::Open
    }

    pub fn is_closed_unmerged(&self) -> bool {
        self.state == PullRequestState::Closed && self.merged_at.is_none()
    }

    pub fn head_ref(&self) -> String {
        format!("refs/pull/{}/head", self.number)
    }

    /// Labels that mark backport intent; every other label is dropped on
    /// persist.
    pub fn backport_labels(&self, prefix: &str) -> Vec<String> {
        self.labels
            .iter()
            .filter(|label| label.starts_with(prefix))
            .cloned()
            .collect()
    }
}

/// One page of the review service's listing, most recently updated first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestPage {
    pub items: Vec<PullRequestRecord>,
    pub next_page: Option<u32>,
}

/// The view of a pull request carried in a repository snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PullRequest {
    pub number: i64,
    pub merged_at: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }
}

/// A merged pull request on the primary branch, keyed by one of its commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaPullRequest {
    pub sha: Sha,
    pub pull_request: PullRequest,
}

/// A merged or open pull request targeting `base_branch` that carries the
/// change identified by `fingerprint`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPullRequest {
    pub fingerprint: Fingerprint,
    pub base_branch: String,
    pub pull_request: PullRequest,
}
