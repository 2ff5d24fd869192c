pub mod comment;
pub mod ids;
pub mod pull_request;
pub mod repo;

pub use comment::CommitComment;
pub use ids::{PullRequestId, RepoId};
pub use pull_request::{
    BranchPullRequest, PullRequest, PullRequestPage, PullRequestRecord, PullRequestState,
    ShaPullRequest,
};
pub use repo::Repo;
