use crate::BackboardError;
use crate::comments::CommentRepository;
use crate::exclusions::ExclusionRepository;
use crate::pull_requests::PullRequestRepository;
use crate::repos::RepoRepository;

pub trait Store {
    type Repos<'a>: RepoRepository
    where
        Self: 'a;
    type PullRequests<'a>: PullRequestRepository
    where
        Self: 'a;
    type Exclusions<'a>: ExclusionRepository
    where
        Self: 'a;
    type Comments<'a>: CommentRepository
    where
        Self: 'a;

    fn repos(&self) -> Self::Repos<'_>;
    fn pull_requests(&self) -> Self::PullRequests<'_>;
    fn exclusions(&self) -> Self::Exclusions<'_>;
    fn comments(&self) -> Self::Comments<'_>;

    /// Runs `f` in a transaction, committing on `Ok` and rolling back on
    /// `Err`.
    fn with_tx<F, T>(&self, f: F) -> Result<T, BackboardError>
    where
        F: FnOnce(&Self) -> Result<T, BackboardError>;
}
