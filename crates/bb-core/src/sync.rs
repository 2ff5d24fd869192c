use crate::BackboardError;
use crate::config::TrackingConfig;
use crate::error::{ServiceError, StoreError};
use crate::pull_requests::PullRequestRepository;
use crate::state::RepoState;
use crate::state_store::StateStore;
use crate::store::Store;
use crate::types::{PullRequestPage, PullRequestRecord, Repo};
use bb_vcs::VcsBackend;
use tracing::{debug, error, info, warn};

pub const PAGE_SIZE: u32 = 100;

/// The review service's listing of pull requests, most recently updated
/// first. Pages are numbered from 1.
#[allow(async_fn_in_trait)]
pub trait PullRequestSource {
    async fn list_pull_requests(
        &self,
        repo: &Repo,
        page: u32,
    ) -> Result<PullRequestPage, ServiceError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Pull requests returned by the service.
    pub fetched: usize,
    /// Pull requests whose rows were rewritten.
    pub written: usize,
    /// Closed, unmerged pull requests whose commits could not be loaded.
    pub skipped: usize,
    pub pages: u32,
}

/// A repository paired with the mirror it is synced from.
#[derive(Debug, Clone)]
pub struct SyncTarget<V> {
    pub repo: Repo,
    pub vcs: V,
}

pub struct Synchronizer<'a, S, P> {
    store: &'a S,
    source: &'a P,
    states: &'a StateStore,
    tracking: &'a TrackingConfig,
}

impl<'a, S: Store, P: PullRequestSource> Synchronizer<'a, S, P> {
    pub fn new(
        store: &'a S,
        source: &'a P,
        states: &'a StateStore,
        tracking: &'a TrackingConfig,
    ) -> Self {
        Self {
            store,
            source,
            states,
            tracking,
        }
    }

    /// Syncs each target in turn. A failing repository is logged and the
    /// rest still run.
    pub async fn sync_all<V: VcsBackend>(
        &self,
        targets: &[SyncTarget<V>],
    ) -> Vec<Result<SyncSummary, BackboardError>> {
        let mut results = Vec::with_capacity(targets.len());
        for target in targets {
            let result = self.sync_repo(&target.repo, &target.vcs).await;
            if let Err(err) = &result {
                error!(repo = %target.repo, error = %err, "sync failed");
            }
            results.push(result);
        }
        results
    }

    /// Pulls updated pull requests for `repo`, persists the stale ones and
    /// publishes a freshly refreshed snapshot.
    pub async fn sync_repo<V: VcsBackend>(
        &self,
        repo: &Repo,
        vcs: &V,
    ) -> Result<SyncSummary, BackboardError> {
        info!(%repo, "syncing");
        vcs.fetch()?;

        let mut repo = repo.clone();
        repo.release_branches = vcs.list_branches(&self.tracking.release_branch_pattern)?;

        let mut summary = SyncSummary::default();
        let batch = self.fetch_updated(&repo, &mut summary).await?;

        // Oldest first.
        for pr in batch.iter().rev() {
            match self.sync_pull_request(&repo, vcs, pr)? {
                Outcome::Written => summary.written += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::UpToDate => {}
            }
        }

        let mut state = RepoState::new(repo);
        state.refresh(self.store, vcs)?;
        let id = state.repo.id;
        let published = self.states.publish(id, state);
        info!(
            repo = %published.repo,
            fetched = summary.fetched,
            written = summary.written,
            skipped = summary.skipped,
            "done syncing"
        );
        Ok(summary)
    }

    /// Pages through the listing until a page ends on an already stored pull
    /// request or there are no more pages.
    async fn fetch_updated(
        &self,
        repo: &Repo,
        summary: &mut SyncSummary,
    ) -> Result<Vec<PullRequestRecord>, BackboardError> {
        let mut batch = Vec::new();
        let mut page = 1;
        loop {
            let PullRequestPage { items, next_page } =
                self.source.list_pull_requests(repo, page).await?;
            summary.pages += 1;
            summary.fetched += items.len();
            let last_up_to_date = match items.last() {
                Some(last) => is_pr_up_to_date(
                    self.store,
                    last,
                    &self.tracking.backport_label_prefix,
                )?,
                None => true,
            };
            batch.extend(items);
            info!(%repo, page, total = batch.len(), "fetched updated pull requests");

            match next_page {
                Some(next) if !last_up_to_date => page = next,
                _ => break,
            }
        }
        Ok(batch)
    }

    fn sync_pull_request<V: VcsBackend>(
        &self,
        repo: &Repo,
        vcs: &V,
        pr: &PullRequestRecord,
    ) -> Result<Outcome, BackboardError> {
        debug!(number = pr.number, "syncing pull request");
        let head = pr.head_ref();
        let base = format!("^{}", pr.base_sha);
        let commits = match vcs.load_history(&[head.as_str(), base.as_str()]) {
            Ok(commits) => commits,
            Err(err) if pr.is_closed_unmerged() => {
                if err.is_missing_ref() {
                    warn!(number = pr.number, %head, "skipping closed pull request with missing ref");
                } else {
                    warn!(number = pr.number, error = %err, "skipping closed pull request");
                }
                return Ok(Outcome::Skipped);
            }
            Err(err) => return Err(err.into()),
        };

        let prefix = self.tracking.backport_label_prefix.as_str();
        self.store.with_tx(|tx| {
            if is_pr_up_to_date(tx, pr, prefix)? {
                return Ok(Outcome::UpToDate);
            }
            let prs = tx.pull_requests();
            prs.upsert(repo.id, pr)?;
            prs.replace_commits(pr.id, &commits)?;
            prs.replace_labels(pr.id, &pr.backport_labels(prefix))?;
            Ok(Outcome::Written)
        })
    }
}

enum Outcome {
    Written,
    UpToDate,
    Skipped,
}

/// A stored pull request is up to date when it carries as many backport
/// labels as the service reports and the same `updated_at`.
pub fn is_pr_up_to_date<S: Store>(
    store: &S,
    pr: &PullRequestRecord,
    label_prefix: &str,
) -> Result<bool, StoreError> {
    let prs = store.pull_requests();
    if prs.label_count(pr.id)? != pr.backport_labels(label_prefix).len() {
        return Ok(false);
    }
    Ok(prs.updated_at(pr.id)? == Some(pr.updated_at))
}
