use crate::BackboardError;
use crate::config::{Config, RepoConfig, TrackingConfig};
use crate::repos::RepoRepository;
use crate::state::RepoState;
use crate::state_store::StateStore;
use crate::store::Store;
use crate::sync::SyncTarget;
use crate::types::Repo;
use bb_vcs::{GitMirror, VcsBackend};
use tracing::info;

/// Registers `owner/name` in storage and publishes its first snapshot from
/// `vcs`.
pub fn register_repo<S: Store, V: VcsBackend>(
    store: &S,
    states: &StateStore,
    vcs: &V,
    repo: &RepoConfig,
    tracking: &TrackingConfig,
) -> Result<Repo, BackboardError> {
    let id = store.repos().upsert(&repo.owner, &repo.name)?;
    let repo = Repo {
        id,
        owner: repo.owner.clone(),
        name: repo.name.clone(),
        primary_branch: tracking.primary_branch.clone(),
        release_branches: vcs.list_branches(&tracking.release_branch_pattern)?,
    };

    let mut state = RepoState::new(repo.clone());
    state.refresh(store, vcs)?;
    info!(
        %repo,
        branches = repo.release_branches.len(),
        commits = state.master_commits.len(),
        "registered"
    );
    states.publish(id, state);
    Ok(repo)
}

/// Clones missing mirrors and registers every configured repository.
pub fn bootstrap<S: Store>(
    store: &S,
    states: &StateStore,
    config: &Config,
) -> Result<Vec<SyncTarget<GitMirror>>, BackboardError> {
    let mut targets = Vec::with_capacity(config.repos.len());
    for repo_config in &config.repos {
        let path = config.mirror_path(repo_config);
        let vcs = GitMirror::open_or_clone(&repo_config.clone_url(), &path)?;
        let repo = register_repo(store, states, &vcs, repo_config, &config.tracking)?;
        targets.push(SyncTarget { repo, vcs });
    }
    Ok(targets)
}
