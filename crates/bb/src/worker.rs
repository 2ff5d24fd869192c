use bb_core::config::Config;
use bb_core::sync::SyncTarget;
use bb_core::{BackboardError, StateStore, Synchronizer};
use bb_db::DbStore;
use bb_github::GithubClient;
use bb_vcs::GitMirror;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Starts the sync loop on its own thread. The storage connection cannot be
/// shared across threads, so the loop owns it and runs on a single-threaded
/// runtime.
pub fn spawn(
    config: Config,
    store: DbStore,
    source: GithubClient,
    states: Arc<StateStore>,
    targets: Vec<SyncTarget<GitMirror>>,
) -> Result<(), BackboardError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| BackboardError::Internal {
            message: format!("failed to build sync runtime: {err}"),
        })?;
    std::thread::Builder::new()
        .name("sync".to_string())
        .spawn(move || runtime.block_on(run(&config, &store, &source, &states, &targets)))
        .map_err(|err| BackboardError::Internal {
            message: format!("failed to spawn sync thread: {err}"),
        })?;
    Ok(())
}

async fn run(
    config: &Config,
    store: &DbStore,
    source: &GithubClient,
    states: &StateStore,
    targets: &[SyncTarget<GitMirror>],
) {
    let synchronizer = Synchronizer::new(store, source, states, &config.tracking);
    let interval = Duration::from_secs(config.sync_interval_secs);
    loop {
        let results = synchronizer.sync_all(targets).await;
        let failed = results.iter().filter(|result| result.is_err()).count();
        if failed > 0 {
            error!(failed, "sync pass finished with failures");
        } else {
            info!(repos = results.len(), "sync pass finished");
        }
        tokio::time::sleep(interval).await;
    }
}
