use crate::routes::error::map_error;
use crate::{AppState, open_store};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bb_core::error::ReportError;
use bb_core::exclusions::ExclusionRepository;
use bb_core::report::{BranchReport, branch_report};
use bb_core::store::Store;
use bb_core::{BackboardError, RepoState};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A published snapshot as listed by `GET /api/repos`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RepoSummary {
    pub owner: String,
    pub name: String,
    pub primary_branch: String,
    pub release_branches: Vec<String>,
    pub primary_commits: usize,
    pub last_refresh: Option<DateTime<Utc>>,
}

impl From<&RepoState> for RepoSummary {
    fn from(state: &RepoState) -> Self {
        Self {
            owner: state.repo.owner.clone(),
            name: state.repo.name.clone(),
            primary_branch: state.repo.primary_branch.clone(),
            release_branches: state.repo.release_branches.clone(),
            primary_commits: state.master_commits.len(),
            last_refresh: state.last_refresh,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/repos", get(list_repos))
        .route(
            "/repos/{owner}/{name}/branches/{branch}/report",
            get(get_branch_report),
        )
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/repos",
    responses((status = 200, body = Vec<RepoSummary>))
)]
pub(crate) async fn list_repos(State(state): State<AppState>) -> Response {
    let summaries: Vec<RepoSummary> = state
        .states
        .snapshots()
        .iter()
        .map(|snapshot| RepoSummary::from(snapshot.as_ref()))
        .collect();
    Json(summaries).into_response()
}

#[utoipa::path(
    get,
    path = "/api/repos/{owner}/{name}/branches/{branch}/report",
    params(
        ("owner" = String, Path, description = "Repository owner"),
        ("name" = String, Path, description = "Repository name"),
        ("branch" = String, Path, description = "Release branch")
    ),
    responses(
        (status = 200, body = BranchReport),
        (status = 404, description = "Unknown repository or branch")
    )
)]
pub(crate) async fn get_branch_report(
    State(state): State<AppState>,
    Path((owner, name, branch)): Path<(String, String, String)>,
) -> Response {
    match build_report(&state, &owner, &name, &branch) {
        Ok(report) => Json(report).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

fn build_report(
    state: &AppState,
    owner: &str,
    name: &str,
    branch: &str,
) -> Result<BranchReport, BackboardError> {
    let snapshot = state
        .states
        .find(owner, name)
        .ok_or_else(|| ReportError::UnknownRepo {
            name: format!("{owner}/{name}"),
        })?;
    let exclusions = open_store(state)?.exclusions().list()?;
    Ok(branch_report(&snapshot, branch, &exclusions)?)
}
