use crate::routes::error::map_error;
use crate::{AppState, open_store};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use bb_core::BackboardError;
use bb_core::exclusions::ExclusionRepository;
use bb_core::store::Store;
use bb_vcs::Fingerprint;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExcludeInput {
    /// Hex-encoded commit fingerprint.
    pub fingerprint: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExcludeOutput {
    /// False when the fingerprint was already excluded.
    pub added: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/exclusions", post(add_exclusion))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/exclusions",
    request_body = ExcludeInput,
    responses(
        (status = 200, body = ExcludeOutput),
        (status = 400, description = "Malformed fingerprint")
    )
)]
pub(crate) async fn add_exclusion(
    State(state): State<AppState>,
    Json(input): Json<ExcludeInput>,
) -> Response {
    match exclude(&state, &input.fingerprint) {
        Ok(added) => Json(ExcludeOutput { added }).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

fn exclude(state: &AppState, fingerprint: &str) -> Result<bool, BackboardError> {
    let fingerprint = Fingerprint::parse(fingerprint)?;
    let added = open_store(state)?.exclusions().add(&fingerprint)?;
    info!(%fingerprint, added, "excluded");
    Ok(added)
}
