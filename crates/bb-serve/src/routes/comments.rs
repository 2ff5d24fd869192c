use crate::routes::error::map_error;
use crate::{AppState, open_store};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bb_core::BackboardError;
use bb_core::comments::CommentRepository;
use bb_core::store::Store;
use bb_core::types::CommitComment;
use bb_vcs::{Fingerprint, Sha};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCommentInput {
    /// The commit the comment was written against.
    pub sha: String,
    pub author_email: String,
    pub body: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/comments/{fingerprint}", get(list_comments).post(add_comment))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/comments/{fingerprint}",
    params(("fingerprint" = String, Path, description = "Hex-encoded commit fingerprint")),
    responses((status = 200, body = Vec<CommitComment>))
)]
pub(crate) async fn list_comments(
    State(state): State<AppState>,
    Path(fingerprint): Path<String>,
) -> Response {
    let result = Fingerprint::parse(&fingerprint)
        .map_err(BackboardError::from)
        .and_then(|fingerprint| Ok(open_store(&state)?.comments().list_for(&fingerprint)?));
    match result {
        Ok(comments) => Json(comments).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/comments/{fingerprint}",
    params(("fingerprint" = String, Path, description = "Hex-encoded commit fingerprint")),
    request_body = AddCommentInput,
    responses((status = 200, body = CommitComment))
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    Path(fingerprint): Path<String>,
    Json(input): Json<AddCommentInput>,
) -> Response {
    match comment(&state, &fingerprint, input) {
        Ok(comment) => Json(comment).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

fn comment(
    state: &AppState,
    fingerprint: &str,
    input: AddCommentInput,
) -> Result<CommitComment, BackboardError> {
    let comment = CommitComment {
        fingerprint: Fingerprint::parse(fingerprint)?,
        created_at: chrono::Utc::now(),
        sha: Sha::parse(&input.sha)?,
        author_email: input.author_email,
        body: input.body,
    };
    open_store(state)?.comments().add(&comment)?;
    Ok(comment)
}
