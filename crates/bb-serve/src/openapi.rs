use crate::routes::comments::AddCommentInput;
use crate::routes::exclusions::{ExcludeInput, ExcludeOutput};
use crate::routes::repos::RepoSummary;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use bb_core::report::{BackportStatus, BranchCommit, BranchReport, ReportCommit};
use bb_core::types::{CommitComment, PullRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "backboard", description = "Backport status of tracked repositories"),
    paths(
        crate::routes::repos::list_repos,
        crate::routes::repos::get_branch_report,
        crate::routes::exclusions::add_exclusion,
        crate::routes::comments::list_comments,
        crate::routes::comments::add_comment
    ),
    components(schemas(
        RepoSummary,
        BranchReport,
        ReportCommit,
        BranchCommit,
        BackportStatus,
        PullRequest,
        CommitComment,
        AddCommentInput,
        ExcludeInput,
        ExcludeOutput
    ))
)]
struct ApiDoc;

pub fn pretty_json() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn router() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_route() {
        let doc: serde_json::Value = serde_json::from_str(&pretty_json()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        for path in [
            "/api/repos",
            "/api/repos/{owner}/{name}/branches/{branch}/report",
            "/api/exclusions",
            "/api/comments/{fingerprint}",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        assert!(doc["components"]["schemas"]["BranchReport"].is_object());
    }
}
