use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use bb_core::types::{Repo, RepoId};
use bb_core::{RepoState, StateStore};
use bb_serve::{AppState, app};
use bb_vcs::{Commit, CommitCollection, Sha, User, fingerprint};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BRANCH: &str = "release-1.0";

fn commit(n: u8, title: &str) -> Commit {
    Commit {
        sha: Sha::from_bytes(&[n; 20]).unwrap(),
        commit_date: Utc::now(),
        author: User::new("dev@example.com"),
        title: title.to_string(),
        body: String::new(),
        merge: false,
        oldest_tag: String::new(),
    }
}

fn snapshot() -> RepoState {
    let mut state = RepoState::new(Repo {
        id: RepoId::new(1),
        owner: "acme".to_string(),
        name: "widgets".to_string(),
        primary_branch: "master".to_string(),
        release_branches: vec![BRANCH.to_string()],
    });
    let master: CommitCollection = [commit(2, "fix: b"), commit(1, "fix: a"), commit(0, "init")]
        .into_iter()
        .collect();
    state.master_commits = master;
    state
        .branch_commits
        .insert(BRANCH.to_string(), CommitCollection::new());
    state
        .branch_merge_bases
        .insert(BRANCH.to_string(), Sha::from_bytes(&[0; 20]).unwrap());
    state.last_refresh = Some(Utc::now());
    state
}

fn test_app() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let states = StateStore::new();
    states.publish(RepoId::new(1), snapshot());
    let state = AppState {
        db_path: dir.path().join("backboard.db"),
        states: Arc::new(states),
    };
    (dir, app(state))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_list_repos() {
    let (_dir, app) = test_app();
    let (status, body) = send(&app, get("/api/repos")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["owner"], "acme");
    assert_eq!(body[0]["release_branches"], json!([BRANCH]));
    assert_eq!(body[0]["primary_commits"], 3);
}

#[tokio::test]
async fn test_report_reflects_exclusions() {
    let (_dir, app) = test_app();
    let uri = format!("/api/repos/acme/widgets/branches/{BRANCH}/report");

    let (status, body) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["commits"].as_array().unwrap().len(), 2);
    assert_eq!(body["commits"][0]["status"], "not_backported");

    let excluded = fingerprint("fix: b", "").to_string();
    let (status, body) = send(&app, post("/api/exclusions", &json!({ "fingerprint": excluded }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], true);
    let (_, body) = send(&app, post("/api/exclusions", &json!({ "fingerprint": excluded }))).await;
    assert_eq!(body["added"], false);

    let (_, body) = send(&app, get(&uri)).await;
    assert_eq!(body["commits"][0]["status"], "excluded");
    assert_eq!(body["commits"][1]["status"], "not_backported");
}

#[tokio::test]
async fn test_unknown_repo_and_branch_are_not_found() {
    let (_dir, app) = test_app();
    let (status, body) = send(&app, get("/api/repos/acme/widgets/branches/release-9/report")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = send(&app, get(&format!("/api/repos/acme/nope/branches/{BRANCH}/report"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_fingerprint_is_rejected() {
    let (_dir, app) = test_app();
    let (status, body) = send(&app, post("/api/exclusions", &json!({ "fingerprint": "xyz" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn test_comments_round_trip() {
    let (_dir, app) = test_app();
    let key = fingerprint("fix: a", "").to_string();
    let uri = format!("/api/comments/{key}");
    let input = json!({
        "sha": "01".repeat(20),
        "author_email": "reviewer@example.com",
        "body": "needs a backport to 1.0",
    });

    let (status, created) = send(&app, post(&uri, &input)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["fingerprint"], key);

    let (status, listed) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["body"], "needs a backport to 1.0");
    assert_eq!(listed[0]["sha"], "01".repeat(20));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (_dir, app) = test_app();
    let (status, body) = send(&app, get("/api/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/exclusions"].is_object());
}
