use bb_core::error::ServiceError;
use bb_core::types::{PullRequestId, PullRequestRecord, PullRequestState};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GithubPull {
    id: i64,
    number: i64,
    title: String,
    body: Option<String>,
    state: PullRequestState,
    merged_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
    base: GithubBase,
    user: Option<GithubUser>,
    #[serde(default)]
    labels: Vec<GithubLabel>,
}

#[derive(Debug, Deserialize)]
struct GithubBase {
    #[serde(rename = "ref")]
    branch: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GithubLabel {
    name: String,
}

impl From<GithubPull> for PullRequestRecord {
    fn from(pull: GithubPull) -> Self {
        Self {
            id: PullRequestId::new(pull.id),
            number: pull.number,
            title: pull.title,
            body: pull.body.unwrap_or_default(),
            state: pull.state,
            merged_at: pull.merged_at,
            updated_at: pull.updated_at,
            base_branch: pull.base.branch,
            base_sha: pull.base.sha,
            author: pull.user.map(|user| user.login).unwrap_or_default(),
            labels: pull.labels.into_iter().map(|label| label.name).collect(),
        }
    }
}

pub fn decode_pulls(body: &str) -> Result<Vec<PullRequestRecord>, ServiceError> {
    let pulls: Vec<GithubPull> = serde_json::from_str(body).map_err(|err| ServiceError::Decode {
        message: err.to_string(),
    })?;
    Ok(pulls.into_iter().map(PullRequestRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PULLS: &str = r#"[
      {
        "id": 421337,
        "number": 47761,
        "state": "closed",
        "title": "sql: fix crash",
        "body": null,
        "user": {"login": "benesch", "id": 1},
        "labels": [{"id": 1, "name": "backport-20.1"}, {"id": 2, "name": "C-bug"}],
        "merged_at": "2020-05-19T12:00:00Z",
        "updated_at": "2020-05-19T12:30:00Z",
        "base": {"ref": "master", "sha": "0123456789abcdef0123456789abcdef01234567", "label": "cockroachdb:master"},
        "head": {"ref": "fix", "sha": "fedcba9876543210fedcba9876543210fedcba98"}
      },
      {
        "id": 421338,
        "number": 47762,
        "state": "open",
        "title": "wip",
        "body": "details",
        "user": null,
        "merged_at": null,
        "updated_at": "2020-05-18T08:00:00Z",
        "base": {"ref": "release-20.1", "sha": "0123456789abcdef0123456789abcdef01234567"}
      }
    ]"#;

    #[test]
    fn test_decode_pulls() {
        let pulls = decode_pulls(PULLS).unwrap();
        assert_eq!(pulls.len(), 2);

        let merged = &pulls[0];
        assert_eq!(merged.id, PullRequestId::new(421_337));
        assert_eq!(merged.number, 47761);
        assert_eq!(merged.state, PullRequestState::Closed);
        assert!(merged.merged_at.is_some());
        assert_eq!(merged.body, "");
        assert_eq!(merged.author, "benesch");
        assert_eq!(merged.base_branch, "master");
        assert_eq!(merged.head_ref(), "refs/pull/47761/head");
        assert_eq!(merged.backport_labels("backport-"), vec!["backport-20.1".to_string()]);

        let open = &pulls[1];
        assert!(open.is_open());
        assert!(open.labels.is_empty());
        assert_eq!(open.author, "");
        assert_eq!(open.base_branch, "release-20.1");
    }

    #[test]
    fn test_decode_rejects_unknown_state() {
        let body = PULLS.replace("\"open\"", "\"draft\"");
        assert!(matches!(decode_pulls(&body), Err(ServiceError::Decode { .. })));
    }
}
