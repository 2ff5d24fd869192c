use crate::error::ReportError;
use crate::state::RepoState;
use crate::types::PullRequest;
use bb_vcs::{Commit, CommitCollection, Fingerprint, Sha};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BackportStatus {
    Excluded,
    Backported,
    InProgress,
    NotBackported,
}

/// A primary-branch commit made after `branch` was cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReportCommit {
    #[schema(value_type = String)]
    pub sha: Sha,
    #[schema(value_type = String)]
    pub fingerprint: Fingerprint,
    pub title: String,
    pub author_email: String,
    pub commit_date: DateTime<Utc>,
    pub oldest_tag: String,
    pub primary_pr: Option<PullRequest>,
    pub backport_pr: Option<PullRequest>,
    pub status: BackportStatus,
}

/// A commit that exists only on the release branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BranchCommit {
    #[schema(value_type = String)]
    pub sha: Sha,
    #[schema(value_type = String)]
    pub fingerprint: Fingerprint,
    pub title: String,
    pub author_email: String,
    pub commit_date: DateTime<Utc>,
    pub pull_request: Option<PullRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BranchReport {
    pub repo: String,
    pub branch: String,
    #[schema(value_type = String)]
    pub merge_base: Sha,
    pub commits: Vec<ReportCommit>,
    pub branch_only: Vec<BranchCommit>,
    pub last_refresh: Option<DateTime<Utc>>,
}

impl BranchReport {
    pub fn count(&self, status: BackportStatus) -> usize {
        self.commits
            .iter()
            .filter(|commit| commit.status == status)
            .count()
    }
}

/// Builds the backport report of `branch` from one published snapshot.
pub fn branch_report(
    state: &RepoState,
    branch: &str,
    exclusions: &HashSet<Fingerprint>,
) -> Result<BranchReport, ReportError> {
    let unknown = || ReportError::UnknownBranch {
        branch: branch.to_string(),
    };
    let branch_commits = state.branch_commits.get(branch).ok_or_else(unknown)?;
    let merge_base = *state.branch_merge_bases.get(branch).ok_or_else(unknown)?;

    let commits = state
        .master_commits
        .truncate(&merge_base)
        .into_iter()
        .map(|commit| {
            let fingerprint = commit.fingerprint();
            let backport_pr = state.branch_pr(&fingerprint, branch).cloned();
            let status = status_of(
                &fingerprint,
                branch_commits,
                backport_pr.as_ref(),
                exclusions,
            );
            ReportCommit {
                sha: commit.sha,
                fingerprint,
                primary_pr: state.master_pr(&commit.sha).cloned(),
                backport_pr,
                status,
                title: commit.title,
                author_email: commit.author.email,
                commit_date: commit.commit_date,
                oldest_tag: commit.oldest_tag,
            }
        })
        .collect();

    let branch_only = branch_commits
        .subtract(&state.master_commits)
        .into_iter()
        .filter(|commit| !state.master_commits.contains_fingerprint(&commit.fingerprint()))
        .map(|commit| branch_commit(state, branch, commit))
        .collect();

    Ok(BranchReport {
        repo: state.repo.to_string(),
        branch: branch.to_string(),
        merge_base,
        commits,
        branch_only,
        last_refresh: state.last_refresh,
    })
}

fn status_of(
    fingerprint: &Fingerprint,
    branch_commits: &CommitCollection,
    backport_pr: Option<&PullRequest>,
    exclusions: &HashSet<Fingerprint>,
) -> BackportStatus {
    if exclusions.contains(fingerprint) {
        return BackportStatus::Excluded;
    }
    if branch_commits.contains_fingerprint(fingerprint) {
        return BackportStatus::Backported;
    }
    match backport_pr {
        Some(pr) if pr.is_merged() => BackportStatus::Backported,
        Some(_) => BackportStatus::InProgress,
        None => BackportStatus::NotBackported,
    }
}

fn branch_commit(state: &RepoState, branch: &str, commit: Commit) -> BranchCommit {
    let fingerprint = commit.fingerprint();
    BranchCommit {
        sha: commit.sha,
        pull_request: state.branch_pr(&fingerprint, branch).cloned(),
        fingerprint,
        title: commit.title,
        author_email: commit.author.email,
        commit_date: commit.commit_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Repo, RepoId};
    use bb_vcs::User;
    use std::collections::HashMap;

    const BRANCH: &str = "release-20.1";

    fn sha(n: u8) -> Sha {
        Sha::from_bytes(&[n; 20]).unwrap()
    }

    fn commit(n: u8, title: &str) -> Commit {
        Commit {
            sha: sha(n),
            commit_date: Utc::now(),
            author: User::new("dev@example.com"),
            title: title.to_string(),
            body: String::new(),
            merge: false,
            oldest_tag: String::new(),
        }
    }

    fn pr(number: i64, merged: bool) -> PullRequest {
        PullRequest {
            number,
            merged_at: merged.then(Utc::now),
            labels: Vec::new(),
        }
    }

    fn fp(title: &str) -> Fingerprint {
        bb_vcs::fingerprint(title, "")
    }

    /// Primary: e (excluded), d (open backport), c (cherry-picked), b
    /// (merged backport pr), a (nothing), then the merge base. The branch
    /// carries a cherry-pick of c plus one commit of its own.
    fn state() -> RepoState {
        let master: CommitCollection = [
            commit(5, "e"),
            commit(4, "d"),
            commit(3, "c"),
            commit(2, "b"),
            commit(1, "a"),
            commit(0, "base"),
        ]
        .into_iter()
        .collect();
        let branch: CommitCollection = [commit(13, "c"), commit(14, "branch only")]
            .into_iter()
            .collect();

        let mut state = RepoState::new(Repo {
            id: RepoId::new(1),
            owner: "acme".to_string(),
            name: "widgets".to_string(),
            primary_branch: "master".to_string(),
            release_branches: vec![BRANCH.to_string()],
        });
        state.master_commits = master;
        state.branch_commits.insert(BRANCH.to_string(), branch);
        state.branch_merge_bases.insert(BRANCH.to_string(), sha(0));
        state.master_prs.insert(sha(1), pr(100, true));
        state.branch_prs.insert(
            fp("d"),
            HashMap::from([(BRANCH.to_string(), pr(201, false))]),
        );
        state.branch_prs.insert(
            fp("b"),
            HashMap::from([(BRANCH.to_string(), pr(202, true))]),
        );
        state
    }

    #[test]
    fn test_statuses() {
        let exclusions = HashSet::from([fp("e")]);
        let report = branch_report(&state(), BRANCH, &exclusions).unwrap();

        let statuses: Vec<_> = report
            .commits
            .iter()
            .map(|commit| (commit.title.as_str(), commit.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("e", BackportStatus::Excluded),
                ("d", BackportStatus::InProgress),
                ("c", BackportStatus::Backported),
                ("b", BackportStatus::Backported),
                ("a", BackportStatus::NotBackported),
            ]
        );
        assert_eq!(report.merge_base, sha(0));
        assert_eq!(report.commits[4].primary_pr.as_ref().unwrap().number, 100);
        assert!(report.commits[0].primary_pr.is_none());
        assert_eq!(report.commits[1].backport_pr.as_ref().unwrap().number, 201);
        assert_eq!(report.count(BackportStatus::Backported), 2);
    }

    #[test]
    fn test_branch_only_excludes_cherry_picks() {
        let report = branch_report(&state(), BRANCH, &HashSet::new()).unwrap();
        let titles: Vec<_> = report
            .branch_only
            .iter()
            .map(|commit| commit.title.as_str())
            .collect();
        assert_eq!(titles, vec!["branch only"]);
    }

    #[test]
    fn test_unknown_branch() {
        let err = branch_report(&state(), "release-1.0", &HashSet::new()).unwrap_err();
        assert!(matches!(err, ReportError::UnknownBranch { branch } if branch == "release-1.0"));
    }

    #[test]
    fn test_serializes_hex_and_snake_case() {
        let report = branch_report(&state(), BRANCH, &HashSet::new()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["repo"], "acme/widgets");
        assert_eq!(json["merge_base"], "00".repeat(20));
        assert_eq!(json["commits"][1]["status"], "in_progress");
        assert_eq!(json["commits"][4]["status"], "not_backported");
    }
}
