use bb_core::error::StoreError;
use bb_core::pull_requests::PullRequestRepository;
use bb_core::types::{
    BranchPullRequest, PullRequest, PullRequestId, PullRequestRecord, RepoId, ShaPullRequest,
};
use bb_vcs::CommitCollection;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::util::{
    decode_fingerprint, decode_labels, decode_sha, from_rfc3339, query_error, to_rfc3339,
};

pub struct PullRequestRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> PullRequestRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl PullRequestRepository for PullRequestRepo<'_> {
    fn label_count(&self, id: PullRequestId) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT count(*) FROM pr_labels WHERE pr_id = ?1",
                [id.get()],
                |row| row.get(0),
            )
            .map_err(query_error)?;
        usize::try_from(count).map_err(|err| StoreError::Decode {
            message: err.to_string(),
        })
    }

    fn updated_at(&self, id: PullRequestId) -> Result<Option<DateTime<Utc>>, StoreError> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM prs WHERE id = ?1",
                [id.get()],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_error)?;
        value.as_deref().map(from_rfc3339).transpose()
    }

    fn upsert(&self, repo_id: RepoId, pr: &PullRequestRecord) -> Result<(), StoreError> {
        let sql = "INSERT INTO prs (id, repo_id, number, title, body, open, merged_at, base_sha, base_branch, author_username, updated_at) \
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) \
                   ON CONFLICT (id) DO UPDATE SET \
                   repo_id = excluded.repo_id, number = excluded.number, title = excluded.title, \
                   body = excluded.body, open = excluded.open, merged_at = excluded.merged_at, \
                   base_sha = excluded.base_sha, base_branch = excluded.base_branch, \
                   author_username = excluded.author_username, updated_at = excluded.updated_at";
        let params = (
            pr.id.get(),
            repo_id.get(),
            pr.number,
            &pr.title,
            &pr.body,
            pr.is_open(),
            pr.merged_at.map(|value| to_rfc3339(&value)),
            &pr.base_sha,
            &pr.base_branch,
            &pr.author,
            to_rfc3339(&pr.updated_at),
        );
        self.conn.execute(sql, params).map_err(query_error)?;
        Ok(())
    }

    fn replace_commits(
        &self,
        id: PullRequestId,
        commits: &CommitCollection,
    ) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM pr_commits WHERE pr_id = ?1", [id.get()])
            .map_err(query_error)?;
        let mut stmt = self
            .conn
            .prepare(
                "INSERT INTO pr_commits (pr_id, sha, title, body, message_id, author_email, ordering) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .map_err(query_error)?;
        for (ordering, commit) in (0_i64..).zip(commits.iter()) {
            stmt.execute((
                id.get(),
                commit.sha.as_bytes(),
                &commit.title,
                &commit.body,
                commit.fingerprint().as_bytes(),
                &commit.author.email,
                ordering,
            ))
            .map_err(query_error)?;
        }
        Ok(())
    }

    fn replace_labels(&self, id: PullRequestId, labels: &[String]) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM pr_labels WHERE pr_id = ?1", [id.get()])
            .map_err(query_error)?;
        let mut stmt = self
            .conn
            .prepare("INSERT OR IGNORE INTO pr_labels (pr_id, label) VALUES (?1, ?2)")
            .map_err(query_error)?;
        for label in labels {
            stmt.execute((id.get(), label)).map_err(query_error)?;
        }
        Ok(())
    }

    fn merged_by_sha(
        &self,
        repo_id: RepoId,
        base_branch: &str,
    ) -> Result<Vec<ShaPullRequest>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT c.sha, p.number, p.merged_at, json_group_array(l.label) \
                 FROM prs p \
                 JOIN pr_commits c ON c.pr_id = p.id \
                 LEFT JOIN pr_labels l ON l.pr_id = p.id \
                 WHERE p.repo_id = ?1 AND p.base_branch = ?2 AND p.merged_at IS NOT NULL \
                 GROUP BY p.number, p.merged_at, c.sha \
                 ORDER BY p.merged_at ASC, p.number ASC",
            )
            .map_err(query_error)?;
        let mut rows = stmt
            .query((repo_id.get(), base_branch))
            .map_err(query_error)?;
        let mut prs = Vec::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            let sha: Vec<u8> = row.get(0).map_err(query_error)?;
            prs.push(ShaPullRequest {
                sha: decode_sha(&sha)?,
                pull_request: map_pull_request(row, 1)?,
            });
        }
        Ok(prs)
    }

    fn by_fingerprint(&self, repo_id: RepoId) -> Result<Vec<BranchPullRequest>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT c.message_id, p.base_branch, p.number, p.merged_at, json_group_array(l.label) \
                 FROM prs p \
                 JOIN pr_commits c ON c.pr_id = p.id \
                 LEFT JOIN pr_labels l ON l.pr_id = p.id \
                 WHERE p.repo_id = ?1 AND (p.merged_at IS NOT NULL OR p.open) \
                 GROUP BY p.number, p.merged_at, c.message_id, p.base_branch \
                 ORDER BY p.number ASC",
            )
            .map_err(query_error)?;
        let mut rows = stmt.query([repo_id.get()]).map_err(query_error)?;
        let mut prs = Vec::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            let fingerprint: Vec<u8> = row.get(0).map_err(query_error)?;
            prs.push(BranchPullRequest {
                fingerprint: decode_fingerprint(&fingerprint)?,
                base_branch: row.get(1).map_err(query_error)?,
                pull_request: map_pull_request(row, 2)?,
            });
        }
        Ok(prs)
    }
}

/// Reads `number, merged_at, labels` starting at column `start`.
fn map_pull_request(row: &rusqlite::Row<'_>, start: usize) -> Result<PullRequest, StoreError> {
    let merged_at: Option<String> = row.get(start + 1).map_err(query_error)?;
    let labels: String = row.get(start + 2).map_err(query_error)?;
    Ok(PullRequest {
        number: row.get(start).map_err(query_error)?,
        merged_at: merged_at.as_deref().map(from_rfc3339).transpose()?,
        labels: decode_labels(&labels)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo_repo::RepoRepo;
    use crate::schema::with_test_db;
    use bb_core::repos::RepoRepository;
    use bb_core::types::PullRequestState;
    use bb_vcs::{Commit, Sha, User, fingerprint};

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

    fn record(id: i64, number: i64, base: &str, merged: bool, open: bool) -> PullRequestRecord {
        PullRequestRecord {
            id: PullRequestId::new(id),
            number,
            title: format!("pr {number}"),
            body: String::new(),
            state: if open {
                PullRequestState::Open
            } else {
                PullRequestState::Closed
            },
            merged_at: merged.then(Utc::now),
            updated_at: Utc::now(),
            base_branch: base.to_string(),
            base_sha: "0".repeat(40),
            author: "dev".to_string(),
            labels: Vec::new(),
        }
    }

    fn store_pr(
        prs: &PullRequestRepo<'_>,
        repo_id: RepoId,
        pr: &PullRequestRecord,
        commits: &[Commit],
        labels: &[&str],
    ) {
        prs.upsert(repo_id, pr).unwrap();
        let commits: CommitCollection = commits.iter().cloned().collect();
        prs.replace_commits(pr.id, &commits).unwrap();
        let labels: Vec<String> = labels.iter().map(ToString::to_string).collect();
        prs.replace_labels(pr.id, &labels).unwrap();
    }

    #[test]
    fn test_upsert_and_up_to_date_fields() {
        let conn = with_test_db().unwrap();
        let repo_id = RepoRepo::new(&conn).upsert("acme", "widgets").unwrap();
        let prs = PullRequestRepo::new(&conn);
        let mut pr = record(1, 10, "master", false, true);

        assert_eq!(prs.updated_at(pr.id).unwrap(), None);
        assert_eq!(prs.label_count(pr.id).unwrap(), 0);

        store_pr(&prs, repo_id, &pr, &[], &["backport-1.0", "backport-2.0"]);
        assert_eq!(prs.updated_at(pr.id).unwrap(), Some(pr.updated_at));
        assert_eq!(prs.label_count(pr.id).unwrap(), 2);

        pr.title = "renamed".to_string();
        pr.updated_at = pr.updated_at + chrono::Duration::seconds(5);
        prs.upsert(repo_id, &pr).unwrap();
        prs.replace_labels(pr.id, &["backport-1.0".to_string()]).unwrap();
        assert_eq!(prs.updated_at(pr.id).unwrap(), Some(pr.updated_at));
        assert_eq!(prs.label_count(pr.id).unwrap(), 1);
        let title: String = conn
            .query_row("SELECT title FROM prs WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(title, "renamed");
    }

    #[test]
    fn test_replace_commits_keeps_order() {
        let conn = with_test_db().unwrap();
        let repo_id = RepoRepo::new(&conn).upsert("acme", "widgets").unwrap();
        let prs = PullRequestRepo::new(&conn);
        let pr = record(1, 10, "master", true, false);
        store_pr(&prs, repo_id, &pr, &[commit(1, "a"), commit(2, "b")], &[]);
        store_pr(&prs, repo_id, &pr, &[commit(3, "c"), commit(4, "d")], &[]);

        let mut stmt = conn
            .prepare("SELECT title FROM pr_commits WHERE pr_id = 1 ORDER BY ordering")
            .unwrap();
        let titles: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(titles, vec!["c", "d"]);
    }

    #[test]
    fn test_merged_by_sha_only_merged_on_branch() {
        let conn = with_test_db().unwrap();
        let repo_id = RepoRepo::new(&conn).upsert("acme", "widgets").unwrap();
        let other_repo = RepoRepo::new(&conn).upsert("acme", "gadgets").unwrap();
        let prs = PullRequestRepo::new(&conn);
        store_pr(
            &prs,
            repo_id,
            &record(1, 10, "master", true, false),
            &[commit(1, "a"), commit(2, "b")],
            &["backport-1.0", "backport-2.0"],
        );
        store_pr(&prs, repo_id, &record(2, 11, "master", false, true), &[commit(3, "c")], &[]);
        store_pr(&prs, repo_id, &record(3, 12, "release-1.0", true, false), &[commit(4, "a")], &[]);
        store_pr(&prs, other_repo, &record(4, 13, "master", true, false), &[commit(5, "e")], &[]);

        let mut rows = prs.merged_by_sha(repo_id, "master").unwrap();
        rows.sort_by_key(|row| row.sha);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sha, commit(1, "a").sha);
        assert_eq!(rows[1].sha, commit(2, "b").sha);
        for row in &rows {
            assert_eq!(row.pull_request.number, 10);
            assert!(row.pull_request.is_merged());
            assert_eq!(
                row.pull_request.labels,
                vec!["backport-1.0".to_string(), "backport-2.0".to_string()]
            );
        }
    }

    #[test]
    fn test_by_fingerprint_merged_or_open() {
        let conn = with_test_db().unwrap();
        let repo_id = RepoRepo::new(&conn).upsert("acme", "widgets").unwrap();
        let prs = PullRequestRepo::new(&conn);
        store_pr(&prs, repo_id, &record(1, 10, "master", true, false), &[commit(1, "a")], &[]);
        store_pr(&prs, repo_id, &record(2, 11, "release-1.0", false, true), &[commit(2, "a")], &[]);
        store_pr(&prs, repo_id, &record(3, 12, "release-2.0", false, false), &[commit(3, "a")], &[]);

        let rows = prs.by_fingerprint(repo_id).unwrap();
        let branches: Vec<_> = rows
            .iter()
            .map(|row| (row.base_branch.as_str(), row.pull_request.number))
            .collect();
        assert_eq!(branches, vec![("master", 10), ("release-1.0", 11)]);
        assert!(rows.iter().all(|row| row.fingerprint == fingerprint("a", "")));
        assert!(rows[0].pull_request.labels.is_empty());
    }
}
