use crate::backend::VcsError;
use crate::commit::{Commit, Sha, User};
use crate::commits::CommitCollection;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// `git log` format: sha, subject, committer date (strict ISO 8601), author
/// email, parents, ref decorations. Fields are NUL separated, one commit per
/// line.
pub const COMMIT_FORMAT: &str = "%H%x00%s%x00%cI%x00%aE%x00%P%x00%D";

const FIELD_COUNT: usize = 6;

// The regular expression published on semver.org, with a leading `v`.
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
    )
    .expect("semver regex is valid")
});

pub fn is_release_tag(tag: &str) -> bool {
    VERSION_RE.is_match(tag)
}

/// Parses `git log --format=format:COMMIT_FORMAT` output.
///
/// Tags are attributed by traversal position: every commit is stamped with
/// the last release tag decoration seen so far in the output, which is an
/// approximation of "oldest tag containing this commit".
pub fn parse_log(output: &str) -> Result<CommitCollection, VcsError> {
    let mut commits = CommitCollection::new();
    let mut last_seen_tag = String::new();
    for line in output.lines() {
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\0').collect();
        if fields.len() < FIELD_COUNT {
            return Err(VcsError::Parse {
                reason: format!(
                    "expected {FIELD_COUNT} fields, got {}: {line:?}",
                    fields.len()
                ),
            });
        }
        let sha = Sha::parse(fields[0])?;
        let commit_date = DateTime::parse_from_rfc3339(fields[2])
            .map(|date| date.with_timezone(&Utc))
            .map_err(|err| VcsError::Parse {
                reason: format!("commit date {:?}: {err}", fields[2]),
            })?;
        for ref_name in fields[5].split(", ") {
            if let Some(tag) = ref_name.strip_prefix("tag: ")
                && is_release_tag(tag)
            {
                last_seen_tag = tag.to_string();
            }
        }
        commits.insert(Commit {
            sha,
            commit_date,
            author: User::new(fields[3]),
            title: fields[1].to_string(),
            body: String::new(),
            merge: fields[4].split_whitespace().count() > 1,
            oldest_tag: last_seen_tag.clone(),
        });
    }
    Ok(commits)
}
