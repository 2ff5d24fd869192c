use crate::commit::{Commit, Fingerprint, Sha};
use std::collections::HashMap;

/// Commits in the order the history query emitted them, indexed by sha and
/// by fingerprint.
///
/// Each index maps a key to a single position. A duplicate key overwrites the
/// earlier entry, so lookups resolve to the last inserted commit. Real
/// histories only produce duplicate fingerprints (e.g. a change reverted and
/// re-landed with the same message); the later commit shadows the earlier.
#[derive(Debug, Clone, Default)]
pub struct CommitCollection {
    commits: Vec<Commit>,
    shas: HashMap<Sha, usize>,
    fingerprints: HashMap<Fingerprint, usize>,
}

impl CommitCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, commit: Commit) {
        let position = self.commits.len();
        self.shas.insert(commit.sha, position);
        self.fingerprints.insert(commit.fingerprint(), position);
        self.commits.push(commit);
    }

    /// Commits of `self`, in order, whose sha does not appear in `other`.
    pub fn subtract(&self, other: &CommitCollection) -> Vec<Commit> {
        self.commits
            .iter()
            .filter(|commit| !other.shas.contains_key(&commit.sha))
            .cloned()
            .collect()
    }

    /// Non-merge commits from the start up to, but excluding, the first
    /// commit with `sha`. Returns every non-merge commit when `sha` is absent.
    pub fn truncate(&self, sha: &Sha) -> Vec<Commit> {
        self.commits
            .iter()
            .take_while(|commit| commit.sha != *sha)
            .filter(|commit| !commit.merge)
            .cloned()
            .collect()
    }

    pub fn get_by_sha(&self, sha: &Sha) -> Option<&Commit> {
        self.position_of_sha(sha).map(|position| &self.commits[position])
    }

    pub fn get_by_fingerprint(&self, fingerprint: &Fingerprint) -> Option<&Commit> {
        self.position_of_fingerprint(fingerprint)
            .map(|position| &self.commits[position])
    }

    pub fn position_of_sha(&self, sha: &Sha) -> Option<usize> {
        self.shas.get(sha).copied()
    }

    pub fn position_of_fingerprint(&self, fingerprint: &Fingerprint) -> Option<usize> {
        self.fingerprints.get(fingerprint).copied()
    }

    pub fn contains_fingerprint(&self, fingerprint: &Fingerprint) -> bool {
        self.fingerprints.contains_key(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Commit> {
        self.commits.iter()
    }

    pub fn as_slice(&self) -> &[Commit] {
        &self.commits
    }
}

impl FromIterator<Commit> for CommitCollection {
    fn from_iter<I: IntoIterator<Item = Commit>>(iter: I) -> Self {
        let mut collection = Self::new();
        for commit in iter {
            collection.insert(commit);
        }
        collection
    }
}

impl<'a> IntoIterator for &'a CommitCollection {
    type Item = &'a Commit;
    type IntoIter = std::slice::Iter<'a, Commit>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
