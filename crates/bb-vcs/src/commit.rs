use crate::backend::VcsError;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use sha1::{Digest, Sha1};
use std::fmt;

const DIGEST_LEN: usize = 20;

/// A branch-specific commit identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sha([u8; DIGEST_LEN]);

/// Content identity of a commit, stable across cherry-picks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; DIGEST_LEN]);

fn digest_from_bytes(bytes: &[u8]) -> Result<[u8; DIGEST_LEN], VcsError> {
    bytes.try_into().map_err(|_| VcsError::Parse {
        reason: format!("corrupt sha ({} bytes instead of {DIGEST_LEN})", bytes.len()),
    })
}

fn digest_from_hex(value: &str) -> Result<[u8; DIGEST_LEN], VcsError> {
    let bytes = hex::decode(value).map_err(|err| VcsError::Parse {
        reason: format!("invalid hex {value:?}: {err}"),
    })?;
    digest_from_bytes(&bytes)
}

macro_rules! digest_type {
    ($name:ident) => {
        impl $name {
            pub fn parse(value: &str) -> Result<Self, VcsError> {
                digest_from_hex(value.trim()).map(Self)
            }

            pub fn from_bytes(bytes: &[u8]) -> Result<Self, VcsError> {
                digest_from_bytes(bytes).map(Self)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn short(&self) -> String {
                let mut full = self.to_string();
                full.truncate(9);
                full
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.short())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }
    };
}

digest_type!(Sha);
digest_type!(Fingerprint);

/// Hashes title then body. Commits with equal fingerprints are treated as
/// the same logical change even when their shas differ.
pub fn fingerprint(title: &str, body: &str) -> Fingerprint {
    let mut hasher = Sha1::new();
    hasher.update(title.as_bytes());
    hasher.update(body.as_bytes());
    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&hasher.finalize());
    Fingerprint(digest)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub email: String,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: Sha,
    pub commit_date: DateTime<Utc>,
    pub author: User,
    pub title: String,
    pub body: String,
    pub merge: bool,
    /// Most recent release tag seen before this commit while walking the
    /// branch. Empty when none has been seen.
    pub oldest_tag: String,
}

impl Commit {
    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(&self.title, &self.body)
    }
}
