pub mod backend;
pub mod commit;
pub mod commits;
pub mod git;
pub mod history;

#[cfg(test)]
mod testutil;

pub use crate::backend::{VcsBackend, VcsError};
pub use crate::commit::{Commit, Fingerprint, Sha, User, fingerprint};
pub use crate::commits::CommitCollection;
pub use crate::git::GitMirror;
