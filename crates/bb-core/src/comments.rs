use crate::error::StoreError;
use crate::types::CommitComment;
use bb_vcs::Fingerprint;

pub trait CommentRepository {
    fn add(&self, comment: &CommitComment) -> Result<(), StoreError>;
    fn list_for(&self, fingerprint: &Fingerprint) -> Result<Vec<CommitComment>, StoreError>;
}
