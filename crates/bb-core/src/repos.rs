use crate::error::StoreError;
use crate::types::RepoId;

pub trait RepoRepository {
    /// Returns the id of the `owner/name` row, inserting it if needed.
    fn upsert(&self, owner: &str, name: &str) -> Result<RepoId, StoreError>;
}
