use crate::error::StoreError;
use bb_vcs::Fingerprint;
use std::collections::HashSet;

pub trait ExclusionRepository {
    /// Returns false when the fingerprint was already excluded.
    fn add(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError>;
    fn list(&self) -> Result<HashSet<Fingerprint>, StoreError>;
}
