use bb_core::error::StoreError;
use bb_core::exclusions::ExclusionRepository;
use bb_vcs::Fingerprint;
use rusqlite::Connection;
use std::collections::HashSet;

use crate::util::{decode_fingerprint, query_error};

pub struct ExclusionRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> ExclusionRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl ExclusionRepository for ExclusionRepo<'_> {
    fn add(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError> {
        let inserted = self
            .conn
            .execute(
                "INSERT INTO exclusions (message_id) VALUES (?1) ON CONFLICT DO NOTHING",
                [fingerprint.as_bytes()],
            )
            .map_err(query_error)?;
        Ok(inserted == 1)
    }

    fn list(&self) -> Result<HashSet<Fingerprint>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT message_id FROM exclusions")
            .map_err(query_error)?;
        let mut rows = stmt.query([]).map_err(query_error)?;
        let mut exclusions = HashSet::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            let bytes: Vec<u8> = row.get(0).map_err(query_error)?;
            exclusions.insert(decode_fingerprint(&bytes)?);
        }
        Ok(exclusions)
    }
}
