use bb_core::error::StoreError;
use bb_core::repos::RepoRepository;
use bb_core::types::RepoId;
use rusqlite::Connection;

use crate::util::query_error;

pub struct RepoRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> RepoRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl RepoRepository for RepoRepo<'_> {
    fn upsert(&self, owner: &str, name: &str) -> Result<RepoId, StoreError> {
        let sql = "INSERT INTO repos (github_owner, github_repo) VALUES (?1, ?2) \
                   ON CONFLICT (github_owner, github_repo) DO UPDATE SET github_owner = excluded.github_owner \
                   RETURNING id";
        let id: i64 = self
            .conn
            .query_row(sql, (owner, name), |row| row.get(0))
            .map_err(query_error)?;
        Ok(RepoId::new(id))
    }
}
