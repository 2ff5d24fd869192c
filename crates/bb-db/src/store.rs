use bb_core::error::{BackboardError, StoreError};
use bb_core::store::Store;
use rusqlite::Connection;

use crate::comment_repo::CommentRepo;
use crate::exclusion_repo::ExclusionRepo;
use crate::pr_repo::PullRequestRepo;
use crate::repo_repo::RepoRepo;
use crate::util::query_error;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for DbStore {
    type Repos<'a>
        = RepoRepo<'a>
    where
        Self: 'a;
    type PullRequests<'a>
        = PullRequestRepo<'a>
    where
        Self: 'a;
    type Exclusions<'a>
        = ExclusionRepo<'a>
    where
        Self: 'a;
    type Comments<'a>
        = CommentRepo<'a>
    where
        Self: 'a;

    fn repos(&self) -> Self::Repos<'_> {
        RepoRepo::new(&self.conn)
    }

    fn pull_requests(&self) -> Self::PullRequests<'_> {
        PullRequestRepo::new(&self.conn)
    }

    fn exclusions(&self) -> Self::Exclusions<'_> {
        ExclusionRepo::new(&self.conn)
    }

    fn comments(&self) -> Self::Comments<'_> {
        CommentRepo::new(&self.conn)
    }

    fn with_tx<F, T>(&self, f: F) -> Result<T, BackboardError>
    where
        F: FnOnce(&Self) -> Result<T, BackboardError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(tx_error)?;
        let result = f(self);
        match result {
            Ok(value) => match self.conn.execute_batch("COMMIT") {
                Ok(()) => Ok(value),
                Err(err) => {
                    // A failed COMMIT can leave the transaction open.
                    if !self.conn.is_autocommit() {
                        self.conn.execute_batch("ROLLBACK").map_err(tx_error)?;
                    }
                    Err(tx_error(err))
                }
            },
            Err(err) => {
                self.conn.execute_batch("ROLLBACK").map_err(tx_error)?;
                Err(err)
            }
        }
    }
}

fn tx_error(err: rusqlite::Error) -> BackboardError {
    BackboardError::Store(query_error(err))
}
