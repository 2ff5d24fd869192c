use bb_core::comments::CommentRepository;
use bb_core::error::StoreError;
use bb_core::types::CommitComment;
use bb_vcs::Fingerprint;
use rusqlite::Connection;

use crate::util::{decode_fingerprint, decode_sha, from_rfc3339, query_error, to_rfc3339};

pub struct CommentRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> CommentRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl CommentRepository for CommentRepo<'_> {
    fn add(&self, comment: &CommitComment) -> Result<(), StoreError> {
        let sql = "INSERT INTO commit_comments (message_id, created_at, sha, user_email, body) \
                   VALUES (?1, ?2, ?3, ?4, ?5)";
        self.conn
            .execute(
                sql,
                (
                    comment.fingerprint.as_bytes(),
                    to_rfc3339(&comment.created_at),
                    comment.sha.as_bytes(),
                    &comment.author_email,
                    &comment.body,
                ),
            )
            .map_err(query_error)?;
        Ok(())
    }

    fn list_for(&self, fingerprint: &Fingerprint) -> Result<Vec<CommitComment>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT message_id, created_at, sha, user_email, body FROM commit_comments \
                 WHERE message_id = ?1 ORDER BY created_at ASC",
            )
            .map_err(query_error)?;
        let mut rows = stmt.query([fingerprint.as_bytes()]).map_err(query_error)?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            comments.push(map_comment_row(row)?);
        }
        Ok(comments)
    }
}

fn map_comment_row(row: &rusqlite::Row<'_>) -> Result<CommitComment, StoreError> {
    let fingerprint: Vec<u8> = row.get(0).map_err(query_error)?;
    let created_at: String = row.get(1).map_err(query_error)?;
    let sha: Vec<u8> = row.get(2).map_err(query_error)?;
    Ok(CommitComment {
        fingerprint: decode_fingerprint(&fingerprint)?,
        created_at: from_rfc3339(&created_at)?,
        sha: decode_sha(&sha)?,
        author_email: row.get(3).map_err(query_error)?,
        body: row.get(4).map_err(query_error)?,
    })
}
