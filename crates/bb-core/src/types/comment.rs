use bb_vcs::{Fingerprint, Sha};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A note left on a logical change, keyed by its fingerprint so it follows
/// the change across branches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CommitComment {
    #[schema(value_type = String)]
    pub fingerprint: Fingerprint,
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub sha: Sha,
    pub author_email: String,
    pub body: String,
}
