use crate::types::ids::RepoId;
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Repo {
    pub id: RepoId,
    pub owner: String,
    pub name: String,
    pub primary_branch: String,
    /// Newest first.
    pub release_branches: Vec<String>,
}

impl Repo {
    pub fn pull_request_url(&self, number: i64) -> String {
        format!("https://github.com/{}/{}/pull/{number}", self.owner, self.name)
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
