use bb_vcs::VcsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("query failed: {message}")]
    Query { message: String },
    #[error("decode failed: {message}")]
    Decode { message: String },
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {message}")]
    Request { message: String },
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("decode failed: {message}")]
    Decode { message: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
    #[error("parse failed: {message}")]
    Parse { message: String },
    #[error("invalid config: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("repo not found: {name}")]
    UnknownRepo { name: String },
    #[error("branch not tracked: {branch}")]
    UnknownBranch { branch: String },
}

#[derive(Debug, Error)]
pub enum BackboardError {
    #[error(transparent)]
    Vcs(#[from] VcsError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl BackboardError {
    pub fn is_missing_ref(&self) -> bool {
        matches!(self, Self::Vcs(err) if err.is_missing_ref())
    }
}
