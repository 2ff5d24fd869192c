use axum::Json;
use axum::http::StatusCode;
use bb_core::error::{BackboardError, ReportError};
use bb_vcs::VcsError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
}

pub fn map_error(err: &BackboardError) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code) = match err {
        BackboardError::Vcs(vcs) => map_vcs_error(vcs),
        BackboardError::Report(report) => map_report_error(report),
        BackboardError::Service(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
        BackboardError::Store(_) | BackboardError::Config(_) | BackboardError::Internal { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    };

    (
        status,
        Json(ErrorEnvelope {
            code,
            message: err.to_string(),
        }),
    )
}

fn map_vcs_error(err: &VcsError) -> (StatusCode, &'static str) {
    match err {
        VcsError::Parse { .. } => (StatusCode::BAD_REQUEST, "invalid_input"),
        VcsError::MissingRef { .. } => (StatusCode::NOT_FOUND, "not_found"),
        VcsError::CommandFailed { .. } | VcsError::Spawn { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    }
}

fn map_report_error(err: &ReportError) -> (StatusCode, &'static str) {
    match err {
        ReportError::UnknownRepo { .. } | ReportError::UnknownBranch { .. } => {
            (StatusCode::NOT_FOUND, "not_found")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_per_error_kind() {
        let unknown = BackboardError::Report(ReportError::UnknownBranch {
            branch: "release-9".to_string(),
        });
        let (status, Json(envelope)) = map_error(&unknown);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(envelope.code, "not_found");
        assert_eq!(envelope.message, "branch not tracked: release-9");

        let invalid = BackboardError::Vcs(VcsError::Parse {
            reason: "bad hex".to_string(),
        });
        assert_eq!(map_error(&invalid).0, StatusCode::BAD_REQUEST);

        let internal = BackboardError::Internal {
            message: "disk full".to_string(),
        };
        assert_eq!(map_error(&internal).0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
