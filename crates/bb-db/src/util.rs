use bb_core::error::StoreError;
use bb_vcs::{Fingerprint, Sha};
use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width UTC timestamps, so text order is time order.
pub fn to_rfc3339(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn from_rfc3339(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::Decode {
            message: format!("invalid timestamp: {value}"),
        })
}

pub fn query_error(err: rusqlite::Error) -> StoreError {
    StoreError::Query {
        message: err.to_string(),
    }
}

pub fn decode_sha(bytes: &[u8]) -> Result<Sha, StoreError> {
    Sha::from_bytes(bytes).map_err(|err| StoreError::Decode {
        message: err.to_string(),
    })
}

pub fn decode_fingerprint(bytes: &[u8]) -> Result<Fingerprint, StoreError> {
    Fingerprint::from_bytes(bytes).map_err(|err| StoreError::Decode {
        message: err.to_string(),
    })
}

/// Decodes a `json_group_array` of labels. Pull requests without labels
/// come out of the left join as `[null]`.
pub fn decode_labels(json: &str) -> Result<Vec<String>, StoreError> {
    let labels: Vec<Option<String>> =
        serde_json::from_str(json).map_err(|err| StoreError::Decode {
            message: err.to_string(),
        })?;
    let mut labels: Vec<String> = labels.into_iter().flatten().collect();
    labels.sort();
    labels.dedup();
    Ok(labels)
}
