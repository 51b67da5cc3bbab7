//! Upstream payload decoding.

use marginwatch_core::errors::{AnalysisError, FeedError};
use marginwatch_core::models::{AccountSnapshot, AnalysisResponse};

/// Interpret a feed payload as a list of account snapshots.
///
/// A bare object is treated as a one-element list. Records without a usable
/// LP id or margin are skipped with a warning.
pub fn decode_accounts(payload: serde_json::Value) -> Vec<AccountSnapshot> {
    let records = match payload {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Null => Vec::new(),
        other => vec![other],
    };

    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match AccountSnapshot::from_record(record) {
            Ok(snapshot) => Some(snapshot),
            Err(reason) => {
                tracing::warn!(index, reason = %reason, "skipping unusable feed record");
                None
            }
        })
        .collect()
}

/// Parse a raw feed body.
pub fn decode_accounts_body(body: &str) -> Result<Vec<AccountSnapshot>, FeedError> {
    let payload: serde_json::Value = serde_json::from_str(body).map_err(|e| FeedError::Decode {
        reason: e.to_string(),
    })?;
    Ok(decode_accounts(payload))
}

/// Parse an analysis engine body.
pub fn decode_analysis_response(body: &str) -> Result<AnalysisResponse, AnalysisError> {
    serde_json::from_str(body).map_err(|e| AnalysisError::Decode {
        reason: e.to_string(),
    })
}

/// Pull `access_token` out of an auth response.
pub(crate) fn decode_access_token(body: &str) -> Result<String, FeedError> {
    let parsed: serde_json::Value = serde_json::from_str(body).map_err(|e| FeedError::Decode {
        reason: format!("invalid auth response: {e}"),
    })?;
    parsed
        .get("access_token")
        .and_then(|v| v.as_str())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FeedError::Decode {
            reason: "no access_token in auth response".into(),
        })
}
