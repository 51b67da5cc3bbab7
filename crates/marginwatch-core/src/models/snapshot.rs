use serde::{Deserialize, Serialize};

use crate::constants::{FEED_LP_FIELD, FEED_MARGIN_FIELD};

/// One LP account as reported by the feed.
///
/// `record` is the untouched upstream object; only the LP id and the margin
/// utilization are interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub lp_id: String,
    pub margin_level: f64,
    pub record: serde_json::Value,
}

impl AccountSnapshot {
    /// Build a snapshot with a minimal synthetic record.
    pub fn new(lp_id: impl Into<String>, margin_level: f64) -> Self {
        let lp_id = lp_id.into();
        let mut record = serde_json::Map::new();
        record.insert(FEED_LP_FIELD.to_string(), lp_id.clone().into());
        record.insert(FEED_MARGIN_FIELD.to_string(), margin_level.into());
        Self {
            lp_id,
            margin_level,
            record: record.into(),
        }
    }

    /// Interpret an upstream account object.
    ///
    /// The margin may arrive as a number or a numeric string. Returns the
    /// reason when the record cannot be used.
    pub fn from_record(record: serde_json::Value) -> Result<Self, String> {
        let lp_id = match record.get(FEED_LP_FIELD) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => return Err(format!("missing or empty '{FEED_LP_FIELD}'")),
        };
        let margin_level = match record.get(FEED_MARGIN_FIELD) {
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            Some(serde_json::Value::String(s)) => s.trim().trim_end_matches('%').parse().ok(),
            _ => None,
        }
        .filter(|m: &f64| m.is_finite())
        .ok_or_else(|| format!("missing or non-numeric '{FEED_MARGIN_FIELD}' for {lp_id}"))?;

        Ok(Self {
            lp_id,
            margin_level,
            record,
        })
    }
}
