use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;
use crate::transport::ApiResponse;

/// `detail` messages some toggle endpoints send instead of a 204.
const REMOVAL_SENTINELS: &[&str] = &[
    "unliked",
    "like removed",
    "bookmark removed",
    "unbookmarked",
    "removed",
    "deleted",
];

/// Result of a toggle endpoint: it either created the relation or removed
/// an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Created(u64),
    Removed,
}

impl ToggleOutcome {
    /// Interpret a successful toggle response.
    ///
    /// 204 or an empty body is a removal. A body carrying an `id` is a
    /// creation. A `detail` removal message is accepted but logged, since
    /// 204 is the only discriminant the client relies on.
    pub fn from_response(response: &ApiResponse) -> Result<Self, ApiError> {
        if response.status == 204 {
            return Ok(ToggleOutcome::Removed);
        }
        let body: Value = response.json()?;
        match &body {
            Value::Null => Ok(ToggleOutcome::Removed),
            Value::Object(map) => {
                if let Some(id) = map.get("id").and_then(as_id) {
                    return Ok(ToggleOutcome::Created(id));
                }
                match map.get("detail").and_then(Value::as_str) {
                    Some(detail) if is_removal(detail) => {
                        warn!(
                            status = response.status,
                            detail, "toggle removal signalled by detail message instead of 204"
                        );
                        Ok(ToggleOutcome::Removed)
                    }
                    _ => Err(ApiError::Decode(format!("unrecognised toggle response: {body}"))),
                }
            }
            _ => Err(ApiError::Decode(format!("unrecognised toggle response: {body}"))),
        }
    }

    pub fn created_id(self) -> Option<u64> {
        match self {
            ToggleOutcome::Created(id) => Some(id),
            ToggleOutcome::Removed => None,
        }
    }
}

fn is_removal(detail: &str) -> bool {
    let detail = detail.trim().trim_end_matches('.').to_ascii_lowercase();
    REMOVAL_SENTINELS.contains(&detail.as_str())
}

fn as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
