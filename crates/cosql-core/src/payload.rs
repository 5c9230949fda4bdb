use serde_json::Value;

use crate::error::FetchError;

pub const METRICS_LABEL: &str = "Query Metrics";

/// Re-indents a JSON document for display, keeping key order.
pub fn pretty_json(content: &str) -> Result<String, FetchError> {
    let value: Value =
        serde_json::from_str(content).map_err(|err| FetchError::Payload(err.to_string()))?;
    serde_json::to_string_pretty(&value).map_err(|err| FetchError::Payload(err.to_string()))
}

/// Every entry stored under `label` anywhere in the diagnostics tree, in
/// document order.
pub fn labeled_entries(diagnostics: &str, label: &str) -> Result<Vec<String>, FetchError> {
    let value: Value =
        serde_json::from_str(diagnostics).map_err(|err| FetchError::Payload(err.to_string()))?;
    let mut out = Vec::new();
    collect_labeled(&value, label, &mut out);
    Ok(out)
}

pub fn query_metrics(diagnostics: Option<&str>) -> Result<Vec<String>, FetchError> {
    match diagnostics {
        Some(diagnostics) => labeled_entries(diagnostics, METRICS_LABEL),
        None => Ok(Vec::new()),
    }
}

fn collect_labeled(value: &Value, label: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == label {
                    out.push(match child {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                } else {
                    collect_labeled(child, label, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_labeled(item, label, out);
            }
        }
        _ => {}
    }
}
