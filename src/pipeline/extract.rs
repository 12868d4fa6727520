use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Triple-backtick fences with an optional language tag (```json, ```JSON, ```).
static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_-]*").expect("fence pattern is valid"));

/// Recover a single JSON object from model output.
///
/// Direct parse first; otherwise strip code fences, trim, and parse the span
/// from the first `{` to the last `}`. Anything else yields `None`.
pub fn extract_json(raw: &str) -> Option<Value> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(raw) {
        return Some(value);
    }

    let cleaned = FENCE.replace_all(raw, "");
    let cleaned = cleaned.trim();

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&cleaned[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}
