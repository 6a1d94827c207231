use serde::Deserialize;

use super::types::{CandidateResult, ExtractedTest};
use super::GenerationError;

/// Top-level shape the response must have. Individual tests are checked
/// separately so one bad item does not sink the whole response.
#[derive(Deserialize)]
struct RawCandidate {
    tests: Vec<serde_json::Value>,
    summary: String,
    #[serde(default)]
    explanations: Vec<serde_json::Value>,
}

/// Parse the model's JSON text into a candidate result.
///
/// Items in `tests` that miss a required field or carry the wrong type are
/// discarded here and never become candidates. A missing `tests` array or
/// `summary` makes the whole response malformed.
pub fn parse_candidate(response: &str) -> Result<CandidateResult, GenerationError> {
    let json_str = extract_json_block(response);
    if json_str.is_empty() {
        return Err(GenerationError::Unknown("model returned empty output".into()));
    }

    let raw: RawCandidate = serde_json::from_str(json_str)
        .map_err(|e| GenerationError::Unknown(format!("malformed model output: {e}")))?;

    let total = raw.tests.len();
    let tests: Vec<ExtractedTest> = parse_array_lenient(&raw.tests);
    if tests.len() < total {
        tracing::warn!(
            discarded = total - tests.len(),
            total,
            "Discarded test entries that do not satisfy the response schema"
        );
    }

    let explanations = raw
        .explanations
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    Ok(CandidateResult {
        tests,
        summary: raw.summary,
        explanations,
    })
}

/// With schema enforcement the response is bare JSON, but some models still
/// wrap it in a ```json fence. Accept both.
fn extract_json_block(response: &str) -> &str {
    let trimmed = response.trim();
    if let Some(start) = trimmed.find("```json") {
        let content_start = start + 7;
        if let Some(end) = trimmed[content_start..].find("```") {
            return trimmed[content_start..content_start + end].trim();
        }
        return trimmed[content_start..].trim();
    }
    if let Some(rest) = trimmed.strip_prefix("```") {
        return rest.strip_suffix("```").unwrap_or(rest).trim();
    }
    trimmed
}

/// Parse an array leniently and skip items that fail to deserialize.
fn parse_array_lenient<T: for<'de> Deserialize<'de>>(items: &[serde_json::Value]) -> Vec<T> {
    items
        .iter()
        .filter_map(|v| serde_json::from_value(v.clone()).ok())
        .collect()
}
