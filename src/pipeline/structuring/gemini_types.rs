//! Wire types for the Generative Language API `generateContent` call.
//!
//! Only the fields the report pipeline reads or writes are modelled; unknown
//! response fields are ignored.

use serde::{Deserialize, Serialize};

use super::types::{FinishReason, GenerationParams, LlmResponse};

// ──────────────────────────────────────────────
// Request
// ──────────────────────────────────────────────

/// Harm categories whose threshold is relaxed. Medical reports mention
/// anatomy, drugs and disease, which trips default thresholds.
pub const RELAXED_SAFETY_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

pub const RELAXED_SAFETY_THRESHOLD: &str = "BLOCK_ONLY_HIGH";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerateContentRequest {
    /// A single-turn user prompt with schema-constrained JSON output.
    pub fn new(prompt: &str, schema: &serde_json::Value, params: &GenerationParams) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                top_p: params.top_p,
                top_k: params.top_k,
                max_output_tokens: params.max_output_tokens,
                response_mime_type: params.response_mime_type.clone(),
                response_schema: schema.clone(),
            },
            safety_settings: RELAXED_SAFETY_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: category.to_string(),
                    threshold: RELAXED_SAFETY_THRESHOLD.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

// ──────────────────────────────────────────────
// Response
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Collapse to the provider-neutral response: first candidate only, its
    /// text parts concatenated.
    pub fn into_llm_response(self) -> LlmResponse {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return LlmResponse {
                text: None,
                finish_reason: None,
                block_reason,
            };
        };

        let text = candidate.content.map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        });

        LlmResponse {
            text,
            finish_reason: candidate.finish_reason,
            block_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_camel_case_config() {
        let schema = json!({"type": "OBJECT"});
        let req = GenerateContentRequest::new("hello", &schema, &GenerationParams::default());
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        let config = &value["generationConfig"];
        assert_eq!(config["topK"], 1);
        assert_eq!(config["maxOutputTokens"], 8192);
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"], schema);
        assert_eq!(value["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(value["safetySettings"][0]["threshold"], "BLOCK_ONLY_HIGH");
    }

    #[test]
    fn response_concatenates_text_parts() {
        let body = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"tests\":"}, {"text": "[]}"}]},
                "finishReason": "STOP",
                "safetyRatings": []
            }],
            "usageMetadata": {"totalTokenCount": 10}
        });
        let resp: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let llm = resp.into_llm_response();
        assert_eq!(llm.text.as_deref(), Some("{\"tests\":[]}"));
        assert_eq!(llm.finish_reason, Some(FinishReason::Stop));
        assert!(llm.block_reason.is_none());
    }

    #[test]
    fn blocked_prompt_has_no_candidates() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let resp: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let llm = resp.into_llm_response();
        assert_eq!(llm.block_reason.as_deref(), Some("SAFETY"));
        assert!(llm.text.is_none());
    }

    #[test]
    fn safety_candidate_without_content() {
        let body = json!({"candidates": [{"finishReason": "SAFETY"}]});
        let resp: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let llm = resp.into_llm_response();
        assert_eq!(llm.finish_reason, Some(FinishReason::Safety));
        assert!(llm.text.is_none());
    }
}
