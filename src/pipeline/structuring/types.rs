use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::LlmClientError;

/// Interpretation of a test value against its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[serde(alias = "High", alias = "HIGH")]
    High,
    #[serde(alias = "Normal", alias = "NORMAL")]
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
}

/// A single lab test as produced by the generation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTest {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_range: Option<ReferenceRange>,
}

/// Unverified generation output. Lives only between structuring and the
/// guardrail; never returned to a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateResult {
    pub tests: Vec<ExtractedTest>,
    pub summary: String,
    /// Kept for models that emit it despite the prompt. Never surfaced.
    pub explanations: Vec<String>,
}

/// Sampling parameters for the generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl GenerationParams {
    /// Low-variance settings with JSON output.
    pub fn deterministic_json() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.95,
            top_k: 1,
            max_output_tokens: 8192,
            response_mime_type: "application/json".to_string(),
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::deterministic_json()
    }
}

/// Everything the capability needs for one call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub response_schema: serde_json::Value,
    pub params: GenerationParams,
}

/// Why the model stopped producing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Blocklist,
    ProhibitedContent,
    Spii,
    #[serde(other)]
    Other,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "STOP",
            Self::MaxTokens => "MAX_TOKENS",
            Self::Safety => "SAFETY",
            Self::Recitation => "RECITATION",
            Self::Blocklist => "BLOCKLIST",
            Self::ProhibitedContent => "PROHIBITED_CONTENT",
            Self::Spii => "SPII",
            Self::Other => "OTHER",
        }
    }

    /// Reasons raised by the provider's content policy layer.
    pub fn is_policy_block(&self) -> bool {
        matches!(
            self,
            Self::Safety | Self::Recitation | Self::Blocklist | Self::ProhibitedContent | Self::Spii
        )
    }
}

/// Provider-neutral view of a generation response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmResponse {
    pub text: Option<String>,
    pub finish_reason: Option<FinishReason>,
    /// Set when the prompt itself was refused.
    pub block_reason: Option<String>,
}

impl LlmResponse {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            finish_reason: Some(FinishReason::Stop),
            block_reason: None,
        }
    }
}

/// Generative text capability (allows mocking).
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse, LlmClientError>;
}
