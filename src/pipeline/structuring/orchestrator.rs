use std::sync::Arc;

use super::classify::classify_response;
use super::parser::parse_candidate;
use super::prompt::build_report_prompt;
use super::schema::REPORT_RESPONSE_SCHEMA;
use super::types::{CandidateResult, GenerationParams, GenerationRequest, LlmClient};
use super::GenerationError;
use crate::pipeline::extraction::RawReportText;

/// Turns raw OCR text into a typed candidate result:
/// prompt → schema-constrained generation → classify → parse.
///
/// One attempt per call. Any failure maps to a `GenerationError` bucket.
pub struct StructuredExtractor {
    llm: Arc<dyn LlmClient>,
    params: GenerationParams,
}

impl StructuredExtractor {
    pub fn new(llm: Arc<dyn LlmClient>, params: GenerationParams) -> Self {
        Self { llm, params }
    }

    pub async fn extract_structured(
        &self,
        raw_text: &RawReportText,
    ) -> Result<CandidateResult, GenerationError> {
        let request = GenerationRequest {
            prompt: build_report_prompt(raw_text.as_str()),
            response_schema: REPORT_RESPONSE_SCHEMA.clone(),
            params: self.params.clone(),
        };

        let response = self.llm.generate(&request).await.map_err(|e| {
            tracing::error!(error = %e, "Generation call failed");
            GenerationError::from(e)
        })?;

        let text = classify_response(response).inspect_err(|e| {
            tracing::warn!(reason = e.reason().as_str(), error = %e, "Generation did not complete");
        })?;

        let candidate = parse_candidate(&text).inspect_err(|e| {
            tracing::warn!(error = %e, "Generation output rejected");
        })?;

        if !candidate.explanations.is_empty() {
            tracing::debug!(
                count = candidate.explanations.len(),
                "Model emitted explanations; they are not surfaced"
            );
        }
        tracing::info!(tests = candidate.tests.len(), "Structured extraction complete");

        Ok(candidate)
    }
}
