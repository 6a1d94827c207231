use super::types::{FinishReason, LlmResponse};
use super::GenerationError;

/// Map the capability's stop signals onto the three failure buckets and
/// return the response text when generation completed normally.
///
/// Order matters: a refused prompt wins over anything in the candidate, and a
/// truncated candidate is a failure even if it carries partial text.
pub fn classify_response(response: LlmResponse) -> Result<String, GenerationError> {
    if let Some(block_reason) = response.block_reason {
        return Err(GenerationError::BlockedByPolicy(format!("prompt: {block_reason}")));
    }

    match response.finish_reason {
        Some(reason) if reason.is_policy_block() => {
            return Err(GenerationError::BlockedByPolicy(reason.as_str().to_string()));
        }
        Some(FinishReason::MaxTokens) => return Err(GenerationError::Truncated),
        _ => {}
    }

    match response.text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenerationError::Unknown(match response.finish_reason {
            Some(reason) => format!("no content returned (finish reason {})", reason.as_str()),
            None => "no content returned".to_string(),
        })),
    }
}
