pub mod types;
pub mod prompt;
pub mod schema;
pub mod parser;
pub mod classify;
pub mod gemini;
pub mod gemini_types;
pub mod orchestrator;

pub use types::*;
pub use prompt::*;
pub use schema::*;
pub use parser::*;
pub use classify::*;
pub use gemini::*;
pub use orchestrator::*;

use serde::Serialize;
use thiserror::Error;

/// Errors raised by a generation capability client before any response
/// content is available.
#[derive(Error, Debug)]
pub enum LlmClientError {
    #[error("Generation service unreachable at {0}")]
    Connection(String),

    #[error("Generation service returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

/// Coarse classification of a failed generation, exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationFailureReason {
    BlockedByPolicy,
    Truncated,
    Unknown,
}

impl GenerationFailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockedByPolicy => "blocked_by_policy",
            Self::Truncated => "truncated",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Failed to process the report: the response was blocked by safety filters ({0})")]
    BlockedByPolicy(String),

    #[error("Failed to process the report: the model's response was too long and was cut off")]
    Truncated,

    #[error("Failed to process the report with the AI model: {0}")]
    Unknown(String),
}

impl GenerationError {
    pub fn reason(&self) -> GenerationFailureReason {
        match self {
            Self::BlockedByPolicy(_) => GenerationFailureReason::BlockedByPolicy,
            Self::Truncated => GenerationFailureReason::Truncated,
            Self::Unknown(_) => GenerationFailureReason::Unknown,
        }
    }
}

impl From<LlmClientError> for GenerationError {
    fn from(err: LlmClientError) -> Self {
        GenerationError::Unknown(err.to_string())
    }
}
