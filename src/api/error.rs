//! API error types with structured JSON responses.

use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::processor::PipelineError;
use crate::pipeline::structuring::GenerationFailureReason;

/// Error response body: `{"detail": ..., "reason"?: ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<GenerationFailureReason>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Upload too large")]
    PayloadTooLarge,
    #[error("{message}")]
    Generation {
        reason: GenerationFailureReason,
        message: String,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail, reason) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail, None),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Uploaded file exceeds the size limit".to_string(),
                None,
            ),
            ApiError::Generation { reason, message } => {
                tracing::error!(reason = reason.as_str(), "Report generation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message, Some(reason))
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorBody { detail, reason })).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Extraction(_) | PipelineError::NoTextExtracted => {
                tracing::warn!(error = %err, "Rejected report image");
                ApiError::BadRequest(err.to_string())
            }
            PipelineError::Generation(e) => ApiError::Generation {
                reason: e.reason(),
                message: e.to_string(),
            },
            PipelineError::TaskJoin(_) | PipelineError::Init(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            tracing::warn!("Failed to read multipart upload: {err}");
            ApiError::BadRequest(err.body_text())
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        tracing::warn!("Rejected non-multipart upload: {rejection}");
        ApiError::BadRequest(rejection.body_text())
    }
}
