//! Report simplification endpoint.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::AppState;
use crate::pipeline::safety::types::VerifiedResult;

/// Multipart field carrying the report image.
pub const FILE_FIELD: &str = "file";

/// `POST /simplify_report/`: multipart upload of one report image.
///
/// Returns `{tests, summary, warnings?, status}`. Other form fields are
/// ignored; if `file` appears more than once the last one wins.
pub async fn simplify(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VerifiedResult>, ApiError> {
    let mut multipart = multipart?;
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let bytes = field.bytes().await?;
        tracing::info!(bytes = bytes.len(), "Report upload received");
        image = Some(bytes.to_vec());
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("No file provided".into()))?;
    let result = Arc::clone(&state.pipeline).run_detached(image).await?;

    Ok(Json(result))
}
