//! Shared state for the report API.

use std::sync::Arc;

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::pipeline::processor::ReportPipeline;

/// State handed to every handler. Cheap to clone; the pipeline and its
/// capability clients are shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReportPipeline>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: Arc<ReportPipeline>) -> Self {
        Self {
            pipeline,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
