use std::sync::Arc;

use image::GenericImageView;

use super::types::{OcrConfig, OcrEngine, RawReportText};
use super::ExtractionError;

/// Turns an uploaded image payload into raw report text.
///
/// Decodes the bytes, then runs the OCR engine exactly once with the fixed
/// single-column configuration. Blank output is returned as-is; deciding
/// whether it is terminal belongs to the caller.
///
/// This is synchronous and CPU-bound. Async callers must run it on the
/// blocking pool.
pub struct ReportTextExtractor {
    ocr_engine: Arc<dyn OcrEngine>,
    config: OcrConfig,
}

impl ReportTextExtractor {
    pub fn new(ocr_engine: Arc<dyn OcrEngine>, config: OcrConfig) -> Self {
        Self { ocr_engine, config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    pub fn extract(&self, image_bytes: &[u8]) -> Result<RawReportText, ExtractionError> {
        if image_bytes.is_empty() {
            return Err(ExtractionError::ImageDecode("empty payload".into()));
        }

        let image = image::load_from_memory(image_bytes)
            .map_err(|e| ExtractionError::ImageDecode(e.to_string()))?;

        let (width, height) = image.dimensions();
        tracing::info!(
            width,
            height,
            bytes = image_bytes.len(),
            "Running OCR on report image"
        );

        let text = RawReportText::new(self.ocr_engine.ocr_image(&image, &self.config)?);

        if text.is_blank() {
            tracing::warn!("OCR produced no text");
        } else {
            tracing::info!(chars = text.char_count(), "OCR text extracted");
        }

        Ok(text)
    }
}
