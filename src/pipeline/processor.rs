//! Report pipeline orchestrator.
//!
//! Single entry point that drives one request end to end:
//! OCR → structured generation → guardrail verification.
//!
//! Capabilities (OCR engine, LLM client, similarity) are injected through
//! traits so the pipeline runs against mocks in tests.

use std::path::Path;
use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::pipeline::extraction::ocr::TesseractCli;
use crate::pipeline::extraction::orchestrator::ReportTextExtractor;
use crate::pipeline::extraction::types::OcrConfig;
use crate::pipeline::extraction::ExtractionError;
use crate::pipeline::safety::grounding::ResultGuardrail;
use crate::pipeline::safety::types::VerifiedResult;
use crate::pipeline::structuring::gemini::GeminiClient;
use crate::pipeline::structuring::orchestrator::StructuredExtractor;
use crate::pipeline::structuring::types::GenerationParams;
use crate::pipeline::structuring::GenerationError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to extract text from the image: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("{0}")]
    Generation(#[from] GenerationError),

    #[error("No text could be extracted from the image")]
    NoTextExtracted,

    #[error("Pipeline task failed: {0}")]
    TaskJoin(String),

    #[error("Pipeline initialization failed: {0}")]
    Init(String),
}

impl PipelineError {
    /// True when the caller's input is at fault rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Extraction(_) | Self::NoTextExtracted)
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Orchestrates one report: extract → structure → verify.
///
/// Stages run sequentially with no retries. Extraction and generation
/// failures end the run; the guardrail never fails.
pub struct ReportPipeline {
    text_extractor: Arc<ReportTextExtractor>,
    structured_extractor: StructuredExtractor,
    guardrail: ResultGuardrail,
}

impl ReportPipeline {
    pub fn new(
        text_extractor: ReportTextExtractor,
        structured_extractor: StructuredExtractor,
        guardrail: ResultGuardrail,
    ) -> Self {
        Self {
            text_extractor: Arc::new(text_extractor),
            structured_extractor,
            guardrail,
        }
    }

    pub async fn run(&self, image_bytes: Vec<u8>) -> Result<VerifiedResult, PipelineError> {
        let span = tracing::info_span!("report", request_id = %Uuid::new_v4());
        self.run_stages(image_bytes).instrument(span).await
    }

    /// Run on a separate task so that dropping the returned future (for
    /// example when the HTTP client disconnects) cancels neither OCR nor
    /// generation. The run completes and its result is discarded.
    pub async fn run_detached(
        self: Arc<Self>,
        image_bytes: Vec<u8>,
    ) -> Result<VerifiedResult, PipelineError> {
        tokio::spawn(async move { self.run(image_bytes).await })
            .await
            .map_err(|e| PipelineError::TaskJoin(e.to_string()))?
    }

    async fn run_stages(&self, image_bytes: Vec<u8>) -> Result<VerifiedResult, PipelineError> {
        tracing::info!(bytes = image_bytes.len(), "Processing: starting extraction");

        // OCR is CPU-bound and shells out; keep it off the async workers.
        let extractor = Arc::clone(&self.text_extractor);
        let raw_text = tokio::task::spawn_blocking(move || extractor.extract(&image_bytes))
            .await
            .map_err(|e| PipelineError::TaskJoin(e.to_string()))??;

        if raw_text.is_blank() {
            return Err(PipelineError::NoTextExtracted);
        }

        tracing::info!(chars = raw_text.char_count(), "Processing: starting structuring");
        let candidate = self.structured_extractor.extract_structured(&raw_text).await?;

        let verified = self.guardrail.verify(&candidate, &raw_text);

        tracing::info!(
            tests = verified.tests().len(),
            warnings = verified.warnings().map_or(0, <[String]>::len),
            "Processing complete"
        );

        Ok(verified)
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Build a `ReportPipeline` with production implementations.
///
/// - OCR: `TesseractCli` (`--oem 3 --psm 4`)
/// - LLM: `GeminiClient` → `StructuredExtractor`
/// - Guardrail: normalized Levenshtein at the default threshold
///
/// A missing Tesseract binary is only logged; requests will then fail with
/// an extraction error instead of taking the service down.
pub fn build_pipeline(config: &AppConfig) -> Result<ReportPipeline, PipelineError> {
    let mut tesseract = TesseractCli::new(&config.tesseract_binary);
    if let Some(ref dir) = config.tessdata_prefix {
        tesseract = tesseract.with_tessdata(Path::new(dir));
    }
    match tesseract.version() {
        Ok(version) => tracing::info!(binary = tesseract.binary(), %version, "Tesseract OCR available"),
        Err(e) => tracing::warn!(binary = tesseract.binary(), error = %e, "Tesseract OCR unavailable"),
    }

    let text_extractor = ReportTextExtractor::new(
        Arc::new(tesseract),
        OcrConfig::single_column_report(&config.ocr_lang),
    );

    let gemini = GeminiClient::new(
        &config.gemini_base_url,
        &config.gemini_model,
        &config.gemini_api_key,
        config.gemini_timeout_secs,
    )
    .map_err(|e| PipelineError::Init(e.to_string()))?;
    tracing::info!(model = gemini.model(), "Report pipeline using LLM model");

    let structured_extractor =
        StructuredExtractor::new(Arc::new(gemini), GenerationParams::deterministic_json());

    Ok(ReportPipeline::new(
        text_extractor,
        structured_extractor,
        ResultGuardrail::default(),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
