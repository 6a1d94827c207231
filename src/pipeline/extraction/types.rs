use std::fmt;

use image::DynamicImage;
use serde::Serialize;

use super::ExtractionError;

/// Raw text recovered from a report image. May be empty or noisy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawReportText(String);

impl RawReportText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when OCR produced nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// Lowercased whitespace-delimited words, in source order.
    pub fn lowercase_words(&self) -> impl Iterator<Item = String> + '_ {
        self.0.split_whitespace().map(str::to_lowercase)
    }
}

impl fmt::Display for RawReportText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RawReportText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for RawReportText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

/// Tesseract OCR engine mode (`--oem`).
pub const OCR_ENGINE_MODE: u8 = 3;

/// Tesseract page segmentation mode (`--psm`).
/// 4 = "assume a single column of text of variable sizes", which suits reports.
pub const PAGE_SEGMENTATION_MODE: u8 = 4;

/// Fixed OCR parameters. Not caller-controlled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub engine_mode: u8,
    pub page_segmentation: u8,
    pub language: String,
}

impl OcrConfig {
    /// Configuration tuned for single-column report pages.
    pub fn single_column_report(language: &str) -> Self {
        Self {
            engine_mode: OCR_ENGINE_MODE,
            page_segmentation: PAGE_SEGMENTATION_MODE,
            language: language.to_string(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::single_column_report("eng")
    }
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine: Send + Sync {
    fn ocr_image(&self, image: &DynamicImage, config: &OcrConfig)
        -> Result<String, ExtractionError>;
}
