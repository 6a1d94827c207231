pub mod types;
pub mod ocr;
pub mod orchestrator;

pub use types::*;
pub use ocr::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid image file: {0}")]
    ImageDecode(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Tesseract OCR initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("Text encoding error: {0}")]
    EncodingError(String),
}
