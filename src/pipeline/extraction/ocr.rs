use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use image::{DynamicImage, ImageFormat};

use super::types::{OcrConfig, OcrEngine};
use super::ExtractionError;

/// Tesseract OCR engine driven through the `tesseract` command-line binary.
///
/// The image is written to a temporary PNG and recognised with
/// `tesseract <png> stdout --oem N --psm N -l LANG`.
pub struct TesseractCli {
    binary: String,
    tessdata_dir: Option<PathBuf>,
}

impl TesseractCli {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
            tessdata_dir: None,
        }
    }

    /// Point Tesseract at a specific tessdata directory (`TESSDATA_PREFIX`).
    pub fn with_tessdata(mut self, dir: &Path) -> Self {
        if dir.exists() {
            self.tessdata_dir = Some(dir.to_path_buf());
        } else {
            tracing::warn!(
                path = %dir.display(),
                "Tessdata directory not found, using Tesseract default"
            );
        }
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Query `tesseract --version`. Used at startup to fail fast when the
    /// binary is missing.
    pub fn version(&self) -> Result<String, ExtractionError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map_err(|e| ExtractionError::OcrInit(format!("cannot run {}: {e}", self.binary)))?;

        // Older releases print the banner on stderr.
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };

        banner
            .lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .ok_or_else(|| ExtractionError::OcrInit("empty version banner".into()))
    }

    fn build_command(&self, image_path: &Path, config: &OcrConfig) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(image_path)
            .arg("stdout")
            .arg("--oem")
            .arg(config.engine_mode.to_string())
            .arg("--psm")
            .arg(config.page_segmentation.to_string())
            .arg("-l")
            .arg(&config.language);

        if let Some(ref dir) = self.tessdata_dir {
            cmd.env("TESSDATA_PREFIX", dir);
        }
        cmd
    }
}

impl OcrEngine for TesseractCli {
    fn ocr_image(
        &self,
        image: &DynamicImage,
        config: &OcrConfig,
    ) -> Result<String, ExtractionError> {
        let start = Instant::now();

        let input = tempfile::Builder::new()
            .prefix("report-ocr-")
            .suffix(".png")
            .tempfile()?;

        image
            .save_with_format(input.path(), ImageFormat::Png)
            .map_err(|e| ExtractionError::ImageProcessing(format!("PNG re-encode failed: {e}")))?;

        let output = self
            .build_command(input.path(), config)
            .output()
            .map_err(|e| ExtractionError::OcrInit(format!("cannot run {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::OcrProcessing(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| ExtractionError::EncodingError(e.to_string()))?;

        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            psm = config.page_segmentation,
            chars = text.len(),
            "Tesseract recognition finished"
        );

        Ok(text)
    }
}

/// Mock OCR engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    pub text: String,
    pub failure: Option<String>,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            failure: None,
        }
    }

    /// An engine whose every call fails with `OcrProcessing`.
    pub fn failing(message: &str) -> Self {
        Self {
            text: String::new(),
            failure: Some(message.to_string()),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn ocr_image(
        &self,
        _image: &DynamicImage,
        _config: &OcrConfig,
    ) -> Result<String, ExtractionError> {
        match self.failure {
            Some(ref message) => Err(ExtractionError::OcrProcessing(message.clone())),
            None => Ok(self.text.clone()),
        }
    }
}
