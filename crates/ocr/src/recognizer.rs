use std::io::Write;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("tesseract not found (install tesseract-ocr)")]
    NotAvailable,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstraction over a text-recognition engine.
/// Implementations accept PNG image bytes and return the recognized text.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set string for every page — lets the pipeline and session
/// logic be tested without an OCR engine installed.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── Tesseract backend (system binary) ─────────────────────────────────────────

/// Drives the `tesseract` command-line binary. No library linkage; if the
/// binary is missing the first `recognize` call reports `NotAvailable`.
pub struct TesseractRecognizer {
    lang: String,
}

impl TesseractRecognizer {
    pub fn new(lang: &str) -> Self {
        Self { lang: lang.to_string() }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("eng")
    }
}

impl OcrBackend for TesseractRecognizer {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        let mut input = tempfile::Builder::new()
            .prefix("quickscan-page-")
            .suffix(".png")
            .tempfile()?;
        input.write_all(image_bytes)?;
        input.flush()?;

        let output = Command::new("tesseract")
            .arg(input.path())
            .arg("stdout")
            .args(["-l", &self.lang])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(OcrError::Engine(format!("tesseract failed: {stderr}")))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OcrError::NotAvailable),
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}
