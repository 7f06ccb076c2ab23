use std::io::Write;
use std::path::Path;
use std::process::Command;

use quickscan_core::PageImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to open document: {0}")]
    Open(String),
    #[error("Failed to decode rendered page {page}: {reason}")]
    PageDecode { page: usize, reason: String },
    #[error("pdftoppm not found (install poppler-utils)")]
    NotAvailable,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstraction over a PDF page rasterizer: document bytes in, decoded pages
/// out in document order. A failure to open the document is reportable but
/// never fatal to the session — callers treat it as zero pages yielded.
pub trait PdfRasterizer: Send + Sync {
    fn render(&self, pdf_bytes: &[u8]) -> Result<Vec<PageImage>, RenderError>;
}

// ── Mock rasterizer (tests) ───────────────────────────────────────────────────

/// Returns a preset page sequence regardless of input. An empty preset models
/// a document that fails to open.
pub struct MockRasterizer {
    pages: Vec<image::DynamicImage>,
}

impl MockRasterizer {
    pub fn new(pages: Vec<image::DynamicImage>) -> Self {
        Self { pages }
    }

    pub fn empty() -> Self {
        Self { pages: Vec::new() }
    }
}

impl PdfRasterizer for MockRasterizer {
    fn render(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageImage>, RenderError> {
        Ok(self
            .pages
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, img)| PageImage::new(i, img))
            .collect())
    }
}

// ── Poppler rasterizer (system binary) ────────────────────────────────────────

/// Rasterizes via the `pdftoppm` command-line binary from poppler-utils,
/// rendering every page to PNG in a scratch directory and reading them back
/// in page-number order.
pub struct PopplerRasterizer {
    dpi: u32,
}

impl PopplerRasterizer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }
}

impl Default for PopplerRasterizer {
    fn default() -> Self {
        Self::new(150)
    }
}

impl PdfRasterizer for PopplerRasterizer {
    fn render(&self, pdf_bytes: &[u8]) -> Result<Vec<PageImage>, RenderError> {
        let scratch = tempfile::tempdir()?;
        let pdf_path = scratch.path().join("input.pdf");
        let mut file = std::fs::File::create(&pdf_path)?;
        file.write_all(pdf_bytes)?;
        file.flush()?;

        let prefix = scratch.path().join("page");
        let output = Command::new("pdftoppm")
            .args(["-png", "-r", &self.dpi.to_string()])
            .arg(&pdf_path)
            .arg(&prefix)
            .output();

        match output {
            Ok(out) if out.status.success() => collect_pages(scratch.path()),
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                Err(RenderError::Open(format!("pdftoppm failed: {stderr}")))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RenderError::NotAvailable),
            Err(e) => Err(RenderError::Io(e)),
        }
    }
}

/// Read back `page-N.png` files in ascending page order. pdftoppm zero-pads
/// the page number to the document's width, so a lexical sort of the file
/// names is also the numeric order.
fn collect_pages(dir: &Path) -> Result<Vec<PageImage>, RenderError> {
    let mut names: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("png"))
        .collect();
    names.sort();

    let mut pages = Vec::with_capacity(names.len());
    for (index, path) in names.iter().enumerate() {
        let img = image::open(path).map_err(|e| RenderError::PageDecode {
            page: index,
            reason: e.to_string(),
        })?;
        pages.push(PageImage::new(index, img));
    }
    Ok(pages)
}
