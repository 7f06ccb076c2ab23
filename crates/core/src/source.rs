use std::path::Path;

/// What kind of page source a picked file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A single raster image — yields exactly one page.
    Image,
    /// A PDF document — yields zero or more pages in document order.
    Pdf,
}

impl SourceKind {
    /// Classify a file by extension. Returns `None` for anything we cannot
    /// scan, which callers report as an unavailable source rather than an
    /// error that tears down the session.
    pub fn classify(path: &Path) -> Option<SourceKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "png" | "jpg" | "jpeg" | "webp" | "bmp" | "gif" | "tif" | "tiff" => {
                Some(SourceKind::Image)
            }
            _ => None,
        }
    }
}
