use std::path::{Path, PathBuf};
use std::sync::Arc;

use quickscan_core::{PageImage, Session, SourceKind};
use quickscan_pdf::{PdfRasterizer, RenderError};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use crate::preprocess::{self, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported source: {0}")]
    UnsupportedSource(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),
    #[error("Document render failed: {0}")]
    Render(#[from] RenderError),
    #[error("Page preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("Recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("Recognition task aborted: {0}")]
    Task(String),
}

/// What one source submission did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    /// Pages that entered the pipeline (and the image count).
    pub pages: usize,
    /// Pages whose recognition failed. Never fatal; the other pages' text is
    /// unaffected.
    pub failed: usize,
}

/// Orchestrates: source → page acquisition → per-page recognition →
/// page-ordered accumulation into the session.
///
/// Pages are recognized concurrently and may complete in any order; each
/// completion lands in the slot reserved for it at submission, so the
/// assembled text always reads in page order.
pub struct DocumentPipeline<R, P> {
    recognizer: Arc<R>,
    rasterizer: P,
}

impl<R, P> DocumentPipeline<R, P>
where
    R: OcrBackend + 'static,
    P: PdfRasterizer,
{
    pub fn new(recognizer: R, rasterizer: P) -> Self {
        Self { recognizer: Arc::new(recognizer), rasterizer }
    }

    /// Acquire pages from a picked file: one page for an image source, the
    /// rendered page sequence for a PDF source.
    pub async fn load_pages(&self, path: &Path) -> Result<Vec<PageImage>, PipelineError> {
        match SourceKind::classify(path) {
            Some(SourceKind::Image) => {
                let img = image::open(path)?;
                Ok(vec![PageImage::new(0, img)])
            }
            Some(SourceKind::Pdf) => {
                let bytes = tokio::fs::read(path).await?;
                Ok(self.rasterizer.render(&bytes)?)
            }
            None => Err(PipelineError::UnsupportedSource(path.to_path_buf())),
        }
    }

    /// Submit pages for recognition and wait for every slot to be filled or
    /// accounted for. Slots are reserved up front in page order under a
    /// single lock; recognition then runs concurrently.
    pub async fn process_pages(
        &self,
        session: &Arc<Mutex<Session>>,
        pages: Vec<PageImage>,
    ) -> PipelineReport {
        let report = PipelineReport { pages: pages.len(), failed: 0 };

        let tickets = {
            let mut s = session.lock().await;
            pages.iter().map(|_| s.submit_page()).collect::<Vec<_>>()
        };

        let mut tasks = JoinSet::new();
        for (page, ticket) in pages.into_iter().zip(tickets) {
            let recognizer = Arc::clone(&self.recognizer);
            let session = Arc::clone(session);
            tasks.spawn(async move {
                let recognized: Result<String, PipelineError> =
                    tokio::task::spawn_blocking(move || {
                        let png = preprocess::prepare_page(page.image())?;
                        Ok(recognizer.recognize(&png)?)
                    })
                    .await
                    .unwrap_or_else(|e| Err(PipelineError::Task(e.to_string())));

                let mut s = session.lock().await;
                match recognized {
                    Ok(text) => {
                        s.complete_page(ticket, text);
                        false
                    }
                    Err(err) => {
                        tracing::warn!(page = ticket.index(), "recognition failed: {err}");
                        s.fail_page(ticket);
                        true
                    }
                }
            });
        }

        let mut failed = 0;
        while let Some(joined) = tasks.join_next().await {
            if joined.unwrap_or(true) {
                failed += 1;
            }
        }
        PipelineReport { failed, ..report }
    }

    /// `load_pages` + `process_pages` for a single picked file.
    pub async fn process_path(
        &self,
        session: &Arc<Mutex<Session>>,
        path: &Path,
    ) -> Result<PipelineReport, PipelineError> {
        let pages = self.load_pages(path).await?;
        if pages.is_empty() {
            tracing::warn!("{} yielded no pages", path.display());
        }
        Ok(self.process_pages(session, pages).await)
    }
}

// ── Intake-folder integration ─────────────────────────────────────────────────

/// Spawn a notify watcher on `watch_dir` that sends newly created file paths
/// to `tx`. Returns the watcher — it must be kept alive for watching to
/// continue.
pub fn spawn_intake_watcher(
    watch_dir: &Path,
    tx: mpsc::Sender<PathBuf>,
) -> notify::Result<impl notify::Watcher> {
    use notify::{EventKind, RecursiveMode, Watcher};

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        if let Ok(ev) = event {
            if matches!(ev.kind, EventKind::Create(_)) {
                for path in ev.paths {
                    let _ = tx.try_send(path);
                }
            }
        }
    })?;

    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
