use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use quickscan_core::{PageImage, Session};
use quickscan_ocr::{DocumentPipeline, Extractor, TesseractRecognizer};
use quickscan_pdf::{export_file_name, save_pdf, PopplerRasterizer};
use quickscan_speech::{CommandSpeaker, SpeechEngine};
use tokio::sync::{mpsc, Mutex};

pub struct ScanOptions {
    pub json: bool,
    pub fields: bool,
    pub speak: bool,
    pub export: Option<PathBuf>,
}

fn pipeline() -> DocumentPipeline<TesseractRecognizer, PopplerRasterizer> {
    DocumentPipeline::new(TesseractRecognizer::default(), PopplerRasterizer::default())
}

pub async fn scan(inputs: Vec<PathBuf>, opts: ScanOptions) -> anyhow::Result<()> {
    if inputs.is_empty() {
        bail!("no inputs given");
    }

    let pipeline = pipeline();
    let session = Arc::new(Mutex::new(Session::new()));
    let mut captured: Vec<PageImage> = Vec::new();

    for input in &inputs {
        match pipeline.load_pages(input).await {
            Ok(pages) => {
                if opts.export.is_some() {
                    captured.extend(pages.iter().cloned());
                }
                let report = pipeline.process_pages(&session, pages).await;
                if report.failed > 0 {
                    tracing::warn!(
                        "{}: {} of {} page(s) failed recognition",
                        input.display(),
                        report.failed,
                        report.pages
                    );
                }
            }
            // Unreadable sources are skipped; the session keeps what it has.
            Err(err) => tracing::warn!("skipping {}: {err}", input.display()),
        }
    }

    let snapshot = session.lock().await.snapshot();
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        if snapshot.text.is_empty() {
            println!("No text found.");
        } else {
            println!("{}", snapshot.text);
        }
        eprintln!("pages: {}  words: {}", snapshot.image_count, snapshot.word_count);
    }

    if opts.fields {
        let listing = Extractor::extract(&snapshot.text);
        println!("{}", serde_json::to_string_pretty(&listing)?);
    }

    if let Some(path) = opts.export {
        // The session only keeps text; the export re-indexes the captured
        // pages into one continuous document.
        let pages: Vec<PageImage> = captured
            .into_iter()
            .enumerate()
            .map(|(i, p)| PageImage::new(i, p.into_image()))
            .collect();
        save_pdf(&pages, &path).with_context(|| format!("exporting {}", path.display()))?;
        println!("Exported PDF to {}", path.display());
    }

    if opts.speak && !snapshot.text.is_empty() {
        speak_blocking(&snapshot.text)?;
    }

    Ok(())
}

pub async fn extract(input: PathBuf, json: bool) -> anyhow::Result<()> {
    let pipeline = pipeline();
    let session = Arc::new(Mutex::new(Session::new()));

    let report = pipeline
        .process_path(&session, &input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    if report.failed > 0 {
        tracing::warn!("{} of {} page(s) failed recognition", report.failed, report.pages);
    }

    let text = session.lock().await.text();
    let listing = Extractor::extract(&text);
    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        let dash = |v: &Option<String>| v.as_deref().unwrap_or("-").to_string();
        println!("brand:   {}", dash(&listing.brand));
        println!("model:   {}", dash(&listing.model));
        println!("price:   {}", dash(&listing.price));
        println!("ram:     {}", dash(&listing.ram));
        println!("storage: {}", dash(&listing.storage));
    }
    Ok(())
}

pub async fn export(images: Vec<PathBuf>, output: Option<PathBuf>) -> anyhow::Result<()> {
    if images.is_empty() {
        bail!("no images to convert");
    }

    let mut pages = Vec::with_capacity(images.len());
    for (index, path) in images.iter().enumerate() {
        let img = image::open(path).with_context(|| format!("decoding {}", path.display()))?;
        pages.push(PageImage::new(index, img));
    }

    let dest = match output {
        Some(path) => path,
        None => default_export_dir()?.join(export_file_name()),
    };
    save_pdf(&pages, &dest).with_context(|| format!("exporting {}", dest.display()))?;
    println!("Exported PDF to {}", dest.display());
    Ok(())
}

pub async fn watch(dir: PathBuf, fields: bool) -> anyhow::Result<()> {
    std::fs::create_dir_all(&dir)?;

    let (tx, mut rx) = mpsc::channel::<PathBuf>(64);
    // The watcher must be kept alive for the duration of the loop.
    let _watcher = quickscan_ocr::pipeline::spawn_intake_watcher(&dir, tx)
        .context("starting intake watcher")?;
    tracing::info!("Watching intake folder: {}", dir.display());

    let pipeline = pipeline();
    let session = Arc::new(Mutex::new(Session::new()));

    while let Some(path) = rx.recv().await {
        match pipeline.process_path(&session, &path).await {
            Ok(report) => {
                let snapshot = session.lock().await.snapshot();
                println!(
                    "{}: {} page(s) scanned — session total {} page(s), {} word(s)",
                    path.display(),
                    report.pages,
                    snapshot.image_count,
                    snapshot.word_count
                );
                if fields {
                    let listing = Extractor::extract(&snapshot.text);
                    if !listing.is_empty() {
                        println!("{}", serde_json::to_string_pretty(&listing)?);
                    }
                }
            }
            Err(err) => tracing::warn!("skipping {}: {err}", path.display()),
        }
    }
    Ok(())
}

fn default_export_dir() -> anyhow::Result<PathBuf> {
    let dirs = directories::UserDirs::new().context("no home directory")?;
    Ok(dirs
        .document_dir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dirs.home_dir().to_path_buf()))
}

fn speak_blocking(text: &str) -> anyhow::Result<()> {
    let mut speaker = CommandSpeaker::detect()?;
    speaker.speak(text)?;
    while speaker.is_speaking() {
        std::thread::sleep(std::time::Duration::from_millis(200));
    }
    Ok(())
}
