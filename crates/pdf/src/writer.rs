use std::io::Write;
use std::path::Path;

use chrono::Utc;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use quickscan_core::PageImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfWriteError {
    #[error("No images to convert")]
    NoPages,
    #[error("Failed to encode document: {0}")]
    Encode(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reassemble captured pages into a PDF. Each image is flattened to RGB8 and
/// embedded as an image XObject on a page whose media box matches the pixel
/// dimensions, so nothing is rescaled or cropped.
pub fn write_pdf(pages: &[PageImage]) -> Result<Vec<u8>, PdfWriteError> {
    if pages.is_empty() {
        return Err(PdfWriteError::NoPages);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for page in pages {
        let rgb = page.image().to_rgb8();
        let (w, h) = rgb.dimensions();

        let xobject = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => w as i64,
                "Height" => h as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            rgb.into_raw(),
        );
        let xobject_id = doc.add_object(xobject);

        // Scale the unit-square image operator up to the full media box.
        let content = format!("q\n{w} 0 0 {h} 0 0 cm\n/Im0 Do\nQ\n");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut xobjects = Dictionary::new();
        xobjects.set("Im0", xobject_id);

        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), (w as i64).into(), (h as i64).into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => xobjects },
        };
        kids.push(doc.add_object(page_dict).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf)?;
    Ok(buf)
}

/// Write the document to `path` through a sibling temp file and an atomic
/// rename, so a failed export never leaves a partial file visible.
pub fn save_pdf(pages: &[PageImage], path: &Path) -> Result<(), PdfWriteError> {
    let bytes = write_pdf(pages)?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or(Path::new(".")))?;
    tmp.write_all(&bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| PdfWriteError::Io(e.error))?;
    tracing::info!("Exported {} page(s) to {}", pages.len(), path.display());
    Ok(())
}

/// Timestamped export name, e.g. `QuickScan_1724493600123.pdf`.
pub fn export_file_name() -> String {
    format!("QuickScan_{}.pdf", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage};

    fn gray_page(index: usize, side: u32) -> PageImage {
        let img: GrayImage = ImageBuffer::from_fn(side, side, |_, _| Luma([180u8]));
        PageImage::new(index, DynamicImage::ImageLuma8(img))
    }

    #[test]
    fn write_pdf_rejects_empty_input() {
        assert!(matches!(write_pdf(&[]), Err(PdfWriteError::NoPages)));
    }

    #[test]
    fn write_pdf_one_page_per_image() {
        let pages = vec![gray_page(0, 4), gray_page(1, 6), gray_page(2, 8)];
        let bytes = write_pdf(&pages).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn color_pages_are_flattened_to_rgb() {
        let rgb: RgbImage = ImageBuffer::from_fn(4, 4, |x, _| image::Rgb([x as u8, 0, 255]));
        let pages = vec![PageImage::new(0, DynamicImage::ImageRgb8(rgb))];
        let bytes = write_pdf(&pages).unwrap();
        assert!(Document::load_mem(&bytes).is_ok());
    }

    #[test]
    fn save_pdf_writes_file_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.pdf");
        save_pdf(&[gray_page(0, 4)], &dest).unwrap();

        let bytes = std::fs::read(&dest).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");
        // No stray temp files left next to the export.
        let pdf_count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(pdf_count, 1);
    }

    #[test]
    fn export_file_name_is_timestamped() {
        let name = export_file_name();
        assert!(name.starts_with("QuickScan_"));
        assert!(name.ends_with(".pdf"));
        let millis = &name["QuickScan_".len()..name.len() - ".pdf".len()];
        assert!(millis.parse::<i64>().is_ok());
    }
}
