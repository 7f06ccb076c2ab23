use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to encode processed page: {0}")]
    Encode(String),
}

/// Longest edge handed to the recognizer. Phone photos routinely come in at
/// 4000 px; recognition gains nothing past this and the encode cost triples.
const MAX_EDGE: u32 = 2048;

/// Normalize a decoded page and return PNG bytes ready for recognition.
pub fn prepare_page(page: &DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    encode_as_png(&normalize(page))
}

/// Downscale cap + grayscale + contrast stretch.
fn normalize(img: &DynamicImage) -> DynamicImage {
    let gray: GrayImage = if img.width() > MAX_EDGE || img.height() > MAX_EDGE {
        img.resize(MAX_EDGE, MAX_EDGE, image::imageops::FilterType::Lanczos3)
            .to_luma8()
    } else {
        img.to_luma8()
    };

    let (min_px, max_px) = gray
        .pixels()
        .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    // Uniform page (blank capture) — nothing to stretch.
    if max_px == min_px {
        return DynamicImage::ImageLuma8(gray);
    }

    let range = (max_px - min_px) as u32;
    let stretched: GrayImage = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        Luma([((p - min_px) as u32 * 255 / range) as u8])
    });

    DynamicImage::ImageLuma8(stretched)
}

fn encode_as_png(img: &DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(width, height, |_, _| Luma([value]));
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn uniform_page_passes_through() {
        let result = normalize(&solid_gray(10, 10, 128));
        assert_eq!(result.width(), 10);
        assert_eq!(result.height(), 10);
    }

    #[test]
    fn gradient_stretches_to_full_range() {
        let img: GrayImage =
            ImageBuffer::from_fn(256, 1, |x, _| Luma([(64 + x / 2) as u8]));
        let gray = normalize(&DynamicImage::ImageLuma8(img)).to_luma8();
        assert_eq!(gray.pixels().map(|p| p[0]).min().unwrap(), 0);
        assert_eq!(gray.pixels().map(|p| p[0]).max().unwrap(), 255);
    }

    #[test]
    fn oversized_page_is_capped() {
        let result = normalize(&solid_gray(4000, 3000, 200));
        assert!(result.width() <= MAX_EDGE && result.height() <= MAX_EDGE);
    }

    #[test]
    fn prepare_page_emits_png() {
        let bytes = prepare_page(&solid_gray(4, 4, 100)).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }
}
