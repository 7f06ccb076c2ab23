use image::DynamicImage;

/// One decoded raster page: a captured photo, a gallery image, or a single
/// rendered PDF page. The index is the page's position in document order and
/// is what recognition results are keyed by.
#[derive(Debug, Clone)]
pub struct PageImage {
    index: usize,
    image: DynamicImage,
}

impl PageImage {
    pub fn new(index: usize, image: DynamicImage) -> Self {
        Self { index, image }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
