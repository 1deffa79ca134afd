use image::RgbImage;

/// Downsampled RGB samples for a single tick.
#[derive(Clone, Debug)]
pub struct Raster {
    image: RgbImage,
}

impl Raster {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Builds a raster from packed `r, g, b` triples in row-major order.
    ///
    /// Returns `None` when `samples` holds fewer than `width * height` triples.
    pub fn from_samples(width: u32, height: u32, samples: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, samples).map(Self::new)
    }

    /// A raster where every sample is the same color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::new(RgbImage::from_pixel(width, height, image::Rgb(rgb)))
    }

    pub fn empty() -> Self {
        Self::new(RgbImage::new(0, 0))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let stride = self.width() as usize * 3;
        self.image.as_raw().chunks_exact(stride.max(3)).take(self.height() as usize)
    }
}
