use image::{DynamicImage, RgbImage};
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::loader::FrameSource;
use crate::AsciiError;

/// Random RGB pattern standing in for a camera feed.
pub struct NoiseSource {
    frame: DynamicImage,
    rng: StdRng,
    released: bool,
}

impl NoiseSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_rng(width, height, StdRng::from_entropy())
    }

    /// Same dimensions and sequence of frames for the same seed.
    pub fn seeded(width: u32, height: u32, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: u32, height: u32, rng: StdRng) -> Self {
        Self { frame: DynamicImage::ImageRgb8(RgbImage::new(width, height)), rng, released: false }
    }
}

impl FrameSource for NoiseSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.frame.width(), self.frame.height())
    }

    fn is_ended(&self) -> bool {
        self.released
    }

    fn current_frame(&mut self) -> Result<&DynamicImage, AsciiError> {
        let DynamicImage::ImageRgb8(buffer) = &mut self.frame else {
            return Err(AsciiError::Frame("noise buffer is not RGB".into()));
        };
        self.rng.fill(&mut **buffer);
        Ok(&self.frame)
    }

    fn release(&mut self) {
        self.released = true;
    }
}
