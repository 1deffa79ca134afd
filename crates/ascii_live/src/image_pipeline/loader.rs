use image::{DynamicImage, GenericImageView};

use crate::AsciiError;

/// A live source of frames, such as a camera stream.
pub trait FrameSource {
    /// Intrinsic frame size. `(0, 0)` until the source is ready.
    fn dimensions(&self) -> (u32, u32);

    fn is_paused(&self) -> bool {
        false
    }

    fn is_ended(&self) -> bool {
        false
    }

    /// The frame currently shown by the source.
    fn current_frame(&mut self) -> Result<&DynamicImage, AsciiError>;

    /// Stops every underlying track. The source is not read again afterwards.
    fn release(&mut self) {}
}

/// A single image presented as a never-ending source.
pub struct StillFrame {
    image: DynamicImage,
    released: bool,
}

impl StillFrame {
    pub fn new(image: DynamicImage) -> Self {
        Self { image, released: false }
    }
}

impl FrameSource for StillFrame {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn is_ended(&self) -> bool {
        self.released
    }

    fn current_frame(&mut self) -> Result<&DynamicImage, AsciiError> {
        Ok(&self.image)
    }

    fn release(&mut self) {
        self.released = true;
    }
}
