use crate::ascii::frame::TextFrame;
use crate::image_pipeline::loader::FrameSource;
use crate::runtime::sizing::Viewport;
use crate::AsciiError;

/// Monospaced output for rendered frames.
pub trait DisplaySurface {
    /// Replaces whatever frame is currently shown.
    fn present(&mut self, frame: &TextFrame);

    /// Font size hint in pixels.
    fn set_font_size(&mut self, size: f32);

    /// Static text shown instead of frames, e.g. when acquisition failed.
    fn show_message(&mut self, message: &str);

    fn viewport(&self) -> Viewport;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing_mode: FacingMode,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self { ideal_width: 1280, ideal_height: 720, facing_mode: FacingMode::User }
    }
}

/// Provider of video streams, typically backed by the platform's camera API.
pub trait MediaDevices {
    type Stream: FrameSource;

    /// Fails with [`AsciiError::PermissionDenied`] or [`AsciiError::NoDevice`].
    fn request_video_stream(
        &mut self,
        constraints: &VideoConstraints,
    ) -> Result<Self::Stream, AsciiError>;
}
