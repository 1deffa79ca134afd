mod ascii;
mod config;
mod image_pipeline;
mod runtime;

pub use ascii::{
    frame::TextFrame,
    mapping::{brightness_index, glyph_for, luminance, map, palette_position},
    palette::Palette,
};
pub use config::{LiveConfig, DEFAULT_OUTPUT_WIDTH, OUTPUT_WIDTH_RANGE};
pub use image_pipeline::{
    clip::{ClipFrame, ClipSource, DEFAULT_FRAME_DELAY},
    loader::{FrameSource, StillFrame},
    noise::NoiseSource,
    raster::Raster,
    resize::GridSize,
    sampler::FrameSampler,
};
pub use runtime::{
    diagnostics::{Diagnostic, DiagnosticSink, LogSink, StopReason},
    host::{DisplaySurface, FacingMode, MediaDevices, VideoConstraints},
    limiter::{FrameLimiter, MIN_TICK_INTERVAL},
    render_loop::{LoopState, RenderLoop, TickOutcome, FONT_REFRESH_PERIOD, READY_RETRY_DELAY},
    scheduler::{CallbackId, FrameClock, Scheduler},
    session::{Session, NO_DEVICE_MESSAGE, PERMISSION_DENIED_MESSAGE, STARTING_MESSAGE},
    sizing::{font_size_for, Viewport, MAX_FONT_SIZE, MIN_FONT_SIZE},
};

#[derive(Debug, thiserror::Error)]
pub enum AsciiError {
    #[error("camera access denied")]
    PermissionDenied,
    #[error("no video device available")]
    NoDevice,
    #[error("frame source not ready")]
    SourceNotReady,
    #[error("failed to read frame: {0}")]
    Frame(String),
    #[error("failed to process image: {0}")]
    Image(#[from] image::ImageError),
    #[error("palette must contain at least one printable character and no control characters")]
    InvalidPalette,
    #[error("output width {0} is outside {min}..={max}", min = OUTPUT_WIDTH_RANGE.start(), max = OUTPUT_WIDTH_RANGE.end())]
    InvalidWidth(u32),
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Samples the current frame of `source` at `output_width` columns and maps it
/// onto `palette`.
pub fn render_frame<F>(
    source: &mut F,
    output_width: u32,
    palette: &Palette,
) -> Result<TextFrame, AsciiError>
where
    F: FrameSource + ?Sized,
{
    let raster = FrameSampler::new().sample(source, output_width)?;
    Ok(map(&raster, palette))
}
