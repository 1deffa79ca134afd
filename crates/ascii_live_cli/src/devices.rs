use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ascii_live::{
    AsciiError, ClipFrame, ClipSource, FrameSource, MediaDevices, NoiseSource, StillFrame,
    VideoConstraints, DEFAULT_FRAME_DELAY,
};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, GenericImageView, ImageError};
use log::debug;
use walkdir::WalkDir;

/// Where the stand-in camera reads its frames from.
#[derive(Clone, Debug)]
pub enum Feed {
    /// An image, a GIF clip or a directory of frames.
    Path { path: PathBuf, looping: bool },
    /// Random pixels at the requested constraints.
    Noise { seed: Option<u64> },
}

/// Stream handed out by [`FeedDevices`].
pub enum FeedStream {
    Still(StillFrame),
    Clip(ClipSource),
    Noise(NoiseSource),
}

impl FeedStream {
    fn inner(&self) -> &dyn FrameSource {
        match self {
            FeedStream::Still(source) => source,
            FeedStream::Clip(source) => source,
            FeedStream::Noise(source) => source,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn FrameSource {
        match self {
            FeedStream::Still(source) => source,
            FeedStream::Clip(source) => source,
            FeedStream::Noise(source) => source,
        }
    }
}

impl FrameSource for FeedStream {
    fn dimensions(&self) -> (u32, u32) {
        self.inner().dimensions()
    }

    fn is_paused(&self) -> bool {
        self.inner().is_paused()
    }

    fn is_ended(&self) -> bool {
        self.inner().is_ended()
    }

    fn current_frame(&mut self) -> Result<&DynamicImage, AsciiError> {
        self.inner_mut().current_frame()
    }

    fn release(&mut self) {
        self.inner_mut().release();
    }
}

/// Media devices backed by files or generated noise instead of a camera.
pub struct FeedDevices {
    feed: Feed,
}

impl FeedDevices {
    pub fn new(feed: Feed) -> Self {
        Self { feed }
    }
}

impl MediaDevices for FeedDevices {
    type Stream = FeedStream;

    fn request_video_stream(
        &mut self,
        constraints: &VideoConstraints,
    ) -> Result<FeedStream, AsciiError> {
        match &self.feed {
            Feed::Noise { seed } => {
                let (width, height) = (constraints.ideal_width, constraints.ideal_height);
                let source = match seed {
                    Some(seed) => NoiseSource::seeded(width, height, *seed),
                    None => NoiseSource::new(width, height),
                };
                Ok(FeedStream::Noise(source))
            },
            Feed::Path { path, looping } => open_feed(path, *looping),
        }
    }
}

fn open_feed(path: &Path, looping: bool) -> Result<FeedStream, AsciiError> {
    let mut frames = load_frames(path)?;
    if frames.len() == 1 && looping {
        let frame = frames.remove(0);
        return Ok(FeedStream::Still(StillFrame::new(frame.image)));
    }
    Ok(FeedStream::Clip(ClipSource::new(frames, looping)?))
}

pub fn load_frames(path: &Path) -> Result<Vec<ClipFrame>, AsciiError> {
    if path.is_dir() {
        return load_frames_from_directory(path);
    }

    match path.extension().and_then(|ext| ext.to_str()).map(|ext| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "gif" => load_frames_from_gif(path),
        _ => Ok(vec![ClipFrame::new(open_image(path)?, DEFAULT_FRAME_DELAY)]),
    }
}

fn load_frames_from_gif(path: &Path) -> Result<Vec<ClipFrame>, AsciiError> {
    let file = File::open(path).map_err(acquire_error)?;
    let decoder = GifDecoder::new(BufReader::new(file))?;
    let frames = decoder.into_frames().collect_frames()?;

    let mut result = Vec::with_capacity(frames.len());
    for frame in frames {
        let delay = Duration::from(frame.delay());
        let buffer = frame.into_buffer();
        let (w, h) = buffer.dimensions();
        debug!("loaded clip frame {}x{} from {}", w, h, path.display());
        result.push(ClipFrame::new(DynamicImage::ImageRgba8(buffer), delay));
    }
    Ok(result)
}

fn load_frames_from_directory(path: &Path) -> Result<Vec<ClipFrame>, AsciiError> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = entry.map_err(walk_error)?;
        if entry.file_type().is_file() {
            entries.push(entry.into_path());
        }
    }
    entries.sort();
    if entries.is_empty() {
        return Err(AsciiError::NoDevice);
    }

    entries
        .iter()
        .map(|entry| Ok(ClipFrame::new(open_image(entry)?, DEFAULT_FRAME_DELAY)))
        .collect()
}

fn open_image(path: &Path) -> Result<DynamicImage, AsciiError> {
    let image = image::open(path).map_err(|err| match err {
        ImageError::IoError(err) => acquire_error(err),
        err => AsciiError::Image(err),
    })?;
    let (w, h) = image.dimensions();
    debug!("loaded frame {}x{} from {}", w, h, path.display());
    Ok(image)
}

fn walk_error(err: walkdir::Error) -> AsciiError {
    let message = err.to_string();
    match err.into_io_error() {
        Some(err) => acquire_error(err),
        None => AsciiError::Frame(message),
    }
}

/// Maps file access errors onto the camera acquisition failures they stand in
/// for.
fn acquire_error(err: io::Error) -> AsciiError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => AsciiError::PermissionDenied,
        io::ErrorKind::NotFound => AsciiError::NoDevice,
        _ => AsciiError::Frame(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_is_no_device() {
        let mut devices = FeedDevices::new(Feed::Path {
            path: PathBuf::from("/definitely/not/here.png"),
            looping: true,
        });
        let result = devices.request_video_stream(&VideoConstraints::default());
        assert!(matches!(result, Err(AsciiError::NoDevice)));
    }

    #[test]
    fn unreadable_frame_directory_reports_walk_error() {
        let result = load_frames_from_directory(Path::new("/definitely/not/a/frames/dir"));
        assert!(matches!(result, Err(AsciiError::NoDevice)));
    }

    #[test]
    fn walk_errors_keep_their_io_kind() {
        let err = WalkDir::new("/definitely/not/a/frames/dir")
            .into_iter()
            .find_map(Result::err)
            .expect("walking a missing root fails");
        assert!(matches!(walk_error(err), AsciiError::NoDevice));

        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(matches!(acquire_error(denied), AsciiError::PermissionDenied));
    }

    #[test]
    fn noise_follows_constraints() {
        let mut devices = FeedDevices::new(Feed::Noise { seed: Some(3) });
        let constraints = VideoConstraints { ideal_width: 320, ideal_height: 240, ..Default::default() };
        let stream = devices.request_video_stream(&constraints).unwrap();
        assert_eq!(stream.dimensions(), (320, 240));
    }
}
