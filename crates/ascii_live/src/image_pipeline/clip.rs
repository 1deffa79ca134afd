use std::time::{Duration, Instant};

use image::{DynamicImage, GenericImageView};

use super::loader::FrameSource;
use crate::AsciiError;

/// Delay used for frames that carry no timing of their own.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

#[derive(Clone, Debug)]
pub struct ClipFrame {
    pub image: DynamicImage,
    pub duration: Duration,
}

impl ClipFrame {
    pub fn new(image: DynamicImage, duration: Duration) -> Self {
        let duration = if duration.is_zero() { DEFAULT_FRAME_DELAY } else { duration };
        Self { image, duration }
    }
}

/// A timed sequence of frames played back against the wall clock.
#[derive(Debug)]
pub struct ClipSource {
    frames: Vec<ClipFrame>,
    total_duration: Duration,
    dimensions: (u32, u32),
    looping: bool,
    started: Instant,
    paused_at: Option<Instant>,
    released: bool,
}

impl ClipSource {
    pub fn new(frames: Vec<ClipFrame>, looping: bool) -> Result<Self, AsciiError> {
        let Some(first) = frames.first() else {
            return Err(AsciiError::Frame("clip contains no frames".into()));
        };

        let dimensions = first.image.dimensions();
        if let Some(frame) = frames.iter().find(|frame| frame.image.dimensions() != dimensions) {
            let (width, height) = frame.image.dimensions();
            return Err(AsciiError::Frame(format!(
                "clip frame {width}x{height} does not match {}x{}",
                dimensions.0, dimensions.1
            )));
        }

        let total_duration = frames.iter().map(|frame| frame.duration).sum();
        Ok(Self {
            frames,
            total_duration,
            dimensions,
            looping,
            started: Instant::now(),
            paused_at: None,
            released: false,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.started += paused_at.elapsed();
        }
    }

    /// Playback position, frozen while paused.
    pub fn elapsed(&self) -> Duration {
        let now = self.paused_at.unwrap_or_else(Instant::now);
        now.saturating_duration_since(self.started)
    }

    fn normalize_elapsed(&self, elapsed: Duration) -> Duration {
        if self.frames.len() <= 1 || self.total_duration.is_zero() {
            return Duration::ZERO;
        }

        if !self.looping {
            return elapsed.min(self.total_duration);
        }

        let remainder = elapsed.as_nanos() % self.total_duration.as_nanos();
        let secs = (remainder / 1_000_000_000) as u64;
        let nanos = (remainder % 1_000_000_000) as u32;
        Duration::new(secs, nanos)
    }

    /// Index of the frame on screen `elapsed` after playback started.
    pub fn frame_index_at(&self, elapsed: Duration) -> usize {
        let mut remaining = self.normalize_elapsed(elapsed);

        for (index, frame) in self.frames.iter().enumerate() {
            if remaining < frame.duration {
                return index;
            }
            remaining -= frame.duration;
        }

        self.frames.len() - 1
    }
}

impl FrameSource for ClipSource {
    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    fn is_ended(&self) -> bool {
        self.released || (!self.looping && self.elapsed() >= self.total_duration)
    }

    fn current_frame(&mut self) -> Result<&DynamicImage, AsciiError> {
        let index = self.frame_index_at(self.elapsed());
        Ok(&self.frames[index].image)
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use image::RgbImage;

    use super::*;

    fn frames(delays: &[u64]) -> Vec<ClipFrame> {
        delays
            .iter()
            .map(|&ms| {
                ClipFrame::new(
                    DynamicImage::ImageRgb8(RgbImage::new(4, 3)),
                    Duration::from_millis(ms),
                )
            })
            .collect()
    }

    #[test]
    fn picks_frame_by_elapsed_time() {
        let clip = ClipSource::new(frames(&[100, 50, 200]), true).unwrap();
        assert_eq!(clip.total_duration(), Duration::from_millis(350));
        assert_eq!(clip.frame_index_at(Duration::ZERO), 0);
        assert_eq!(clip.frame_index_at(Duration::from_millis(120)), 1);
        assert_eq!(clip.frame_index_at(Duration::from_millis(150)), 2);
        assert_eq!(clip.frame_index_at(Duration::from_millis(360)), 0);
    }

    #[test]
    fn play_once_holds_last_frame() {
        let clip = ClipSource::new(frames(&[10, 10]), false).unwrap();
        assert_eq!(clip.frame_index_at(Duration::from_secs(5)), 1);
    }

    #[test]
    fn zero_delay_falls_back_to_default() {
        let clip = ClipSource::new(frames(&[0]), true).unwrap();
        assert_eq!(clip.total_duration(), DEFAULT_FRAME_DELAY);
    }

    #[test]
    fn rejects_empty_and_mismatched_clips() {
        assert!(ClipSource::new(Vec::new(), true).is_err());

        let mut mixed = frames(&[10]);
        mixed.push(ClipFrame::new(DynamicImage::ImageRgb8(RgbImage::new(8, 8)), DEFAULT_FRAME_DELAY));
        assert!(matches!(ClipSource::new(mixed, true), Err(AsciiError::Frame(_))));
    }

    #[test]
    fn pause_and_release_are_reported() {
        let mut clip = ClipSource::new(frames(&[10, 10]), true).unwrap();
        assert_eq!(clip.dimensions(), (4, 3));
        clip.pause();
        assert!(clip.is_paused());
        clip.resume();
        assert!(!clip.is_paused());
        assert!(!clip.is_ended());
        clip.release();
        assert!(clip.is_ended());
    }
}
