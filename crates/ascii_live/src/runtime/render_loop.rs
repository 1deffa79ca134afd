use std::time::{Duration, Instant};

use crate::ascii::{frame::TextFrame, mapping};
use crate::config::LiveConfig;
use crate::image_pipeline::{loader::FrameSource, resize::GridSize, sampler::FrameSampler};
use crate::runtime::diagnostics::{Diagnostic, DiagnosticSink, LogSink, StopReason};
use crate::runtime::host::DisplaySurface;
use crate::runtime::limiter::FrameLimiter;
use crate::runtime::scheduler::{CallbackId, Scheduler};
use crate::runtime::sizing;
use crate::AsciiError;

/// Delay between checks while the source has no intrinsic size.
pub const READY_RETRY_DELAY: Duration = Duration::from_millis(100);

/// The font size is recomputed on every n-th published frame.
pub const FONT_REFRESH_PERIOD: u64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    /// Waiting for the source to report its dimensions.
    Sampling,
    Running,
    Stopped,
}

/// What a fired callback did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The callback was not the pending one.
    Ignored,
    /// Source not ready, another check is scheduled.
    Waiting,
    /// Source became ready, the first tick is scheduled.
    Started,
    /// Too soon after the previous tick.
    Skipped,
    Published,
    /// Sampling or mapping failed; the next tick is still scheduled.
    Failed,
    Stopped(StopReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PendingKind {
    ReadinessCheck,
    Frame,
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    id: CallbackId,
    kind: PendingKind,
}

/// Cooperative sample → map → publish loop.
///
/// The host fires scheduled callbacks through [`RenderLoop::fire`]. At most one
/// callback is pending at any time.
pub struct RenderLoop<S> {
    scheduler: S,
    state: LoopState,
    pending: Option<Pending>,
    sampler: FrameSampler,
    limiter: FrameLimiter,
    published: u64,
    attempts: u32,
    sink: Box<dyn DiagnosticSink>,
}

impl<S: Scheduler> RenderLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            state: LoopState::Idle,
            pending: None,
            sampler: FrameSampler::new(),
            limiter: FrameLimiter::default(),
            published: 0,
            attempts: 0,
            sink: Box::new(LogSink),
        }
    }

    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_limiter(mut self, limiter: FrameLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn pending(&self) -> Option<CallbackId> {
        self.pending.map(|pending| pending.id)
    }

    pub fn grid(&self) -> Option<GridSize> {
        self.sampler.grid()
    }

    /// Frames published since the loop was created.
    pub fn published_frames(&self) -> u64 {
        self.published
    }

    /// Begins waiting for `source` to become ready, replacing any pending
    /// callback.
    pub fn start<F>(&mut self, source: &F, config: &LiveConfig) -> TickOutcome
    where
        F: FrameSource + ?Sized,
    {
        self.cancel_pending();
        self.sampler.reset();
        self.limiter.reset();
        self.attempts = 0;
        self.state = LoopState::Sampling;
        self.check_readiness(source, config)
    }

    /// Restarts after a configuration change. Does nothing unless the loop is
    /// sampling or running.
    pub fn restart<F>(&mut self, source: &F, config: &LiveConfig) -> TickOutcome
    where
        F: FrameSource + ?Sized,
    {
        match self.state {
            LoopState::Sampling | LoopState::Running => self.start(source, config),
            LoopState::Idle | LoopState::Stopped => TickOutcome::Ignored,
        }
    }

    /// Cancels the pending callback and stops the loop.
    pub fn stop(&mut self, reason: StopReason) {
        self.cancel_pending();
        if self.state != LoopState::Stopped {
            self.state = LoopState::Stopped;
            self.sink.report(Diagnostic::Stopped { reason });
        }
    }

    /// Runs the callback `id` handed out by the scheduler.
    pub fn fire<F, D>(
        &mut self,
        id: CallbackId,
        now: Instant,
        source: &mut F,
        config: &LiveConfig,
        surface: &mut D,
    ) -> TickOutcome
    where
        F: FrameSource + ?Sized,
        D: DisplaySurface + ?Sized,
    {
        let Some(pending) = self.pending.filter(|pending| pending.id == id) else {
            return TickOutcome::Ignored;
        };
        self.pending = None;
        self.scheduler.cancel(id);

        match pending.kind {
            PendingKind::ReadinessCheck => self.check_readiness(source, config),
            PendingKind::Frame => self.tick(now, source, config, surface),
        }
    }

    fn check_readiness<F>(&mut self, source: &F, config: &LiveConfig) -> TickOutcome
    where
        F: FrameSource + ?Sized,
    {
        match self.sampler.grid_for(source, config.output_width()) {
            Ok(grid) => {
                self.state = LoopState::Running;
                self.sink.report(Diagnostic::Running { grid });
                self.schedule(PendingKind::Frame);
                TickOutcome::Started
            },
            Err(_) => {
                self.attempts = self.attempts.saturating_add(1);
                self.sink.report(Diagnostic::SourceNotReady { attempt: self.attempts });
                self.schedule(PendingKind::ReadinessCheck);
                TickOutcome::Waiting
            },
        }
    }

    fn tick<F, D>(
        &mut self,
        now: Instant,
        source: &mut F,
        config: &LiveConfig,
        surface: &mut D,
    ) -> TickOutcome
    where
        F: FrameSource + ?Sized,
        D: DisplaySurface + ?Sized,
    {
        if source.is_paused() || source.is_ended() {
            let reason = if source.is_ended() { StopReason::Ended } else { StopReason::Paused };
            self.stop(reason);
            return TickOutcome::Stopped(reason);
        }

        if !self.limiter.try_tick(now) {
            self.schedule(PendingKind::Frame);
            return TickOutcome::Skipped;
        }

        let outcome = match self.render(source, config) {
            Ok(frame) => {
                if self.published % FONT_REFRESH_PERIOD == 0 {
                    let grid = GridSize { columns: frame.width, rows: frame.height };
                    let size = sizing::font_size_for(grid, surface.viewport());
                    surface.set_font_size(size);
                }
                surface.present(&frame);
                self.published += 1;
                TickOutcome::Published
            },
            Err(error) => {
                self.sink.report(Diagnostic::TickFailed { error: &error });
                TickOutcome::Failed
            },
        };

        self.schedule(PendingKind::Frame);
        outcome
    }

    fn render<F>(&mut self, source: &mut F, config: &LiveConfig) -> Result<TextFrame, AsciiError>
    where
        F: FrameSource + ?Sized,
    {
        let raster = self.sampler.sample(source, config.output_width())?;
        Ok(mapping::map(&raster, config.palette()))
    }

    fn schedule(&mut self, kind: PendingKind) {
        self.cancel_pending();
        let id = match kind {
            PendingKind::ReadinessCheck => self.scheduler.request_timeout(READY_RETRY_DELAY),
            PendingKind::Frame => self.scheduler.request_frame(),
        };
        self.pending = Some(Pending { id, kind });
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.scheduler.cancel(pending.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use image::{DynamicImage, Rgb, RgbImage};

    use super::*;
    use crate::ascii::palette::Palette;
    use crate::runtime::scheduler::FrameClock;
    use crate::runtime::sizing::Viewport;

    #[derive(Default)]
    struct Screen {
        frames: Vec<TextFrame>,
        font_sizes: Vec<f32>,
    }

    impl DisplaySurface for Screen {
        fn present(&mut self, frame: &TextFrame) {
            self.frames.push(frame.clone());
        }

        fn set_font_size(&mut self, size: f32) {
            self.font_sizes.push(size);
        }

        fn show_message(&mut self, _message: &str) {}

        fn viewport(&self) -> Viewport {
            Viewport::new(1280.0, 720.0)
        }
    }

    struct Camera {
        image: DynamicImage,
        ready: bool,
        paused: bool,
        broken: bool,
    }

    impl Camera {
        fn new(width: u32, height: u32) -> Self {
            let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([0; 3])));
            Self { image, ready: true, paused: false, broken: false }
        }
    }

    impl FrameSource for Camera {
        fn dimensions(&self) -> (u32, u32) {
            if self.ready {
                (self.image.width(), self.image.height())
            } else {
                (0, 0)
            }
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn current_frame(&mut self) -> Result<&DynamicImage, AsciiError> {
            if self.broken {
                return Err(AsciiError::Frame("device hiccup".into()));
            }
            Ok(&self.image)
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl DiagnosticSink for Recorder {
        fn report(&self, diagnostic: Diagnostic<'_>) {
            self.0.borrow_mut().push(format!("{diagnostic:?}"));
        }
    }

    const REFRESH: Duration = Duration::from_millis(16);

    fn running_loop(camera: &Camera, config: &LiveConfig) -> RenderLoop<FrameClock> {
        let mut render = RenderLoop::new(FrameClock::new(REFRESH));
        assert_eq!(render.start(camera, config), TickOutcome::Started);
        render
    }

    fn fire_next(
        render: &mut RenderLoop<FrameClock>,
        camera: &mut Camera,
        config: &LiveConfig,
        screen: &mut Screen,
    ) -> TickOutcome {
        let (id, due) = render.scheduler_mut().pop_next().unwrap();
        render.fire(id, due, camera, config, screen)
    }

    #[test]
    fn retries_until_source_reports_size() {
        let mut camera = Camera::new(1280, 720);
        camera.ready = false;
        let config = LiveConfig::default();
        let mut screen = Screen::default();
        let start = Instant::now();
        let mut render = RenderLoop::new(FrameClock::starting_at(start, REFRESH));

        assert_eq!(render.start(&camera, &config), TickOutcome::Waiting);
        assert_eq!(render.state(), LoopState::Sampling);
        assert_eq!(render.scheduler().peek_next().unwrap().1, start + READY_RETRY_DELAY);

        assert_eq!(fire_next(&mut render, &mut camera, &config, &mut screen), TickOutcome::Waiting);
        camera.ready = true;
        assert_eq!(fire_next(&mut render, &mut camera, &config, &mut screen), TickOutcome::Started);
        assert_eq!(render.state(), LoopState::Running);
        assert_eq!(render.grid(), Some(GridSize { columns: 80, rows: 45 }));
        assert_eq!(render.scheduler().pending_len(), 1);
    }

    #[test]
    fn refreshes_inside_the_interval_publish_once() {
        let mut camera = Camera::new(1280, 720);
        let config = LiveConfig::default();
        let mut screen = Screen::default();
        let start = Instant::now();
        let mut render = RenderLoop::new(FrameClock::starting_at(start, REFRESH));
        render.start(&camera, &config);

        let id = render.pending().unwrap();
        assert_eq!(render.fire(id, start, &mut camera, &config, &mut screen), TickOutcome::Published);
        let id = render.pending().unwrap();
        let later = start + Duration::from_millis(10);
        assert_eq!(render.fire(id, later, &mut camera, &config, &mut screen), TickOutcome::Skipped);

        assert_eq!(screen.frames.len(), 1);
        assert_eq!(render.scheduler().pending_len(), 1);
    }

    #[test]
    fn publishes_at_capped_rate() {
        let mut camera = Camera::new(640, 480);
        let config = LiveConfig::default();
        let mut screen = Screen::default();
        let mut render = running_loop(&camera, &config);

        // One second of 16ms refreshes.
        for _ in 0..62 {
            fire_next(&mut render, &mut camera, &config, &mut screen);
        }

        assert!((13..=16).contains(&screen.frames.len()), "{} frames", screen.frames.len());
        assert_eq!(render.published_frames(), screen.frames.len() as u64);
    }

    #[test]
    fn font_size_follows_every_tenth_frame() {
        let mut camera = Camera::new(1280, 720);
        let config = LiveConfig::default();
        let mut screen = Screen::default();
        let mut render = running_loop(&camera, &config);

        while screen.frames.len() < 21 {
            fire_next(&mut render, &mut camera, &config, &mut screen);
        }

        assert_eq!(screen.font_sizes.len(), 3);
        let expected = sizing::font_size_for(GridSize { columns: 80, rows: 45 }, screen.viewport());
        assert!(screen.font_sizes.iter().all(|&size| size == expected));
    }

    #[test]
    fn failing_tick_keeps_the_loop_alive() {
        let mut camera = Camera::new(1280, 720);
        camera.broken = true;
        let config = LiveConfig::default();
        let mut screen = Screen::default();
        let recorder = Recorder::default();
        let mut render = RenderLoop::new(FrameClock::new(REFRESH)).with_sink(recorder.clone());
        render.start(&camera, &config);

        assert_eq!(fire_next(&mut render, &mut camera, &config, &mut screen), TickOutcome::Failed);
        assert_eq!(render.state(), LoopState::Running);
        assert_eq!(render.scheduler().pending_len(), 1);
        assert!(recorder.0.borrow().iter().any(|entry| entry.starts_with("TickFailed")));

        camera.broken = false;
        while fire_next(&mut render, &mut camera, &config, &mut screen) != TickOutcome::Published {}
        assert_eq!(screen.frames.len(), 1);
    }

    #[test]
    fn fired_callback_leaves_no_stale_entry() {
        let mut camera = Camera::new(1280, 720);
        let config = LiveConfig::default();
        let mut screen = Screen::default();
        let start = Instant::now();
        let mut render = RenderLoop::new(FrameClock::starting_at(start, REFRESH));
        render.start(&camera, &config);

        // Fire straight from the handle without taking it out of the clock.
        for offset in [0, 10, 20] {
            let id = render.pending().unwrap();
            render.fire(id, start + Duration::from_millis(offset), &mut camera, &config, &mut screen);
            assert!(!render.scheduler().is_pending(id));
            assert_eq!(render.scheduler().pending_len(), 1);
        }
        assert_eq!(screen.frames.len(), 1);
    }

    #[test]
    fn paused_source_stops_without_rescheduling() {
        let mut camera = Camera::new(1280, 720);
        let config = LiveConfig::default();
        let mut screen = Screen::default();
        let mut render = running_loop(&camera, &config);

        camera.paused = true;
        assert_eq!(
            fire_next(&mut render, &mut camera, &config, &mut screen),
            TickOutcome::Stopped(StopReason::Paused)
        );
        assert_eq!(render.state(), LoopState::Stopped);
        assert_eq!(render.pending(), None);
        assert_eq!(render.scheduler().pending_len(), 0);
    }

    #[test]
    fn restart_keeps_a_single_pending_callback() {
        let mut camera = Camera::new(1280, 720);
        let mut config = LiveConfig::default();
        let mut screen = Screen::default();
        let mut render = running_loop(&camera, &config);
        fire_next(&mut render, &mut camera, &config, &mut screen);
        let stale = render.pending().unwrap();

        config.set_output_width(120).unwrap();
        assert_eq!(render.restart(&camera, &config), TickOutcome::Started);
        assert_eq!(render.scheduler().pending_len(), 1);
        assert!(!render.scheduler().is_pending(stale));

        let now = render.scheduler().now();
        assert_eq!(render.fire(stale, now, &mut camera, &config, &mut screen), TickOutcome::Ignored);

        assert_eq!(fire_next(&mut render, &mut camera, &config, &mut screen), TickOutcome::Published);
        let frame = screen.frames.last().unwrap();
        assert_eq!((frame.width, frame.height), (120, 67));
    }

    #[test]
    fn palette_change_applies_on_next_frame() {
        let mut camera = Camera::new(64, 64);
        let mut config = LiveConfig::default();
        let mut screen = Screen::default();
        let mut render = running_loop(&camera, &config);
        fire_next(&mut render, &mut camera, &config, &mut screen);
        assert!(screen.frames[0].as_str().starts_with(' '));

        config.set_palette(Palette::new("#").unwrap());
        render.restart(&camera, &config);
        fire_next(&mut render, &mut camera, &config, &mut screen);
        assert!(screen.frames[1].rows().all(|row| row.chars().all(|ch| ch == '#')));
    }

    #[test]
    fn stop_cancels_and_restart_is_ignored() {
        let camera = Camera::new(1280, 720);
        let config = LiveConfig::default();
        let mut render = running_loop(&camera, &config);

        render.stop(StopReason::Teardown);
        assert_eq!(render.state(), LoopState::Stopped);
        assert_eq!(render.scheduler().pending_len(), 0);
        assert_eq!(render.restart(&camera, &config), TickOutcome::Ignored);
        assert_eq!(render.scheduler().pending_len(), 0);
    }
}
