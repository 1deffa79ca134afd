use std::time::Instant;

use crate::ascii::palette::Palette;
use crate::config::LiveConfig;
use crate::image_pipeline::loader::FrameSource;
use crate::runtime::diagnostics::{Diagnostic, DiagnosticSink, LogSink, StopReason};
use crate::runtime::host::{DisplaySurface, MediaDevices, VideoConstraints};
use crate::runtime::render_loop::{LoopState, RenderLoop, TickOutcome};
use crate::runtime::scheduler::{CallbackId, Scheduler};
use crate::AsciiError;

pub const PERMISSION_DENIED_MESSAGE: &str =
    "Camera access denied. Please refresh and allow camera access.";
pub const NO_DEVICE_MESSAGE: &str = "No camera found. Connect a camera and refresh.";
pub const STARTING_MESSAGE: &str = "Starting camera...";

/// One viewing session: a single acquired source, its configuration and the
/// loop rendering it.
pub struct Session<M: MediaDevices, S> {
    source: Option<M::Stream>,
    config: LiveConfig,
    render: RenderLoop<S>,
    sink: Box<dyn DiagnosticSink>,
}

impl<M: MediaDevices, S: Scheduler> Session<M, S> {
    pub fn new(render: RenderLoop<S>, config: LiveConfig) -> Self {
        Self { source: None, config, render, sink: Box::new(LogSink) }
    }

    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    pub fn render_loop(&self) -> &RenderLoop<S> {
        &self.render
    }

    pub fn render_loop_mut(&mut self) -> &mut RenderLoop<S> {
        &mut self.render
    }

    pub fn source_mut(&mut self) -> Option<&mut M::Stream> {
        self.source.as_mut()
    }

    /// Acquires the stream and starts the loop.
    ///
    /// A stream held from an earlier start is released first. Acquisition
    /// failures are shown on `surface` and end the session.
    pub fn start<D>(
        &mut self,
        devices: &mut M,
        constraints: &VideoConstraints,
        surface: &mut D,
    ) -> Result<(), AsciiError>
    where
        D: DisplaySurface + ?Sized,
    {
        if self.source.is_some() {
            self.teardown();
        }
        surface.show_message(STARTING_MESSAGE);

        let source = match devices.request_video_stream(constraints) {
            Ok(source) => source,
            Err(error) => {
                self.sink.report(Diagnostic::AcquireFailed { error: &error });
                let message = match error {
                    AsciiError::NoDevice => NO_DEVICE_MESSAGE,
                    _ => PERMISSION_DENIED_MESSAGE,
                };
                surface.show_message(message);
                return Err(error);
            },
        };

        let source = self.source.insert(source);
        self.render.start(source, &self.config);
        Ok(())
    }

    /// Dispatches a fired scheduler callback.
    pub fn fire<D>(&mut self, id: CallbackId, now: Instant, surface: &mut D) -> TickOutcome
    where
        D: DisplaySurface + ?Sized,
    {
        match self.source.as_mut() {
            Some(source) => self.render.fire(id, now, source, &self.config, surface),
            None => TickOutcome::Ignored,
        }
    }

    pub fn set_output_width(&mut self, output_width: u32) -> Result<(), AsciiError> {
        self.config.set_output_width(output_width)?;
        self.restart();
        Ok(())
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.config.set_palette(palette);
        self.restart();
    }

    fn restart(&mut self) {
        if let Some(source) = self.source.as_ref() {
            self.render.restart(source, &self.config);
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.render.state(), LoopState::Sampling | LoopState::Running)
    }

    /// Stops the loop and releases the source.
    pub fn teardown(&mut self) {
        self.render.stop(StopReason::Teardown);
        if let Some(mut source) = self.source.take() {
            source.release();
        }
    }
}

impl<M: MediaDevices, S> Drop for Session<M, S> {
    fn drop(&mut self) {
        if let Some(source) = self.source.as_mut() {
            source.release();
        }
    }
}
