use std::fmt;

use log::{debug, error, info, warn};

use crate::image_pipeline::resize::GridSize;
use crate::AsciiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The source was paused.
    Paused,
    /// The source reached its end.
    Ended,
    /// The loop or its owning session was torn down.
    Teardown,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Paused => f.write_str("source paused"),
            StopReason::Ended => f.write_str("source ended"),
            StopReason::Teardown => f.write_str("teardown"),
        }
    }
}

/// Conditions the render loop and session report while running.
#[derive(Debug)]
pub enum Diagnostic<'a> {
    /// The source has no intrinsic size yet; another check is scheduled.
    SourceNotReady { attempt: u32 },
    /// The source is ready and ticking starts on this grid.
    Running { grid: GridSize },
    /// A single tick failed and was skipped.
    TickFailed { error: &'a AsciiError },
    /// Acquiring the source failed; the session cannot continue.
    AcquireFailed { error: &'a AsciiError },
    Stopped { reason: StopReason },
}

/// Receiver for loop diagnostics. Nothing in the loop depends on what a sink
/// does with them.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic<'_>);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: Diagnostic<'_>) {
        match diagnostic {
            Diagnostic::SourceNotReady { attempt } => {
                debug!("frame source dimensions not ready, retrying (attempt {attempt})")
            },
            Diagnostic::Running { grid } => {
                info!("starting ascii conversion at {}x{}", grid.columns, grid.rows)
            },
            Diagnostic::TickFailed { error } => warn!("skipping frame: {error}"),
            Diagnostic::AcquireFailed { error } => error!("failed to acquire video stream: {error}"),
            Diagnostic::Stopped { reason } => debug!("render loop stopped: {reason}"),
        }
    }
}
