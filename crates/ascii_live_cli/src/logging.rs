use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Writes log records to stderr, prefixed with the time since startup.
struct Logger {
    level: LevelFilter,
    start: Instant,
    stderr: Mutex<io::Stderr>,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.start.elapsed();
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN ",
            Level::Info => "INFO ",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };

        if let Ok(mut stderr) = self.stderr.lock() {
            let _ = writeln!(
                stderr,
                "[{:>4}.{:09}s] [{level}] [{}] {}",
                elapsed.as_secs(),
                elapsed.subsec_nanos(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        if let Ok(mut stderr) = self.stderr.lock() {
            let _ = stderr.flush();
        }
    }
}

pub fn initialize(level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = Logger { level, start: Instant::now(), stderr: Mutex::new(io::stderr()) };
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}
