//! Stderr logging for the overlay tools.
//!
//! Everything goes to stderr so that commands printing JSON on stdout stay
//! machine-readable. Records from the `stroke_overlay*` crates are shown at
//! the requested level; other crates are held at `warn` or lower.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

const OWN_TARGET: &str = "stroke_overlay";

/// Map a `-v` count onto a level filter (`0` is `info`).
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

struct OverlayLogger {
    level: LevelFilter,
    foreign: LevelFilter,
    started: Instant,
}

impl OverlayLogger {
    fn limit_for(&self, target: &str) -> LevelFilter {
        if target.starts_with(OWN_TARGET) {
            self.level
        } else {
            self.foreign
        }
    }
}

impl Log for OverlayLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.limit_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let module = record
            .target()
            .rsplit("::")
            .next()
            .unwrap_or_default();
        let mut stderr = std::io::stderr().lock();
        let _ = match record.level() {
            Level::Error | Level::Warn => writeln!(
                stderr,
                "[{:8.3}s {:>5} {module}] {}",
                self.started.elapsed().as_secs_f64(),
                record.level(),
                record.args()
            ),
            _ => writeln!(
                stderr,
                "[{:8.3}s {:>5}] {}",
                self.started.elapsed().as_secs_f64(),
                record.level(),
                record.args()
            ),
        };
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<OverlayLogger> = OnceLock::new();

/// Install the stderr logger.
///
/// Only the first call installs anything; later calls keep the first level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| OverlayLogger {
        level,
        foreign: level.min(LevelFilter::Warn),
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Install a `tracing-subscriber` on stderr with span close timings.
///
/// `RUST_LOG` wins over `level` when it is set.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, level: LevelFilter) {
    let directive = format!(
        "warn,{OWN_TARGET}={level},{OWN_TARGET}_core={level},{OWN_TARGET}_calib={level}",
        level = level.to_string().to_lowercase()
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}
