//! Process-wide logging setup.
//!
//! Without the `tracing` feature, [`init_with_level`] routes the `log` facade
//! to stderr, one line per record:
//!
//! ```text
//! +0.012s DEBUG crossgrid_detect::boxes: 225 candidate boxes
//! ```
//!
//! With `tracing`, `init_tracing` installs a `tracing-subscriber` instead.

use std::fmt::Arguments;
use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct ElapsedLogger {
    max_level: LevelFilter,
    epoch: Instant,
}

fn format_line(secs: f64, level: Level, target: &str, args: &Arguments<'_>) -> String {
    format!("+{secs:.3}s {level:<5} {target}: {args}")
}

impl Log for ElapsedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.epoch.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static ELAPSED_LOGGER: OnceLock<ElapsedLogger> = OnceLock::new();

/// Route `log` records at or above `level` to stderr.
///
/// The first call wins; repeated calls return `Ok(())` and keep the level
/// set by the first one.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if ELAPSED_LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = ELAPSED_LOGGER.get_or_init(|| ElapsedLogger {
        max_level: level,
        epoch: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Parse `off|error|warn|info|debug|trace` (case-insensitive), defaulting to `Info`.
pub fn parse_level(s: &str) -> LevelFilter {
    LevelFilter::from_str(s.trim()).unwrap_or(LevelFilter::Info)
}

/// Install a `tracing` fmt subscriber on stderr, filtered by `RUST_LOG`
/// (default `info`). Span close events carry their timings.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let _ = if json {
        subscriber.json().flatten_event(true).finish().try_init()
    } else {
        subscriber
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_is_lenient() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), LevelFilter::Warn);
        assert_eq!(parse_level("chatty"), LevelFilter::Info);
    }

    #[test]
    fn line_carries_elapsed_level_and_target() {
        let line = format_line(
            2.25,
            Level::Warn,
            "crossgrid_detect::geometry",
            &format_args!("{} boxes", 3),
        );
        assert_eq!(line, "+2.250s WARN  crossgrid_detect::geometry: 3 boxes");
    }

    #[test]
    fn init_error_boxes_into_std_error() -> Result<(), Box<dyn std::error::Error>> {
        init_with_level(LevelFilter::Warn)?;
        // second call keeps the installed logger
        init_with_level(LevelFilter::Trace)?;
        assert_eq!(log::max_level(), LevelFilter::Warn);
        Ok(())
    }
}
