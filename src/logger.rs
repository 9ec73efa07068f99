use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger};

use crate::config::{Config, LogLevel};

impl LogLevel {
    fn level(self) -> Level {
        match self {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

// Warnings and errors go to stderr, everything else to stdout
fn console_sink(stream: StdStream) -> spdlog::Result<Arc<StdStreamSink>> {
    let level_filter = match stream {
        StdStream::Stderr => LevelFilter::MoreSevereEqual(Level::Warn),
        _ => LevelFilter::MoreVerbose(Level::Warn),
    };

    let sink = StdStreamSink::builder()
        .std_stream(stream)
        .level_filter(level_filter)
        .build()?;
    Ok(Arc::new(sink))
}

/// Installs the default logger described by `[log]`.
/// Without a `[log]` section spdlog's console logger stays in place.
pub fn configure_logger(config: &Config) -> spdlog::Result<()> {
    let Some(ref log) = config.log else {
        return Ok(());
    };

    let mut builder = Logger::builder();

    if let Some(ref location) = log.location {
        let daily_sink = Arc::new(RotatingFileSink::builder()
            .base_path(location)
            .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
            .max_files(30)
            .rotate_on_open(false)
            .build()?);
        builder.sink(daily_sink);
    }

    if log.log_to_console || log.location.is_none() {
        builder.sink(console_sink(StdStream::Stdout)?);
        builder.sink(console_sink(StdStream::Stderr)?);
    }

    let logger = Arc::new(builder.build()?);
    logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Info));
    logger.set_flush_period(Some(Duration::from_secs(2)));
    logger.set_level_filter(LevelFilter::MoreSevereEqual(log.level.level()));

    spdlog::set_default_logger(logger);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels() {
        assert_eq!(LogLevel::Critical.level(), Level::Critical);
        assert_eq!(LogLevel::Warn.level(), Level::Warn);
        assert_eq!(LogLevel::Trace.level(), Level::Trace);
    }
}
