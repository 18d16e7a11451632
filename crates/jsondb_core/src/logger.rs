//! Pluggable diagnostic logging.
//!
//! The store reports what it does through a [`Logger`] handed to it at
//! construction. The default [`TracingLogger`] forwards to `tracing`, so
//! output ends up wherever the application's subscriber sends it.

use std::fmt;

/// Severity of a log message, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Unrecoverable condition.
    Fatal,
    /// Operation failed.
    Error,
    /// Something unexpected that did not fail the operation.
    Warn,
    /// Normal operational messages.
    Info,
    /// Diagnostic detail.
    Debug,
    /// Very fine-grained detail.
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        };
        f.write_str(name)
    }
}

/// A leveled logger the store writes diagnostics to.
///
/// Implementors only need [`Logger::log`]; the per-level methods forward to
/// it. Messages are passed as [`fmt::Arguments`] so nothing is formatted
/// unless the implementation decides to keep the message.
pub trait Logger: Send + Sync {
    /// Records one message at the given level.
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>);

    /// Logs at [`LogLevel::Fatal`].
    fn fatal(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Fatal, args);
    }

    /// Logs at [`LogLevel::Error`].
    fn error(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }

    /// Logs at [`LogLevel::Warn`].
    fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    /// Logs at [`LogLevel::Info`].
    fn info(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    /// Logs at [`LogLevel::Debug`].
    fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    /// Logs at [`LogLevel::Trace`].
    fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Trace, args);
    }
}

/// Forwards messages to `tracing`, dropping anything below a threshold.
///
/// `tracing` has no fatal level; fatal messages are emitted as errors with a
/// `fatal = true` field.
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger {
    max_level: LogLevel,
}

impl TracingLogger {
    /// Creates a logger that keeps messages at `max_level` or more severe.
    #[must_use]
    pub const fn new(max_level: LogLevel) -> Self {
        Self { max_level }
    }

    /// Returns the least severe level this logger emits.
    #[must_use]
    pub const fn max_level(&self) -> LogLevel {
        self.max_level
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if level > self.max_level {
            return;
        }
        match level {
            LogLevel::Fatal => tracing::error!(fatal = true, "{}", args),
            LogLevel::Error => tracing::error!("{}", args),
            LogLevel::Warn => tracing::warn!("{}", args),
            LogLevel::Info => tracing::info!("{}", args),
            LogLevel::Debug => tracing::debug!("{}", args),
            LogLevel::Trace => tracing::trace!("{}", args),
        }
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: LogLevel, _args: fmt::Arguments<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        lines: Mutex<Vec<(LogLevel, String)>>,
    }

    impl Logger for Recorder {
        fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
            self.lines.lock().push((level, args.to_string()));
        }
    }

    #[test]
    fn level_methods_forward_to_log() {
        let recorder = Recorder::default();
        recorder.fatal(format_args!("f{}", 1));
        recorder.error(format_args!("e"));
        recorder.warn(format_args!("w"));
        recorder.info(format_args!("done creating: {}", "42"));
        recorder.debug(format_args!("d"));
        recorder.trace(format_args!("t"));

        let lines = recorder.lines.lock();
        let levels: Vec<_> = lines.iter().map(|(l, _)| *l).collect();
        assert_eq!(
            levels,
            vec![
                LogLevel::Fatal,
                LogLevel::Error,
                LogLevel::Warn,
                LogLevel::Info,
                LogLevel::Debug,
                LogLevel::Trace
            ]
        );
        assert_eq!(lines[0].1, "f1");
        assert_eq!(lines[3].1, "done creating: 42");
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(LogLevel::Fatal < LogLevel::Info);
        assert!(LogLevel::Trace > LogLevel::Debug);
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
    }

    #[test]
    fn tracing_logger_defaults_to_info() {
        let logger = TracingLogger::default();
        assert_eq!(logger.max_level(), LogLevel::Info);
        // No subscriber installed; these must simply not panic.
        logger.info(format_args!("kept"));
        logger.trace(format_args!("dropped"));
    }
}
