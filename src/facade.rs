//! Structured logging handle used by application code
//!
//! Application code only sees [`LogHandle`]: leveled emission with key/value
//! fields, named scopes, attached values and error reporting. The pipeline
//! behind it (encoders, sampling, tee) stays behind the [`LogSink`] trait.

use crate::core::{LogContext, LogLevel, Logger, Result};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Key under which [`LogHandle::error`] attaches the error text
pub const ERROR_KEY: &str = "error";

/// Backend behind a [`LogHandle`].
pub trait LogSink: Send + Sync {
    fn enabled(&self, level: LogLevel) -> bool;

    /// Emit a non-error entry at `level`
    fn info(&self, level: LogLevel, message: &str, fields: &LogContext);

    /// Emit an error entry; `err`, when present, is attached under [`ERROR_KEY`]
    fn error(&self, err: Option<&dyn Error>, message: &str, fields: &LogContext);

    fn with_values(&self, fields: &LogContext) -> Arc<dyn LogSink>;

    fn with_name(&self, name: &str) -> Arc<dyn LogSink>;

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}

impl LogSink for Logger {
    fn enabled(&self, level: LogLevel) -> bool {
        Logger::enabled(self, level)
    }

    fn info(&self, level: LogLevel, message: &str, fields: &LogContext) {
        self.log(level, message, fields);
    }

    fn error(&self, err: Option<&dyn Error>, message: &str, fields: &LogContext) {
        match err {
            Some(err) => {
                let mut context = LogContext::new().with_field(ERROR_KEY, err.to_string());
                context.extend(fields);
                self.log(LogLevel::ERROR, message, &context);
            }
            None => self.log(LogLevel::ERROR, message, fields),
        }
    }

    fn with_values(&self, fields: &LogContext) -> Arc<dyn LogSink> {
        Arc::new(self.with_fields(fields))
    }

    fn with_name(&self, name: &str) -> Arc<dyn LogSink> {
        Arc::new(Logger::with_name(self, name))
    }

    fn sync(&self) -> Result<()> {
        Logger::sync(self)
    }
}

/// Cheap, clonable logging handle.
///
/// Clones share the same sink. `with_name`, `with_values` and `v` return new
/// handles and leave the original untouched.
///
/// # Example
///
/// ```
/// use rust_tee_logger::prelude::*;
///
/// let buffer = SharedBuffer::new();
/// let log = LogHandle::new(new_raw(Options::new().write_to(buffer.clone())).unwrap());
///
/// log.with_name("setup").info("starting manager", &LogContext::new().with_field("replicas", 3));
/// log.v(1).info("not shown at the default level", &LogContext::new());
///
/// assert_eq!(buffer.lines().len(), 1);
/// ```
#[derive(Clone)]
pub struct LogHandle {
    sink: Arc<dyn LogSink>,
    verbosity: u8,
}

impl LogHandle {
    pub fn new<S: LogSink + 'static>(sink: S) -> Self {
        Self::from_sink(Arc::new(sink))
    }

    pub fn from_sink(sink: Arc<dyn LogSink>) -> Self {
        Self { sink, verbosity: 0 }
    }

    /// Handle that drops everything
    pub fn discard() -> Self {
        Self::new(Logger::discard())
    }

    /// Level this handle emits `info` at
    pub fn level(&self) -> LogLevel {
        LogLevel::verbosity(self.verbosity)
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn enabled(&self) -> bool {
        self.sink.enabled(self.level())
    }

    pub fn info(&self, message: impl AsRef<str>, fields: &LogContext) {
        let level = self.level();
        if self.sink.enabled(level) {
            self.sink.info(level, message.as_ref(), fields);
        }
    }

    /// Error entries ignore the handle's verbosity
    pub fn error(&self, err: &dyn Error, message: impl AsRef<str>, fields: &LogContext) {
        self.sink.error(Some(err), message.as_ref(), fields);
    }

    /// Error entry with no underlying error value
    pub fn error_msg(&self, message: impl AsRef<str>, fields: &LogContext) {
        self.sink.error(None, message.as_ref(), fields);
    }

    /// Handle `level` steps more verbose than this one
    #[must_use]
    pub fn v(&self, level: u8) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            verbosity: self.verbosity.saturating_add(level),
        }
    }

    #[must_use]
    pub fn with_name(&self, name: impl AsRef<str>) -> Self {
        Self {
            sink: self.sink.with_name(name.as_ref()),
            verbosity: self.verbosity,
        }
    }

    #[must_use]
    pub fn with_values(&self, fields: &LogContext) -> Self {
        Self {
            sink: self.sink.with_values(fields),
            verbosity: self.verbosity,
        }
    }

    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    pub fn sync(&self) -> Result<()> {
        self.sink.sync()
    }
}

impl From<Logger> for LogHandle {
    fn from(logger: Logger) -> Self {
        Self::new(logger)
    }
}

impl fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogHandle")
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}
