//! Main logger implementation

use super::{
    error::LoggerError,
    log_context::LogContext,
    log_core::{CheckedEntry, Core},
    log_entry::{capture_stacktrace, LogEntry},
    log_level::{AtomicLevel, LevelEnabler, LogLevel},
    metrics::LoggerMetrics,
    sampling::SamplingConfig,
    sink::SyncWriter,
    timestamp::TimestampFormat,
};
use crate::cores::SamplerCore;
use std::fmt;
use std::sync::Arc;

/// One construction-time step applied to a [`Logger`].
///
/// Stages are applied in list order by [`Logger::with_stages`]. Sampling
/// wraps the core built so far; the other two configure the logger around it.
#[derive(Clone, Debug)]
pub enum CoreStage {
    /// Wrap the current core in a [`SamplerCore`]
    Sample(SamplingConfig),
    /// Capture a stack trace for entries at or above this level
    AddStacktrace(AtomicLevel),
    /// Destination for the logger's own write failures
    ErrorOutput(SyncWriter),
}

/// A decorated core plus the per-handle state that travels with it.
///
/// Cloning is cheap and clones share the core, the metrics and the error
/// output. Name and attached fields are copied, so `with_name` and
/// `with_fields` never affect the logger they were called on.
#[derive(Clone)]
pub struct Logger {
    core: Arc<dyn Core>,
    name: Option<String>,
    context: LogContext,
    stacktrace_level: Option<AtomicLevel>,
    error_output: SyncWriter,
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    /// Logger over `core` with no stack capture, reporting failures to stderr
    pub fn new(core: Box<dyn Core>) -> Self {
        Self::with_stages(core, std::iter::empty())
    }

    pub fn with_stages(core: Box<dyn Core>, stages: impl IntoIterator<Item = CoreStage>) -> Self {
        let mut core = core;
        let mut stacktrace_level = None;
        let mut error_output = None;

        for stage in stages {
            match stage {
                CoreStage::Sample(config) => {
                    core = Box::new(SamplerCore::new(core, config));
                }
                CoreStage::AddStacktrace(level) => stacktrace_level = Some(level),
                CoreStage::ErrorOutput(writer) => error_output = Some(writer),
            }
        }

        Self {
            core: Arc::from(core),
            name: None,
            context: LogContext::new(),
            stacktrace_level,
            error_output: error_output.unwrap_or_else(SyncWriter::stderr),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }

    /// Logger that accepts nothing
    pub fn discard() -> Self {
        Self::new(Box::new(NopCore))
    }

    /// Emit one entry.
    ///
    /// Never fails: entries no core accepts are counted as rejected, and write
    /// failures are reported on the error output.
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>, fields: &LogContext) {
        if !self.core.enabled(level) {
            self.metrics.record_rejected();
            return;
        }

        let mut context = self.context.clone();
        context.extend(fields);
        let mut entry = LogEntry::new(level, message)
            .with_logger_name(self.name.clone())
            .with_context(context);

        let mut checked = CheckedEntry::new();
        self.core.check(&entry, &mut checked);
        if checked.is_empty() {
            self.metrics.record_rejected();
            return;
        }

        if self.stacktrace_enabled(level) {
            entry.stacktrace = Some(capture_stacktrace());
            self.metrics.record_stacktrace();
        }

        let failures = checked.write(&entry);
        if failures.is_empty() {
            self.metrics.record_written();
        } else {
            self.metrics.record_write_failure();
            for (core, error) in &failures {
                self.report_error(core, error);
            }
        }
    }

    #[inline]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::DEBUG, message, &LogContext::new());
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::INFO, message, &LogContext::new());
    }

    #[inline]
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::WARN, message, &LogContext::new());
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::ERROR, message, &LogContext::new());
    }

    /// Whether any core would accept `level`
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.core.enabled(level)
    }

    /// Child logger whose name is `name`, or `parent.name` when already named
    #[must_use]
    pub fn with_name(&self, name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let mut child = self.clone();
        child.name = Some(match &self.name {
            Some(parent) if !name.is_empty() => format!("{}.{}", parent, name),
            Some(parent) => parent.clone(),
            None => name.to_string(),
        });
        child
    }

    /// Child logger that attaches `fields` to every entry
    #[must_use]
    pub fn with_fields(&self, fields: &LogContext) -> Self {
        let mut child = self.clone();
        child.context.extend(fields);
        child
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fields(&self) -> &LogContext {
        &self.context
    }

    pub fn stacktrace_level(&self) -> Option<&AtomicLevel> {
        self.stacktrace_level.as_ref()
    }

    pub fn error_output(&self) -> &SyncWriter {
        &self.error_output
    }

    pub fn core(&self) -> &dyn Core {
        self.core.as_ref()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Flush every core; failures are reported and also returned
    pub fn sync(&self) -> super::error::Result<()> {
        self.core.sync().inspect_err(|e| self.report_error("sync", e))
    }

    fn stacktrace_enabled(&self, level: LogLevel) -> bool {
        self.stacktrace_level
            .as_ref()
            .is_some_and(|threshold| threshold.enabled(level))
    }

    fn report_error(&self, core: &str, error: &LoggerError) {
        let line = format!(
            "{} write error: {}: {}\n",
            TimestampFormat::Rfc3339.format(&chrono::Utc::now()),
            core,
            error
        );
        // Nowhere left to report a failure of the error output itself
        let _ = self.error_output.write_record(line.as_bytes());
        let _ = self.error_output.sync();
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("core", &self.core.name())
            .field("name", &self.name)
            .field("fields", &self.context.len())
            .field("stacktrace_level", &self.stacktrace_level)
            .finish()
    }
}

struct NopCore;

impl Core for NopCore {
    fn enabled(&self, _level: LogLevel) -> bool {
        false
    }

    fn check<'a>(&'a self, _entry: &LogEntry, _checked: &mut CheckedEntry<'a>) {}

    fn write(&self, _entry: &LogEntry) -> super::error::Result<()> {
        Ok(())
    }

    fn sync(&self) -> super::error::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "nop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EncoderConfig, JsonEncoder, SharedBuffer};
    use crate::cores::IoCore;
    use std::io::{self, Write};
    use std::time::Duration;

    fn io_core(buffer: &SharedBuffer, level: LogLevel) -> Box<dyn Core> {
        Box::new(IoCore::new(
            Box::new(JsonEncoder::new(EncoderConfig::production())),
            SyncWriter::new(buffer.clone()),
            AtomicLevel::new(level),
        ))
    }

    fn parse(line: &str) -> serde_json::Value {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_level_filtering() {
        let buffer = SharedBuffer::new();
        let logger = Logger::new(io_core(&buffer, LogLevel::INFO));

        logger.debug("hidden");
        logger.info("shown");

        assert_eq!(buffer.lines().len(), 1);
        assert_eq!(logger.metrics().written_count(), 1);
        assert_eq!(logger.metrics().rejected_count(), 1);
    }

    #[test]
    fn test_stacktrace_threshold() {
        let buffer = SharedBuffer::new();
        let logger = Logger::with_stages(
            io_core(&buffer, LogLevel::INFO),
            vec![CoreStage::AddStacktrace(AtomicLevel::new(LogLevel::ERROR))],
        );

        logger.warn("no trace");
        logger.error("with trace");

        let lines = buffer.lines();
        assert!(parse(&lines[0]).get("stacktrace").is_none());
        assert!(parse(&lines[1])["stacktrace"].is_string());
        assert_eq!(logger.metrics().stacktraces_captured(), 1);
    }

    #[test]
    fn test_sampled_out_entries_skip_stack_capture() {
        let buffer = SharedBuffer::new();
        let logger = Logger::with_stages(
            io_core(&buffer, LogLevel::INFO),
            vec![
                CoreStage::Sample(SamplingConfig::new(Duration::from_secs(3600), 1, 0)),
                CoreStage::AddStacktrace(AtomicLevel::new(LogLevel::ERROR)),
            ],
        );

        for _ in 0..5 {
            logger.error("same failure");
        }

        assert_eq!(buffer.lines().len(), 1);
        assert_eq!(logger.metrics().stacktraces_captured(), 1);
        assert_eq!(logger.metrics().rejected_count(), 4);
    }

    #[test]
    fn test_write_errors_go_to_error_output() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let errors = SharedBuffer::new();
        let core = IoCore::new(
            Box::new(JsonEncoder::new(EncoderConfig::production())),
            SyncWriter::new(Broken),
            AtomicLevel::new(LogLevel::INFO),
        );
        let logger = Logger::with_stages(
            Box::new(core),
            vec![CoreStage::ErrorOutput(SyncWriter::new(errors.clone()))],
        );

        logger.info("lost");

        let lines = errors.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("write error"));
        assert!(lines[0].contains("pipe closed"));
        assert_eq!(logger.metrics().write_failures(), 1);
    }

    #[test]
    fn test_with_name_and_fields_do_not_mutate_parent() {
        let buffer = SharedBuffer::new();
        let parent = Logger::new(io_core(&buffer, LogLevel::INFO));
        let child = parent
            .with_name("controller")
            .with_name("pod")
            .with_fields(&LogContext::new().with_field("namespace", "default"));

        child.info("child");
        parent.info("parent");

        let lines = buffer.lines();
        let child_line = parse(&lines[0]);
        assert_eq!(child_line["logger"], "controller.pod");
        assert_eq!(child_line["namespace"], "default");

        let parent_line = parse(&lines[1]);
        assert!(parent_line.get("logger").is_none());
        assert!(parent_line.get("namespace").is_none());
        assert!(parent.name().is_none());
    }

    #[test]
    fn test_call_fields_follow_attached_fields() {
        let buffer = SharedBuffer::new();
        let logger = Logger::new(io_core(&buffer, LogLevel::INFO))
            .with_fields(&LogContext::new().with_field("attempt", 1));

        logger.log(
            LogLevel::INFO,
            "retry",
            &LogContext::new().with_field("attempt", 2),
        );

        assert_eq!(parse(&buffer.lines()[0])["attempt"], 2);
    }

    #[test]
    fn test_discard() {
        let logger = Logger::discard();
        assert!(!logger.enabled(LogLevel::FATAL));
        logger.error("nothing");
        assert_eq!(logger.metrics().written_count(), 0);
        assert!(logger.sync().is_ok());
    }
}
