//! Core bound to one encoder and one destination stream

use crate::core::{
    AtomicLevel, CheckedEntry, Core, Encoder, LevelEnabler, LogEntry, LogLevel, Result,
    SyncWriter,
};

/// Encodes accepted entries and writes them to a [`SyncWriter`].
///
/// The emit threshold is a shared [`AtomicLevel`]; changing it through any
/// clone of the handle takes effect on the next entry. Entries above ERROR
/// are flushed immediately.
pub struct IoCore {
    name: String,
    encoder: Box<dyn Encoder>,
    sink: SyncWriter,
    level: AtomicLevel,
}

impl IoCore {
    pub fn new(encoder: Box<dyn Encoder>, sink: SyncWriter, level: AtomicLevel) -> Self {
        Self {
            name: encoder.name().to_string(),
            encoder,
            sink,
            level,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn level(&self) -> &AtomicLevel {
        &self.level
    }

    pub fn sink(&self) -> &SyncWriter {
        &self.sink
    }

    pub fn encoder(&self) -> &dyn Encoder {
        self.encoder.as_ref()
    }
}

impl Core for IoCore {
    #[inline]
    fn enabled(&self, level: LogLevel) -> bool {
        self.level.enabled(level)
    }

    fn check<'a>(&'a self, entry: &LogEntry, checked: &mut CheckedEntry<'a>) {
        if self.enabled(entry.level) {
            checked.add_core(self);
        }
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        let bytes = self.encoder.encode(entry)?;
        self.sink.write_record(&bytes)?;
        if entry.level > LogLevel::ERROR {
            self.sink.sync()?;
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.sink.sync()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EncoderConfig, JsonEncoder, SharedBuffer, TimestampFormat};

    fn json_core(buffer: &SharedBuffer, level: LogLevel) -> IoCore {
        let config = EncoderConfig {
            time_format: TimestampFormat::Rfc3339,
            ..EncoderConfig::production()
        };
        IoCore::new(
            Box::new(JsonEncoder::new(config)),
            SyncWriter::new(buffer.clone()),
            AtomicLevel::new(level),
        )
    }

    #[test]
    fn test_check_respects_level() {
        let buffer = SharedBuffer::new();
        let core = json_core(&buffer, LogLevel::INFO);

        let mut checked = CheckedEntry::new();
        core.check(&LogEntry::new(LogLevel::DEBUG, "hidden"), &mut checked);
        assert!(checked.is_empty());

        core.check(&LogEntry::new(LogLevel::INFO, "shown"), &mut checked);
        assert_eq!(checked.len(), 1);
    }

    #[test]
    fn test_write_encodes_one_line() {
        let buffer = SharedBuffer::new();
        let core = json_core(&buffer, LogLevel::INFO);

        core.write(&LogEntry::new(LogLevel::WARN, "slow reconcile")).unwrap();

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["level"], "warn");
        assert_eq!(parsed["msg"], "slow reconcile");
    }

    #[test]
    fn test_level_change_is_live() {
        let buffer = SharedBuffer::new();
        let core = json_core(&buffer, LogLevel::INFO);
        let handle = core.level().clone();

        assert!(!core.enabled(LogLevel::DEBUG));
        handle.set_level(LogLevel::DEBUG);
        assert!(core.enabled(LogLevel::DEBUG));
    }

    #[test]
    fn test_name_defaults_to_encoder() {
        let buffer = SharedBuffer::new();
        let core = json_core(&buffer, LogLevel::INFO);
        assert_eq!(core.name(), "json");
        assert_eq!(core.with_name("file").name(), "file");
    }
}
