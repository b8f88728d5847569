//! Record encoders
//!
//! An [`Encoder`] turns one [`LogEntry`] into the bytes of one record. Two
//! encoders ship with the crate:
//!
//! - [`JsonEncoder`]: one JSON object per line, for collectors
//! - [`ConsoleEncoder`]: tab-separated text for humans, used in development
//!
//! Both are built by an [`EncoderFactory`] from an ordered list of
//! [`EncoderConfigOption`]s applied to a base [`EncoderConfig`]; later options
//! override earlier ones.

use super::error::{LoggerError, Result};
use super::log_context::{FieldValue, LogContext};
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// How level values are rendered.
///
/// Named levels use their name. Verbosity levels and levels above FATAL have
/// no name and are written as signed integers, both in JSON (`"level":-3`)
/// and in text (`-3`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LevelFormat {
    /// `info`, `error`
    #[default]
    Lowercase,
    /// `INFO`, `ERROR`
    Capital,
    /// Capital names with ANSI colours in text output
    CapitalColor,
}

impl LevelFormat {
    pub fn to_json(&self, level: LogLevel) -> serde_json::Value {
        if level.name().is_none() {
            return serde_json::Value::Number(level.as_i8().into());
        }
        let name = match self {
            LevelFormat::Lowercase => level.to_string(),
            LevelFormat::Capital | LevelFormat::CapitalColor => level.to_str().to_string(),
        };
        serde_json::Value::String(name)
    }

    pub fn to_text(&self, level: LogLevel) -> String {
        if level.name().is_none() {
            return level.to_string();
        }
        match self {
            LevelFormat::Lowercase => level.to_string(),
            LevelFormat::Capital => level.to_str().to_string(),
            #[cfg(feature = "console")]
            LevelFormat::CapitalColor => {
                use colored::Colorize;
                level.to_str().color(level.color_code()).to_string()
            }
            #[cfg(not(feature = "console"))]
            LevelFormat::CapitalColor => level.to_str().to_string(),
        }
    }

    /// Inverse of [`LevelFormat::to_json`], accepting any name casing
    pub fn parse_json(value: &serde_json::Value) -> Option<LogLevel> {
        match value {
            serde_json::Value::String(name) => name.parse().ok(),
            serde_json::Value::Number(n) => {
                n.as_i64().and_then(|n| i8::try_from(n).ok()).map(LogLevel::from_i8)
            }
            _ => None,
        }
    }
}

/// Keys and formats used when encoding a record.
///
/// An empty key omits that element from the output.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    pub message_key: String,
    pub level_key: String,
    pub time_key: String,
    pub name_key: String,
    pub stacktrace_key: String,
    pub line_ending: String,
    pub level_format: LevelFormat,
    pub time_format: TimestampFormat,
    /// Separator between elements in console output
    pub console_separator: String,
}

impl EncoderConfig {
    /// Collector-friendly configuration: lowercase levels, epoch timestamps
    pub fn production() -> Self {
        Self {
            message_key: "msg".to_string(),
            level_key: "level".to_string(),
            time_key: "ts".to_string(),
            name_key: "logger".to_string(),
            stacktrace_key: "stacktrace".to_string(),
            line_ending: "\n".to_string(),
            level_format: LevelFormat::Lowercase,
            time_format: TimestampFormat::Epoch,
            console_separator: "\t".to_string(),
        }
    }

    /// Human-friendly configuration: coloured capital levels, ISO 8601 time
    pub fn development() -> Self {
        Self {
            level_format: LevelFormat::CapitalColor,
            time_format: TimestampFormat::Iso8601,
            ..Self::production()
        }
    }

    fn is_reserved(&self, key: &str) -> bool {
        !key.is_empty()
            && [
                &self.level_key,
                &self.time_key,
                &self.name_key,
                &self.message_key,
                &self.stacktrace_key,
            ]
            .iter()
            .any(|reserved| reserved.as_str() == key)
    }

    /// Wire key for a context field.
    ///
    /// A field named like one of the record's own keys gets a leading `_`, as
    /// does any key that already looks escaped (`_level`, `__level`), so
    /// [`EncoderConfig::field_key_from_wire`] can always undo it.
    pub fn field_key_to_wire<'a>(&self, key: &'a str) -> Cow<'a, str> {
        if self.is_reserved(key.trim_start_matches('_')) {
            Cow::Owned(format!("_{}", key))
        } else {
            Cow::Borrowed(key)
        }
    }

    /// Inverse of [`EncoderConfig::field_key_to_wire`]
    pub fn field_key_from_wire<'a>(&self, key: &'a str) -> &'a str {
        match key.strip_prefix('_') {
            Some(rest) if self.is_reserved(rest.trim_start_matches('_')) => rest,
            _ => key,
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::production()
    }
}

/// Serializes one log entry into its wire representation.
pub trait Encoder: Send + Sync {
    /// Encode the entry including the trailing line ending
    fn encode(&self, entry: &LogEntry) -> Result<Vec<u8>>;

    fn name(&self) -> &str;

    fn config(&self) -> Option<&EncoderConfig> {
        None
    }
}

/// Mutates an [`EncoderConfig`] before an encoder is built from it.
pub type EncoderConfigOption = Arc<dyn Fn(&mut EncoderConfig) + Send + Sync>;

/// Builds an encoder from an ordered option list.
pub type EncoderFactory =
    Arc<dyn Fn(&[EncoderConfigOption]) -> Result<Box<dyn Encoder>> + Send + Sync>;

/// Option that sets the time format
pub fn time_encoder_option(format: TimestampFormat) -> EncoderConfigOption {
    Arc::new(move |config: &mut EncoderConfig| config.time_format = format.clone())
}

/// Option that sets the level format
pub fn level_format_option(format: LevelFormat) -> EncoderConfigOption {
    Arc::new(move |config: &mut EncoderConfig| config.level_format = format)
}

fn apply_options(mut config: EncoderConfig, options: &[EncoderConfigOption]) -> EncoderConfig {
    for option in options {
        option(&mut config);
    }
    config
}

/// Factory for [`JsonEncoder`] starting from [`EncoderConfig::production`]
pub fn json_encoder_factory() -> EncoderFactory {
    Arc::new(|options: &[EncoderConfigOption]| -> Result<Box<dyn Encoder>> {
        let config = apply_options(EncoderConfig::production(), options);
        Ok(Box::new(JsonEncoder::new(config)))
    })
}

/// Factory for [`ConsoleEncoder`] starting from [`EncoderConfig::development`]
pub fn console_encoder_factory() -> EncoderFactory {
    Arc::new(|options: &[EncoderConfigOption]| -> Result<Box<dyn Encoder>> {
        let config = apply_options(EncoderConfig::development(), options);
        Ok(Box::new(ConsoleEncoder::new(config)))
    })
}

/// Line-delimited JSON encoder
///
/// Element order: level, time, logger name, message, context fields in
/// insertion order, stack trace.
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Write a record element; an empty key disables the element
    fn write_element(
        buf: &mut Vec<u8>,
        first: &mut bool,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }
        Self::write_pair(buf, first, key, value)
    }

    fn write_pair(
        buf: &mut Vec<u8>,
        first: &mut bool,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        if !*first {
            buf.push(b',');
        }
        *first = false;
        serde_json::to_writer(&mut *buf, key)?;
        buf.push(b':');
        serde_json::to_writer(&mut *buf, value)?;
        Ok(())
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let config = &self.config;
        let mut buf = Vec::with_capacity(256);
        let mut first = true;

        buf.push(b'{');
        Self::write_element(
            &mut buf,
            &mut first,
            &config.level_key,
            &config.level_format.to_json(entry.level),
        )?;
        Self::write_element(
            &mut buf,
            &mut first,
            &config.time_key,
            &config.time_format.to_json(&entry.timestamp),
        )?;
        if let Some(ref name) = entry.logger_name {
            Self::write_element(
                &mut buf,
                &mut first,
                &config.name_key,
                &serde_json::Value::String(name.clone()),
            )?;
        }
        Self::write_element(
            &mut buf,
            &mut first,
            &config.message_key,
            &serde_json::Value::String(entry.message.clone()),
        )?;
        for (key, value) in entry.context.fields() {
            Self::write_pair(
                &mut buf,
                &mut first,
                &config.field_key_to_wire(key),
                &value.to_json_value(),
            )?;
        }
        if let Some(ref stack) = entry.stacktrace {
            Self::write_element(
                &mut buf,
                &mut first,
                &config.stacktrace_key,
                &serde_json::Value::String(stack.clone()),
            )?;
        }
        buf.push(b'}');
        buf.extend_from_slice(config.line_ending.as_bytes());
        Ok(buf)
    }

    fn name(&self) -> &str {
        "json"
    }

    fn config(&self) -> Option<&EncoderConfig> {
        Some(&self.config)
    }
}

/// Human-readable encoder
///
/// `time<TAB>LEVEL<TAB>logger<TAB>message<TAB>{"field":...}` followed by the
/// stack trace on its own lines.
#[derive(Debug, Clone)]
pub struct ConsoleEncoder {
    config: EncoderConfig,
}

impl ConsoleEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }
}

impl Encoder for ConsoleEncoder {
    fn encode(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let config = &self.config;
        let mut parts: Vec<String> = Vec::with_capacity(5);

        if !config.time_key.is_empty() {
            parts.push(config.time_format.format(&entry.timestamp));
        }
        if !config.level_key.is_empty() {
            parts.push(config.level_format.to_text(entry.level));
        }
        if let Some(ref name) = entry.logger_name {
            if !config.name_key.is_empty() {
                parts.push(name.clone());
            }
        }
        if !config.message_key.is_empty() {
            parts.push(entry.message.clone());
        }
        if !entry.context.is_empty() {
            parts.push(serde_json::to_string(&serde_json::Value::Object(
                entry.context.to_json_object(),
            ))?);
        }

        let mut line = parts.join(&config.console_separator);
        if let Some(ref stack) = entry.stacktrace {
            if !config.stacktrace_key.is_empty() {
                line.push('\n');
                line.push_str(stack.trim_end());
            }
        }
        line.push_str(&config.line_ending);
        Ok(line.into_bytes())
    }

    fn name(&self) -> &str {
        "console"
    }

    fn config(&self) -> Option<&EncoderConfig> {
        Some(&self.config)
    }
}

impl fmt::Debug for dyn Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder").field("name", &self.name()).finish()
    }
}

/// Decode one line written by a [`JsonEncoder`] using the same config.
///
/// Level, time (to the format's precision), logger name, message, stack trace
/// and context fields are recovered; fields come back in first-seen order
/// with escaped keys restored.
pub fn decode_json_line(line: &str, config: &EncoderConfig) -> Result<LogEntry> {
    let value: serde_json::Value = serde_json::from_str(line.trim_end())?;
    let object = value
        .as_object()
        .ok_or_else(|| LoggerError::encoder("json", "record is not a JSON object"))?;

    let level = object
        .get(&config.level_key)
        .and_then(LevelFormat::parse_json)
        .ok_or_else(|| LoggerError::encoder("json", "missing or invalid level"))?;
    let timestamp = object
        .get(&config.time_key)
        .and_then(|ts| config.time_format.parse_json(ts))
        .ok_or_else(|| LoggerError::encoder("json", "missing or invalid timestamp"))?;
    let message = object
        .get(&config.message_key)
        .and_then(|m| m.as_str())
        .ok_or_else(|| LoggerError::encoder("json", "missing message"))?;

    let mut context = LogContext::new();
    for (key, value) in object {
        if !config.is_reserved(key) {
            context.add_field(
                config.field_key_from_wire(key),
                FieldValue::from_json_value(value),
            );
        }
    }

    Ok(LogEntry {
        level,
        timestamp,
        logger_name: object
            .get(&config.name_key)
            .and_then(|n| n.as_str())
            .map(String::from),
        message: message.to_string(),
        context,
        stacktrace: object
            .get(&config.stacktrace_key)
            .and_then(|s| s.as_str())
            .map(String::from),
    })
}
