//! Command-line and file configuration for the logging pipeline
//!
//! [`LogFlags`] can be flattened into a `clap` parser or deserialized from a
//! config file. Only values the operator actually supplied are applied to an
//! [`Options`]; everything else is left for defaulting.

use crate::core::{
    console_encoder_factory, json_encoder_factory, LogLevel, LoggerError, Result, TimestampFormat,
};
use crate::options::Options;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Encoder selected with `--log-encoder`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    Json,
    Console,
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderKind::Json => write!(f, "json"),
            EncoderKind::Console => write!(f, "console"),
        }
    }
}

/// Logging flags
///
/// # Example
///
/// ```
/// use clap::Parser;
/// use rust_tee_logger::prelude::*;
///
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     log: LogFlags,
/// }
///
/// let cli = Cli::parse_from(["manager", "--log-level", "2", "--log-encoder", "console"]);
/// assert_eq!(cli.log.level, Some(LogLevel::verbosity(2)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, clap::Args, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogFlags {
    /// Development mode defaults (console encoder, debug level, warn stack traces)
    #[arg(long = "log-devel")]
    pub development: bool,

    /// Log encoding
    #[arg(long = "log-encoder", value_enum)]
    pub encoder: Option<EncoderKind>,

    /// Minimum enabled level: debug, info, warn, error, fatal or a verbosity integer > 0
    #[arg(long = "log-level")]
    #[serde(deserialize_with = "from_str_opt")]
    pub level: Option<LogLevel>,

    /// Level at and above which stack traces are captured: info, warn, error or fatal
    #[arg(long = "log-stacktrace-level")]
    #[serde(deserialize_with = "from_str_opt")]
    pub stacktrace_level: Option<LogLevel>,

    /// Time encoding: epoch, millis, nano, iso8601, rfc3339 or rfc3339nano
    #[arg(long = "log-time-encoding")]
    #[serde(deserialize_with = "from_str_opt")]
    pub time_encoding: Option<TimestampFormat>,
}

impl LogFlags {
    /// Parse flags from a JSON config document
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply supplied flags on top of `options`.
    ///
    /// Fails when the stack-trace level is more verbose than INFO.
    pub fn apply(&self, options: Options) -> Result<Options> {
        let mut options = options;

        if self.development {
            options = options.development(true);
        }

        if let Some(kind) = self.encoder {
            options = options.new_encoder(match kind {
                EncoderKind::Json => json_encoder_factory(),
                EncoderKind::Console => console_encoder_factory(),
            });
        }

        if let Some(level) = self.level {
            options = options.level(level);
        }

        if let Some(level) = self.stacktrace_level {
            if level < LogLevel::INFO {
                return Err(LoggerError::config(
                    "log-stacktrace-level",
                    format!("'{}' is below info", level),
                ));
            }
            options = options.stacktrace_level(level);
        }

        if let Some(ref format) = self.time_encoding {
            options = options.time_encoder(format.clone());
        }

        Ok(options)
    }
}

fn from_str_opt<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Text(text)) => text.parse().map(Some).map_err(serde::de::Error::custom),
        Some(Raw::Number(n)) => n
            .to_string()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(flatten)]
        log: LogFlags,
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "manager",
            "--log-devel",
            "--log-encoder",
            "json",
            "--log-level",
            "warn",
            "--log-stacktrace-level",
            "fatal",
            "--log-time-encoding",
            "millis",
        ])
        .unwrap();

        assert!(cli.log.development);
        assert_eq!(cli.log.encoder, Some(EncoderKind::Json));
        assert_eq!(cli.log.level, Some(LogLevel::WARN));
        assert_eq!(cli.log.stacktrace_level, Some(LogLevel::FATAL));
        assert_eq!(cli.log.time_encoding, Some(TimestampFormat::EpochMillis));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Cli::try_parse_from(["manager", "--log-level", "loud"]).is_err());
        assert!(Cli::try_parse_from(["manager", "--log-level", "0"]).is_err());
        assert!(Cli::try_parse_from(["manager", "--log-encoder", "xml"]).is_err());
        assert!(Cli::try_parse_from(["manager", "--log-time-encoding", "week"]).is_err());
    }

    #[test]
    fn test_apply_only_supplied_values() {
        let flags = LogFlags::default();
        let options = flags.apply(Options::new()).unwrap();
        assert!(!options.has_level());
        assert!(!options.has_encoder());
        assert!(!options.has_time_encoder());

        let flags = LogFlags {
            level: Some(LogLevel::verbosity(3)),
            ..LogFlags::default()
        };
        let sink = flags.apply(Options::new()).unwrap().finalize().unwrap();
        assert_eq!(sink.level.level(), LogLevel::verbosity(3));
        assert!(!sink.is_sampled());
    }

    #[test]
    fn test_apply_encoder_and_time() {
        let flags = LogFlags {
            encoder: Some(EncoderKind::Console),
            time_encoding: Some(TimestampFormat::Iso8601),
            ..LogFlags::default()
        };
        let sink = flags.apply(Options::new()).unwrap().finalize().unwrap();

        assert_eq!(sink.encoder.name(), "console");
        assert_eq!(sink.encoder.config().unwrap().time_format, TimestampFormat::Iso8601);
    }

    #[test]
    fn test_sub_info_stacktrace_level_rejected() {
        let flags = LogFlags {
            stacktrace_level: Some(LogLevel::DEBUG),
            ..LogFlags::default()
        };
        assert!(matches!(
            flags.apply(Options::new()),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_from_json() {
        let flags = LogFlags::from_json(
            r#"{"development": true, "encoder": "console", "level": 2, "time_encoding": "rfc3339nano"}"#,
        )
        .unwrap();

        assert!(flags.development);
        assert_eq!(flags.encoder, Some(EncoderKind::Console));
        assert_eq!(flags.level, Some(LogLevel::verbosity(2)));
        assert_eq!(flags.time_encoding, Some(TimestampFormat::Rfc3339Nano));
        assert!(LogFlags::from_json(r#"{"verbose": true}"#).is_err());
    }
}
