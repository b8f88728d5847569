//! Timestamp formatting utilities
//!
//! Provides the time encodings a record's `ts` field can use. Numeric formats
//! are written as JSON numbers, everything else as strings. Every format can
//! read back what it wrote, to its own precision.

use super::error::LoggerError;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

/// Standardized timestamp format options
///
/// # Examples
///
/// ```
/// use rust_tee_logger::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Rfc3339.format(&ts), "2025-01-08T10:30:45Z");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Floating-point seconds since the Unix epoch: `1736332245.123456`
    Epoch,

    /// Integer milliseconds since the Unix epoch: `1736332245123`
    EpochMillis,

    /// Integer nanoseconds since the Unix epoch: `1736332245123456000`
    EpochNanos,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// RFC 3339 with second precision: `2025-01-08T10:30:45Z`
    ///
    /// The standard format installed by option defaulting.
    #[default]
    Rfc3339,

    /// RFC 3339 with nanoseconds: `2025-01-08T10:30:45.123456000Z`
    Rfc3339Nano,

    /// Custom strftime format
    ///
    /// ```
    /// use rust_tee_logger::TimestampFormat;
    ///
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    /// Format a `DateTime<Utc>` as text
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Epoch => format!("{}", epoch_seconds(datetime)),
            TimestampFormat::EpochMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::EpochNanos => epoch_nanos(datetime).to_string(),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(SecondsFormat::Secs, true),
            TimestampFormat::Rfc3339Nano => datetime.to_rfc3339_opts(SecondsFormat::Nanos, true),
            TimestampFormat::Custom(format_str) => {
                let mut text = String::new();
                match write!(text, "{}", datetime.format(format_str)) {
                    Ok(()) => text,
                    Err(_) => datetime.to_rfc3339_opts(SecondsFormat::Secs, true),
                }
            }
        }
    }

    /// Reject custom strftime strings chrono cannot render
    pub fn validate(&self) -> Result<(), LoggerError> {
        match self {
            TimestampFormat::Custom(format_str)
                if StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error)) =>
            {
                Err(LoggerError::config(
                    "time encoding",
                    format!("invalid strftime format '{}'", format_str),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Encode for a JSON record: numbers for epoch formats, strings otherwise
    #[must_use]
    pub fn to_json(&self, datetime: &DateTime<Utc>) -> serde_json::Value {
        match self {
            TimestampFormat::Epoch => serde_json::Number::from_f64(epoch_seconds(datetime))
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            TimestampFormat::EpochMillis => {
                serde_json::Value::Number(datetime.timestamp_millis().into())
            }
            TimestampFormat::EpochNanos => serde_json::Value::Number(epoch_nanos(datetime).into()),
            _ => serde_json::Value::String(self.format(datetime)),
        }
    }

    /// Read back a value written by [`TimestampFormat::to_json`]
    pub fn parse_json(&self, value: &serde_json::Value) -> Option<DateTime<Utc>> {
        match (self, value) {
            (TimestampFormat::Epoch, serde_json::Value::Number(n)) => {
                let secs = n.as_f64()?;
                let whole = secs.floor();
                let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
                Utc.timestamp_opt(whole as i64, nanos).single()
            }
            (TimestampFormat::EpochMillis, serde_json::Value::Number(n)) => {
                Utc.timestamp_millis_opt(n.as_i64()?).single()
            }
            (TimestampFormat::EpochNanos, serde_json::Value::Number(n)) => {
                Some(Utc.timestamp_nanos(n.as_i64()?))
            }
            (_, serde_json::Value::String(s)) => self.parse(s),
            _ => None,
        }
    }

    /// Parse a textual timestamp in this format
    pub fn parse(&self, text: &str) -> Option<DateTime<Utc>> {
        match self {
            TimestampFormat::Epoch
            | TimestampFormat::EpochMillis
            | TimestampFormat::EpochNanos => {
                let value: serde_json::Value = serde_json::from_str(text).ok()?;
                self.parse_json(&value)
            }
            TimestampFormat::Iso8601 | TimestampFormat::Rfc3339 | TimestampFormat::Rfc3339Nano => {
                DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }
            TimestampFormat::Custom(format_str) => DateTime::parse_from_str(text, format_str)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(text, format_str)
                        .ok()
                        .map(|naive| naive.and_utc())
                }),
        }
    }

    /// Drop everything finer than this format can represent
    #[must_use]
    pub fn truncate(&self, datetime: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.parse_json(&self.to_json(datetime))
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TimestampFormat::Epoch | TimestampFormat::EpochMillis | TimestampFormat::EpochNanos
        )
    }

    /// Get a description of this format
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            TimestampFormat::Epoch => "Seconds since epoch as a float (1736332245.123456)",
            TimestampFormat::EpochMillis => "Milliseconds since epoch (1736332245123)",
            TimestampFormat::EpochNanos => "Nanoseconds since epoch (1736332245123456000)",
            TimestampFormat::Iso8601 => "ISO 8601 with milliseconds (2025-01-08T10:30:45.123Z)",
            TimestampFormat::Rfc3339 => "RFC 3339 (2025-01-08T10:30:45Z)",
            TimestampFormat::Rfc3339Nano => "RFC 3339 with nanoseconds",
            TimestampFormat::Custom(_) => "Custom strftime format",
        }
    }
}

impl FromStr for TimestampFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "epoch" => Ok(TimestampFormat::Epoch),
            "millis" => Ok(TimestampFormat::EpochMillis),
            "nano" | "nanos" => Ok(TimestampFormat::EpochNanos),
            "iso8601" => Ok(TimestampFormat::Iso8601),
            "rfc3339" => Ok(TimestampFormat::Rfc3339),
            "rfc3339nano" => Ok(TimestampFormat::Rfc3339Nano),
            _ => Err(LoggerError::config(
                "time encoding",
                format!(
                    "'{}' is not one of epoch, millis, nano, iso8601, rfc3339, rfc3339nano",
                    s
                ),
            )),
        }
    }
}

fn epoch_seconds(datetime: &DateTime<Utc>) -> f64 {
    datetime.timestamp() as f64 + f64::from(datetime.timestamp_subsec_nanos()) / 1e9
}

fn epoch_nanos(datetime: &DateTime<Utc>) -> i64 {
    datetime
        .timestamp_nanos_opt()
        .unwrap_or_else(|| datetime.timestamp_micros().saturating_mul(1000))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_rfc3339_format() {
        let result = TimestampFormat::Rfc3339.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45Z");
    }

    #[test]
    fn test_rfc3339_nano_format() {
        let result = TimestampFormat::Rfc3339Nano.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123456000Z");
    }

    #[test]
    fn test_iso8601_format() {
        let result = TimestampFormat::Iso8601.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_epoch_formats_are_numbers() {
        let dt = fixed_datetime();
        assert!(TimestampFormat::Epoch.to_json(&dt).is_f64());
        assert_eq!(
            TimestampFormat::EpochMillis.to_json(&dt),
            serde_json::json!(1736332245123_i64)
        );
        assert_eq!(
            TimestampFormat::EpochNanos.to_json(&dt),
            serde_json::json!(1736332245123456000_i64)
        );
        assert!(TimestampFormat::Rfc3339.to_json(&dt).is_string());
    }

    #[test]
    fn test_parse_back_to_precision() {
        let dt = fixed_datetime();
        let secs = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();

        let rfc = TimestampFormat::Rfc3339;
        assert_eq!(rfc.parse_json(&rfc.to_json(&dt)), Some(secs));

        let nano = TimestampFormat::Rfc3339Nano;
        assert_eq!(nano.parse_json(&nano.to_json(&dt)), Some(dt));

        let millis = TimestampFormat::EpochMillis;
        assert_eq!(
            millis.parse_json(&millis.to_json(&dt)),
            Some(secs + chrono::Duration::milliseconds(123))
        );

        let iso = TimestampFormat::Iso8601;
        assert_eq!(
            iso.parse_json(&iso.to_json(&dt)),
            Some(secs + chrono::Duration::milliseconds(123))
        );
    }

    #[test]
    fn test_epoch_float_roundtrip_is_close() {
        let dt = fixed_datetime();
        let parsed = TimestampFormat::Epoch
            .truncate(&dt)
            .expect("epoch parses back");
        let diff = (parsed - dt).num_microseconds().unwrap().abs();
        assert!(diff <= 1, "epoch drift was {}us", diff);
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%Y-%m-%d %H:%M:%S".to_string());
        let text = format.format(&fixed_datetime());
        assert_eq!(text, "2025-01-08 10:30:45");
        assert_eq!(
            format.parse(&text),
            Some(Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap())
        );
    }

    #[test]
    fn test_invalid_custom_format() {
        let format = TimestampFormat::Custom("%Q".to_string());
        assert!(matches!(
            format.validate(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert_eq!(format.format(&fixed_datetime()), "2025-01-08T10:30:45Z");

        assert!(TimestampFormat::Custom("%d/%b/%Y %T".to_string()).validate().is_ok());
        assert!(TimestampFormat::Rfc3339.validate().is_ok());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("rfc3339".parse::<TimestampFormat>().unwrap(), TimestampFormat::Rfc3339);
        assert_eq!("nano".parse::<TimestampFormat>().unwrap(), TimestampFormat::EpochNanos);
        assert_eq!("ISO8601".parse::<TimestampFormat>().unwrap(), TimestampFormat::Iso8601);
        assert!("weekday".parse::<TimestampFormat>().is_err());
    }

    #[test]
    fn test_is_numeric() {
        assert!(TimestampFormat::Epoch.is_numeric());
        assert!(TimestampFormat::EpochNanos.is_numeric());
        assert!(!TimestampFormat::Rfc3339.is_numeric());
        assert!(!TimestampFormat::Custom("%s".to_string()).is_numeric());
    }

    #[test]
    fn test_default_is_rfc3339() {
        assert_eq!(TimestampFormat::default(), TimestampFormat::Rfc3339);
    }
}
