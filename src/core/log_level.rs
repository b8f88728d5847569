//! Log level definitions
//!
//! Levels are signed: `INFO` is the zero baseline, more severe levels are
//! positive and anything more verbose than `INFO` is negative. Levels below
//! `DEBUG` are verbosity levels (`LogLevel::verbosity(n)` is level `-n`) and
//! have no fixed name.

use super::error::LoggerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI8, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LogLevel(i8);

impl LogLevel {
    pub const DEBUG: LogLevel = LogLevel(-1);
    pub const INFO: LogLevel = LogLevel(0);
    pub const WARN: LogLevel = LogLevel(1);
    pub const ERROR: LogLevel = LogLevel(2);
    pub const FATAL: LogLevel = LogLevel(3);

    /// Most verbose representable level
    pub const MIN: LogLevel = LogLevel(i8::MIN);

    /// Named levels, most verbose first
    pub const NAMED: [LogLevel; 5] = [
        LogLevel::DEBUG,
        LogLevel::INFO,
        LogLevel::WARN,
        LogLevel::ERROR,
        LogLevel::FATAL,
    ];

    pub const fn from_i8(value: i8) -> Self {
        LogLevel(value)
    }

    /// Level for verbosity `v`: `verbosity(0)` is INFO, `verbosity(1)` is DEBUG,
    /// and each further step is one level more verbose.
    pub const fn verbosity(v: u8) -> Self {
        if v > 128 {
            LogLevel::MIN
        } else {
            LogLevel((-(v as i16)) as i8)
        }
    }

    #[inline]
    pub const fn as_i8(self) -> i8 {
        self.0
    }

    /// Whether this level is more verbose than DEBUG.
    #[inline]
    pub const fn is_sub_debug(self) -> bool {
        self.0 < LogLevel::DEBUG.0
    }

    /// Lowercase name, or `None` for verbosity levels and levels above FATAL.
    pub fn name(&self) -> Option<&'static str> {
        match self.0 {
            -1 => Some("debug"),
            0 => Some("info"),
            1 => Some("warn"),
            2 => Some("error"),
            3 => Some("fatal"),
            _ => None,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self.0 {
            -1 => "DEBUG",
            0 => "INFO",
            1 => "WARN",
            2 => "ERROR",
            3 => "FATAL",
            _ if self.0 < -1 => "VERBOSE",
            _ => "FATAL",
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self.0 {
            i8::MIN..=-2 => BrightBlack,
            -1 => Blue,
            0 => Green,
            1 => Yellow,
            2 => Red,
            _ => BrightRed,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    /// Accepts level names or a positive integer verbosity.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "debug" => return Ok(LogLevel::DEBUG),
            "info" => return Ok(LogLevel::INFO),
            "warn" | "warning" => return Ok(LogLevel::WARN),
            "error" => return Ok(LogLevel::ERROR),
            "fatal" => return Ok(LogLevel::FATAL),
            _ => {}
        }

        match trimmed.parse::<u8>() {
            Ok(v) if v > 0 => Ok(LogLevel::verbosity(v)),
            _ => Err(LoggerError::level_parse(s)),
        }
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.name() {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_i8(self.0),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelRepr {
    Name(String),
    Number(i64),
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match LevelRepr::deserialize(deserializer)? {
            LevelRepr::Name(name) => name.parse().map_err(serde::de::Error::custom),
            LevelRepr::Number(n) => i8::try_from(n)
                .map(LogLevel)
                .map_err(|_| serde::de::Error::custom(format!("level {} out of range", n))),
        }
    }
}

/// Anything that can decide whether a level is enabled.
pub trait LevelEnabler: Send + Sync {
    fn enabled(&self, level: LogLevel) -> bool;
}

impl LevelEnabler for LogLevel {
    #[inline]
    fn enabled(&self, level: LogLevel) -> bool {
        level >= *self
    }
}

/// Shared, runtime-adjustable level threshold.
///
/// Clones share the same cell, so an operator can change verbosity on a
/// running process and every core gated by this handle sees it on the next
/// record.
#[derive(Clone)]
pub struct AtomicLevel {
    level: Arc<AtomicI8>,
}

impl AtomicLevel {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level: Arc::new(AtomicI8::new(level.as_i8())),
        }
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        LogLevel(self.level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level.as_i8(), Ordering::Relaxed);
    }

    /// Whether two handles share the same underlying cell.
    pub fn ptr_eq(&self, other: &AtomicLevel) -> bool {
        Arc::ptr_eq(&self.level, &other.level)
    }
}

impl LevelEnabler for AtomicLevel {
    #[inline]
    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new(LogLevel::INFO)
    }
}

impl From<LogLevel> for AtomicLevel {
    fn from(level: LogLevel) -> Self {
        Self::new(level)
    }
}

impl fmt::Debug for AtomicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicLevel").field(&self.level()).finish()
    }
}
