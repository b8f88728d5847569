//! # Rust Tee Logger
//!
//! Structured, level-aware logging for long-running control-plane processes:
//! one handle, a console sink and a file sink, each with its own live
//! thresholds.
//!
//! ## Features
//!
//! - **Live Levels**: emit and stack-trace thresholds are shared atomic handles
//! - **Sampling**: first 100 per second per message, then 1 in 100
//! - **Fan-out**: one entry reaches every sink through a tee
//! - **Structured**: line-delimited JSON or console output with key/value fields
//!
//! ## Example
//!
//! ```
//! use rust_tee_logger::prelude::*;
//! use rust_tee_logger::info;
//!
//! let file = tempfile::tempfile().unwrap();
//! let log = new_tee_logger(file).unwrap();
//! set_logger(log);
//!
//! let ctx = OperationContext::new();
//! info!(from_context(&ctx), "sample", "key" => "value");
//! ```

pub mod config;
pub mod core;
pub mod cores;
pub mod facade;
pub mod global;
pub mod macros;
pub mod options;
pub mod pipeline;

pub mod prelude {
    pub use crate::config::{EncoderKind, LogFlags};
    pub use crate::core::{
        AtomicLevel, CoreStage, Encoder, EncoderConfig, FieldValue, LevelEnabler, LogContext,
        LogEntry, LogLevel, Logger, LoggerError, LoggerMetrics, Result, SharedBuffer, SyncWriter,
        TimestampFormat,
    };
    pub use crate::facade::{LogHandle, LogSink};
    pub use crate::global::{from_context, logger, set_logger, OperationContext};
    pub use crate::options::{new_raw, new_raw_core, Options, RawCore, SinkOptions};
    pub use crate::pipeline::{new_tee_logger, new_tee_logger_with};
}

pub use config::{EncoderKind, LogFlags};
pub use core::{
    AtomicLevel, CheckedEntry, ConsoleEncoder, Core, CoreStage, Encoder, EncoderConfig,
    EncoderConfigOption, EncoderFactory, FieldValue, JsonEncoder, LevelEnabler, LevelFormat,
    LogContext, LogEntry, LogLevel, LogSampler, Logger, LoggerError, LoggerMetrics, Result,
    SamplerMetrics, SamplingConfig, SharedBuffer, SyncWriter, TimestampFormat,
    SAMPLING_BYPASS_LEVEL,
};
pub use cores::{IoCore, SamplerCore, Tee};
pub use facade::{LogHandle, LogSink};
pub use global::{from_context, logger, set_logger, OperationContext};
pub use options::{new_raw, new_raw_core, Options, RawCore, SinkOptions};
pub use pipeline::{new_tee, new_tee_logger, new_tee_logger_with};
