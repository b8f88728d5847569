//! Core logger types and traits

pub mod encoder;
pub mod error;
pub mod log_context;
pub mod log_core;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod sampling;
pub mod sink;
pub mod timestamp;

pub use encoder::{
    console_encoder_factory, decode_json_line, json_encoder_factory, level_format_option,
    time_encoder_option, ConsoleEncoder, Encoder, EncoderConfig, EncoderConfigOption,
    EncoderFactory, JsonEncoder, LevelFormat,
};
pub use error::{LoggerError, Result};
pub use log_context::{FieldValue, LogContext};
pub use log_core::{CheckedEntry, Core};
pub use log_entry::{capture_stacktrace, LogEntry};
pub use log_level::{AtomicLevel, LevelEnabler, LogLevel};
pub use logger::{CoreStage, Logger};
pub use metrics::LoggerMetrics;
pub use sampling::{
    LogSampler, SamplerMetrics, SamplingConfig, SamplingDecision, SAMPLING_BYPASS_LEVEL,
};
pub use sink::{SharedBuffer, SyncWriter};
pub use timestamp::TimestampFormat;
