//! Per-sink options and their defaulting
//!
//! [`Options`] is filled in by the caller (and by command-line flags), then
//! [`Options::finalize`] produces a [`SinkOptions`] with every field populated.
//! A [`SinkOptions`] is turned into a core with [`new_raw_core`] or straight
//! into a single-sink [`Logger`] with [`new_raw`].

use crate::core::{
    console_encoder_factory, json_encoder_factory, time_encoder_option, AtomicLevel, CoreStage,
    Encoder, EncoderConfigOption, EncoderFactory, LevelEnabler, LogLevel, Logger, Result,
    SamplingConfig, SyncWriter, TimestampFormat, SAMPLING_BYPASS_LEVEL,
};
use crate::cores::IoCore;
use std::fmt;
use std::io::Write;

/// Partially populated configuration for one sink.
///
/// Unset fields are filled by [`Options::finalize`]; anything set here is
/// kept as given.
///
/// # Example
///
/// ```
/// use rust_tee_logger::prelude::*;
///
/// let level = AtomicLevel::new(LogLevel::WARN);
/// let sink = Options::new()
///     .write_to(std::io::sink())
///     .level(level.clone())
///     .finalize()
///     .unwrap();
///
/// assert!(sink.level.ptr_eq(&level));
/// assert_eq!(sink.stacktrace_level.level(), LogLevel::ERROR);
/// ```
#[derive(Default)]
pub struct Options {
    development: bool,
    dest: Option<Box<dyn Write + Send>>,
    level: Option<AtomicLevel>,
    stacktrace_level: Option<AtomicLevel>,
    new_encoder: Option<EncoderFactory>,
    encoder: Option<Box<dyn Encoder>>,
    time_encoder: Option<TimestampFormat>,
    encoder_config_options: Vec<EncoderConfigOption>,
    core_stages: Vec<CoreStage>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destination stream; owned by the options until a core is built
    #[must_use = "builder methods return a new value"]
    pub fn write_to<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.dest = Some(Box::new(writer));
        self
    }

    /// Emit threshold; pass a clone of a handle to keep control of it
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: impl Into<AtomicLevel>) -> Self {
        self.level = Some(level.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn stacktrace_level(mut self, level: impl Into<AtomicLevel>) -> Self {
        self.stacktrace_level = Some(level.into());
        self
    }

    /// Factory used to build the encoder when none is given directly
    #[must_use = "builder methods return a new value"]
    pub fn new_encoder(mut self, factory: EncoderFactory) -> Self {
        self.new_encoder = Some(factory);
        self
    }

    /// Ready-made encoder; the factory and config options are then unused
    #[must_use = "builder methods return a new value"]
    pub fn encoder(mut self, encoder: Box<dyn Encoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn time_encoder(mut self, format: TimestampFormat) -> Self {
        self.time_encoder = Some(format);
        self
    }

    /// Append an encoder config option; applied after the time encoder
    #[must_use = "builder methods return a new value"]
    pub fn encoder_config_option(mut self, option: EncoderConfigOption) -> Self {
        self.encoder_config_options.push(option);
        self
    }

    /// Append a logger stage; runs before the defaulted ones
    #[must_use = "builder methods return a new value"]
    pub fn core_stage(mut self, stage: CoreStage) -> Self {
        self.core_stages.push(stage);
        self
    }

    /// Development mode changes the defaults to the console encoder, DEBUG
    /// level and WARN stack traces
    #[must_use = "builder methods return a new value"]
    pub fn development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    pub fn is_development(&self) -> bool {
        self.development
    }

    pub fn has_dest(&self) -> bool {
        self.dest.is_some()
    }

    pub fn has_level(&self) -> bool {
        self.level.is_some()
    }

    pub fn has_stacktrace_level(&self) -> bool {
        self.stacktrace_level.is_some()
    }

    pub fn has_encoder(&self) -> bool {
        self.encoder.is_some() || self.new_encoder.is_some()
    }

    pub fn has_time_encoder(&self) -> bool {
        self.time_encoder.is_some()
    }

    /// Fill every unset field.
    ///
    /// Order matters: sampling is decided from the final emit level, the time
    /// encoder option goes first in the config option list so later options
    /// override it, and stack-trace capture is the last stage so that it only
    /// runs for entries that survived sampling.
    pub fn finalize(self) -> Result<SinkOptions> {
        let Options {
            development,
            dest,
            level,
            stacktrace_level,
            new_encoder,
            encoder,
            time_encoder,
            mut encoder_config_options,
            mut core_stages,
        } = self;

        let dest = dest.unwrap_or_else(|| Box::new(std::io::stderr()) as Box<dyn Write + Send>);

        let new_encoder = new_encoder.unwrap_or_else(|| {
            if development {
                console_encoder_factory()
            } else {
                json_encoder_factory()
            }
        });

        let level = level.unwrap_or_else(|| {
            AtomicLevel::new(if development {
                LogLevel::DEBUG
            } else {
                LogLevel::INFO
            })
        });

        let stacktrace_level = stacktrace_level.unwrap_or_else(|| {
            AtomicLevel::new(if development {
                LogLevel::WARN
            } else {
                LogLevel::ERROR
            })
        });

        if let Some(stage) = sampling_stage(&level) {
            core_stages.push(stage);
        }

        let time_encoder = time_encoder.unwrap_or(TimestampFormat::Rfc3339);
        time_encoder.validate()?;
        encoder_config_options.insert(0, time_encoder_option(time_encoder.clone()));

        let encoder = match encoder {
            Some(encoder) => encoder,
            None => new_encoder(&encoder_config_options)?,
        };
        if let Some(config) = encoder.config() {
            config.time_format.validate()?;
        }

        core_stages.push(CoreStage::AddStacktrace(stacktrace_level.clone()));

        Ok(SinkOptions {
            development,
            dest,
            level,
            stacktrace_level,
            new_encoder,
            encoder,
            time_encoder,
            encoder_config_options,
            core_stages,
        })
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("development", &self.development)
            .field("dest", &self.dest.is_some())
            .field("level", &self.level)
            .field("stacktrace_level", &self.stacktrace_level)
            .field("new_encoder", &self.new_encoder.is_some())
            .field("encoder", &self.encoder)
            .field("time_encoder", &self.time_encoder)
            .field("encoder_config_options", &self.encoder_config_options.len())
            .field("core_stages", &self.core_stages)
            .finish()
    }
}

/// Sampling stage for a sink at `level`, unless the level already lets
/// DEBUG through
pub(crate) fn sampling_stage(level: &AtomicLevel) -> Option<CoreStage> {
    if level.enabled(SAMPLING_BYPASS_LEVEL) {
        None
    } else {
        Some(CoreStage::Sample(SamplingConfig::default()))
    }
}

/// Fully populated sink configuration produced by [`Options::finalize`]
pub struct SinkOptions {
    pub development: bool,
    pub dest: Box<dyn Write + Send>,
    pub level: AtomicLevel,
    pub stacktrace_level: AtomicLevel,
    pub new_encoder: EncoderFactory,
    pub encoder: Box<dyn Encoder>,
    pub time_encoder: TimestampFormat,
    pub encoder_config_options: Vec<EncoderConfigOption>,
    pub core_stages: Vec<CoreStage>,
}

impl SinkOptions {
    /// Whether defaulting installed (or the caller supplied) a sampling stage
    pub fn is_sampled(&self) -> bool {
        self.core_stages
            .iter()
            .any(|stage| matches!(stage, CoreStage::Sample(_)))
    }
}

impl fmt::Debug for SinkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkOptions")
            .field("development", &self.development)
            .field("level", &self.level)
            .field("stacktrace_level", &self.stacktrace_level)
            .field("encoder", &self.encoder)
            .field("time_encoder", &self.time_encoder)
            .field("encoder_config_options", &self.encoder_config_options.len())
            .field("core_stages", &self.core_stages)
            .finish()
    }
}

/// A sink core together with the stages meant to decorate it
pub struct RawCore {
    pub core: IoCore,
    pub stages: Vec<CoreStage>,
}

/// Bind the sink's encoder, destination and level into a core.
///
/// The destination is wrapped in a [`SyncWriter`] which also becomes the
/// error output for a logger built from the returned stages.
pub fn new_raw_core(options: SinkOptions) -> RawCore {
    let sink = SyncWriter::from_boxed(options.dest);
    let mut stages = options.core_stages;
    stages.push(CoreStage::ErrorOutput(sink.clone()));

    RawCore {
        core: IoCore::new(options.encoder, sink, options.level),
        stages,
    }
}

/// Single-sink logger: finalize, build the core, apply its stages
pub fn new_raw(options: Options) -> Result<Logger> {
    let RawCore { core, stages } = new_raw_core(options.finalize()?);
    Ok(Logger::with_stages(Box::new(core), stages))
}
