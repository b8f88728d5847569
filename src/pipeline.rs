//! Console plus file fan-out
//!
//! Two sinks are defaulted independently, each with its own fresh level
//! handles, and combined under one [`Tee`]. Sampling and stack-trace capture
//! are applied once, above the tee, from the console sink's thresholds, so
//! volume is capped for the pair rather than per sink.

use crate::config::LogFlags;
use crate::core::{AtomicLevel, CoreStage, LogLevel, Logger, Result};
use crate::cores::Tee;
use crate::facade::LogHandle;
use crate::options::{new_raw_core, sampling_stage, Options, RawCore};
use std::io::Write;

pub const CONSOLE_CORE: &str = "console";
pub const FILE_CORE: &str = "file";

pub fn default_level() -> AtomicLevel {
    AtomicLevel::new(LogLevel::INFO)
}

pub fn default_stacktrace_level() -> AtomicLevel {
    AtomicLevel::new(LogLevel::ERROR)
}

/// Options for the console sink writing to stderr
pub fn console_options(level: AtomicLevel, stacktrace_level: AtomicLevel) -> Options {
    Options::new()
        .write_to(std::io::stderr())
        .level(level)
        .stacktrace_level(stacktrace_level)
}

/// Options for a file sink writing to `writer`
pub fn file_options<W: Write + Send + 'static>(
    writer: W,
    level: AtomicLevel,
    stacktrace_level: AtomicLevel,
) -> Options {
    Options::new()
        .write_to(writer)
        .level(level)
        .stacktrace_level(stacktrace_level)
}

/// Stages applied above the tee: sampling unless `level` enables DEBUG,
/// then stack-trace capture at `stacktrace_level`
pub fn default_core_stages(level: &AtomicLevel, stacktrace_level: &AtomicLevel) -> Vec<CoreStage> {
    let mut stages: Vec<CoreStage> = sampling_stage(level).into_iter().collect();
    stages.push(CoreStage::AddStacktrace(stacktrace_level.clone()));
    stages
}

/// Tee of the stderr console sink and `file`, with default thresholds
pub fn new_tee_logger<W: Write + Send + 'static>(file: W) -> Result<LogHandle> {
    new_tee_logger_with(file, &LogFlags::default())
}

/// Tee of the stderr console sink and `file`, with `flags` applied to both
pub fn new_tee_logger_with<W: Write + Send + 'static>(
    file: W,
    flags: &LogFlags,
) -> Result<LogHandle> {
    let console = console_options(default_level(), default_stacktrace_level());
    let file = file_options(file, default_level(), default_stacktrace_level());
    Ok(LogHandle::new(new_tee(console, file, flags)?))
}

/// Assemble the tee from two sink options.
///
/// Each sink's own stage list is dropped; the returned logger carries one
/// top-level list derived from the console sink, and reports write failures
/// on the console stream.
pub fn new_tee(console: Options, file: Options, flags: &LogFlags) -> Result<Logger> {
    let console = flags.apply(console)?.finalize()?;
    let file = flags.apply(file)?.finalize()?;

    let mut stages = default_core_stages(&console.level, &console.stacktrace_level);

    let RawCore { core: console_core, .. } = new_raw_core(console);
    let RawCore { core: file_core, .. } = new_raw_core(file);
    stages.push(CoreStage::ErrorOutput(console_core.sink().clone()));

    let tee = Tee::new(vec![
        Box::new(console_core.with_name(CONSOLE_CORE)),
        Box::new(file_core.with_name(FILE_CORE)),
    ]);

    Ok(Logger::with_stages(Box::new(tee), stages))
}
