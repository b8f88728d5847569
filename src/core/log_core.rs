//! Core trait: the unit that filters, encodes and writes entries

use super::{
    error::{LoggerError, Result},
    log_entry::LogEntry,
    log_level::LogLevel,
};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// A destination-bound pipeline stage.
///
/// Emission is two-phase. [`Core::check`] decides, per core, whether the entry
/// will be written and registers the accepting cores on a [`CheckedEntry`];
/// only then is the entry completed (stack trace, if any) and handed to
/// [`Core::write`] of each accepted core. Rejections therefore cost nothing
/// beyond the decision itself.
pub trait Core: Send + Sync {
    /// Cheap level pre-check
    fn enabled(&self, level: LogLevel) -> bool;

    /// Register every core that accepts `entry` on `checked`
    fn check<'a>(&'a self, entry: &LogEntry, checked: &mut CheckedEntry<'a>);

    /// Encode and write one accepted entry
    fn write(&self, entry: &LogEntry) -> Result<()>;

    /// Flush buffered output
    fn sync(&self) -> Result<()>;

    fn name(&self) -> &str;
}

/// The cores that accepted one entry
#[derive(Default)]
pub struct CheckedEntry<'a> {
    cores: Vec<&'a dyn Core>,
}

impl<'a> CheckedEntry<'a> {
    pub fn new() -> Self {
        Self { cores: Vec::new() }
    }

    pub fn add_core(&mut self, core: &'a dyn Core) {
        self.cores.push(core);
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    /// Write to every accepted core, collecting failures instead of stopping.
    ///
    /// A core that panics is reported like one that returned an error; the
    /// remaining cores still receive the entry.
    pub fn write(&self, entry: &LogEntry) -> Vec<(String, LoggerError)> {
        let mut failures = Vec::new();
        for core in &self.cores {
            let outcome = catch_unwind(AssertUnwindSafe(|| core.write(entry)));
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "unknown panic".to_string()
                    };
                    LoggerError::writer(format!("core panicked: {}", panic_msg))
                }
            };
            failures.push((core.name().to_string(), error));
        }
        failures
    }
}
