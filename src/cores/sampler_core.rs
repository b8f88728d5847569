//! Sampling decorator around another core

use crate::core::{
    CheckedEntry, Core, LogEntry, LogLevel, LogSampler, Result, SamplerMetrics, SamplingConfig,
};

/// Drops repeated entries before they reach the wrapped core.
///
/// Entries the wrapped core would reject anyway are not counted, so level
/// filtering never eats into the burst allowance.
pub struct SamplerCore {
    inner: Box<dyn Core>,
    sampler: LogSampler,
}

impl SamplerCore {
    pub fn new(inner: Box<dyn Core>, config: SamplingConfig) -> Self {
        Self {
            inner,
            sampler: LogSampler::new(config),
        }
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        self.sampler.metrics()
    }

    pub fn config(&self) -> &SamplingConfig {
        self.sampler.config()
    }
}

impl Core for SamplerCore {
    #[inline]
    fn enabled(&self, level: LogLevel) -> bool {
        self.inner.enabled(level)
    }

    fn check<'a>(&'a self, entry: &LogEntry, checked: &mut CheckedEntry<'a>) {
        if !self.inner.enabled(entry.level) {
            return;
        }
        if self.sampler.should_sample(entry.level, &entry.message) {
            self.inner.check(entry, checked);
        }
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        self.inner.write(entry)
    }

    fn sync(&self) -> Result<()> {
        self.inner.sync()
    }

    fn name(&self) -> &str {
        "sampler"
    }
}
