//! Logger metrics for observability
//!
//! Counters describing what happened to emitted entries: how many reached a
//! sink, how many failed to write, how many were rejected before encoding, and
//! how many carried a captured stack trace.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_tee_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_written();
/// metrics.record_write_failure();
///
/// assert_eq!(metrics.written_count(), 1);
/// assert_eq!(metrics.write_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Entries written to every core that accepted them
    written_count: AtomicU64,

    /// Entries where at least one core failed to encode or write
    write_failures: AtomicU64,

    /// Entries no core accepted (level or sampling)
    rejected_count: AtomicU64,

    /// Entries that carried a captured stack trace
    stacktraces_captured: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            written_count: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            rejected_count: AtomicU64::new(0),
            stacktraces_captured: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn written_count(&self) -> u64 {
        self.written_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected_count(&self) -> u64 {
        self.rejected_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn stacktraces_captured(&self) -> u64 {
        self.stacktraces_captured.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.rejected_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_stacktrace(&self) -> u64 {
        self.stacktraces_captured.fetch_add(1, Ordering::Relaxed)
    }

    /// Failure rate as a percentage (0.0 - 100.0) of entries that reached
    /// the write phase
    ///
    /// Returns 0.0 if nothing was written.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.write_failures() as f64;
        let total = failed + self.written_count() as f64;

        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.written_count.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.rejected_count.store(0, Ordering::Relaxed);
        self.stacktraces_captured.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.written_count(), 0);
        assert_eq!(metrics.write_failures(), 0);
        assert_eq!(metrics.rejected_count(), 0);
        assert_eq!(metrics.stacktraces_captured(), 0);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_written();
        }
        for _ in 0..10 {
            metrics.record_write_failure();
        }

        let rate = metrics.failure_rate();
        assert!((9.9..=10.1).contains(&rate), "Failure rate was {}", rate);
    }

    #[test]
    fn test_reset() {
        let metrics = LoggerMetrics::new();
        metrics.record_written();
        metrics.record_rejected();
        metrics.record_stacktrace();
        metrics.reset();
        assert_eq!(metrics.written_count(), 0);
        assert_eq!(metrics.rejected_count(), 0);
        assert_eq!(metrics.stacktraces_captured(), 0);
    }
}
