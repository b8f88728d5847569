//! Log sampling for high-volume scenarios
//!
//! A fixed-window "first burst, then thin" sampler. Within each window
//! (`tick`), the first `first` entries with the same level and message pass
//! unconditionally; after that only every `thereafter`-th one does.
//!
//! Counters live in a fixed table indexed by level and by a hash of the
//! message. Only DEBUG and above have a row in the table; anything more
//! verbose than DEBUG bypasses sampling entirely rather than being mapped to a
//! row it does not have.
//!
//! # Example
//!
//! ```
//! use rust_tee_logger::{LogLevel, LogSampler, SamplingConfig};
//!
//! let sampler = LogSampler::new(SamplingConfig::default());
//! for _ in 0..100 {
//!     assert!(sampler.should_sample(LogLevel::INFO, "pod updated"));
//! }
//! assert!(!sampler.should_sample(LogLevel::INFO, "pod updated"));
//! ```

use super::log_level::LogLevel;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Lowest level that is sampled; more verbose levels always pass
pub const SAMPLING_BYPASS_LEVEL: LogLevel = LogLevel::DEBUG;

const COUNTERS_PER_LEVEL: usize = 4096;
const SAMPLED_LEVELS: usize = (LogLevel::FATAL.as_i8() - SAMPLING_BYPASS_LEVEL.as_i8() + 1) as usize;

/// Configuration for log sampling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Window length; counters restart when it elapses
    pub tick: Duration,

    /// Entries per window and signature that always pass
    pub first: u64,

    /// After `first`, every `thereafter`-th entry passes; 0 drops the rest
    pub thereafter: u64,
}

impl Default for SamplingConfig {
    /// 100 per second per signature, then 1 in 100
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            first: 100,
            thereafter: 100,
        }
    }
}

impl SamplingConfig {
    pub fn new(tick: Duration, first: u64, thereafter: u64) -> Self {
        Self {
            tick,
            first,
            thereafter,
        }
    }
}

/// Outcome of one sampling decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingDecision {
    /// Level is below the sampled range
    Bypassed,
    Sampled,
    Dropped,
}

impl SamplingDecision {
    pub fn passes(self) -> bool {
        !matches!(self, SamplingDecision::Dropped)
    }
}

/// Metrics for sampling observability
///
/// # Example
///
/// ```
/// use rust_tee_logger::SamplerMetrics;
///
/// let metrics = SamplerMetrics::new();
/// assert_eq!(metrics.sampled_count(), 0);
/// assert_eq!(metrics.dropped_count(), 0);
/// ```
#[derive(Debug)]
pub struct SamplerMetrics {
    /// Number of entries that passed (including bypassed levels)
    sampled_count: AtomicU64,

    /// Number of entries dropped by sampling
    dropped_count: AtomicU64,

    /// Total number of entries processed by the sampler
    total_count: AtomicU64,
}

impl SamplerMetrics {
    /// Create new metrics with all counters at zero
    pub const fn new() -> Self {
        Self {
            sampled_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            total_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn sampled_count(&self) -> u64 {
        self.sampled_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_count(&self) -> u64 {
        self.total_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn record_sampled(&self) {
        self.sampled_count.fetch_add(1, Ordering::Relaxed);
        self.total_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
        self.total_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Fraction of entries that passed; 1.0 before anything was processed
    pub fn effective_sample_rate(&self) -> f64 {
        let sampled = self.sampled_count() as f64;
        let total = self.total_count() as f64;

        if total == 0.0 {
            1.0
        } else {
            sampled / total
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.sampled_count.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
        self.total_count.store(0, Ordering::Relaxed);
    }
}

impl Default for SamplerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-signature window counter
#[derive(Debug, Default)]
struct Counter {
    /// (window end in nanoseconds since the sampler was created, count)
    window: Mutex<(i64, u64)>,
}

impl Counter {
    /// Count one entry at `now` and return its position in the current window
    fn inc_check_reset(&self, now: i64, tick: i64) -> u64 {
        let mut window = self.window.lock();
        if window.0 > now {
            window.1 += 1;
        } else {
            *window = (now.saturating_add(tick), 1);
        }
        window.1
    }
}

/// Fixed-window sampler keyed by level and message
///
/// # Thread Safety
///
/// Each signature's window is updated under its own short lock, so
/// concurrent emitters of one signature get distinct positions in the window
/// and the burst limit is exact under contention.
pub struct LogSampler {
    config: SamplingConfig,
    counters: Box<[Counter]>,
    epoch: Instant,
    metrics: SamplerMetrics,
}

impl LogSampler {
    pub fn new(config: SamplingConfig) -> Self {
        let counters = (0..SAMPLED_LEVELS * COUNTERS_PER_LEVEL)
            .map(|_| Counter::default())
            .collect();
        Self {
            config,
            counters,
            epoch: Instant::now(),
            metrics: SamplerMetrics::new(),
        }
    }

    /// Decide whether an entry with this level and message should be written
    pub fn should_sample(&self, level: LogLevel, message: &str) -> bool {
        self.decide_at(level, message, self.now_nanos()).passes()
    }

    /// Decide as of `now` nanoseconds after the sampler was created
    pub fn decide_at(&self, level: LogLevel, message: &str, now: i64) -> SamplingDecision {
        let Some(counter) = self.counter_for(level, message) else {
            self.metrics.record_sampled();
            return SamplingDecision::Bypassed;
        };

        let tick = i64::try_from(self.config.tick.as_nanos()).unwrap_or(i64::MAX);
        let n = counter.inc_check_reset(now, tick);
        let first = self.config.first;
        let thereafter = self.config.thereafter;

        if n > first && (thereafter == 0 || (n - first) % thereafter != 0) {
            self.metrics.record_dropped();
            return SamplingDecision::Dropped;
        }
        self.metrics.record_sampled();
        SamplingDecision::Sampled
    }

    fn counter_for(&self, level: LogLevel, message: &str) -> Option<&Counter> {
        if level < SAMPLING_BYPASS_LEVEL {
            return None;
        }
        let row = (level.min(LogLevel::FATAL).as_i8() - SAMPLING_BYPASS_LEVEL.as_i8()) as usize;
        let column = fnv32a(message) as usize % COUNTERS_PER_LEVEL;
        self.counters.get(row * COUNTERS_PER_LEVEL + column)
    }

    fn now_nanos(&self) -> i64 {
        i64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }

    pub fn effective_sample_rate(&self) -> f64 {
        self.metrics.effective_sample_rate()
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }
}

impl std::fmt::Debug for LogSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSampler")
            .field("config", &self.config)
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// 32-bit FNV-1a
fn fnv32a(s: &str) -> u32 {
    const OFFSET: u32 = 2_166_136_261;
    const PRIME: u32 = 16_777_619;
    s.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u32::from(byte)).wrapping_mul(PRIME))
}
