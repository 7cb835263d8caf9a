/// Construction-time configuration for [`RingBuffer`](crate::RingBuffer).
///
/// The core engine itself takes no configuration beyond a capacity (see
/// `allocate`/`try_with_capacity`); `Config` only carries the ambient knobs
/// that sit around it: whether to eagerly allocate and whether to collect
/// metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// If non-zero, the buffer allocates this capacity immediately on
    /// construction instead of starting in the unallocated state.
    pub initial_capacity: usize,
    /// Enable byte/operation counters (slight overhead on the hot path).
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a configuration that allocates `initial_capacity` bytes up
    /// front, with metrics collection as requested.
    pub const fn new(initial_capacity: usize, enable_metrics: bool) -> Self {
        Self {
            initial_capacity,
            enable_metrics,
        }
    }
}

/// Starts unallocated with metrics disabled; the 64 KiB working set used
/// throughout the test suite's SPSC sequence-integrity scenario.
pub const DEFAULT_TEST_CAPACITY: usize = 64 * 1024;
