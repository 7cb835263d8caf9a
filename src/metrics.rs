use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe, always-available counters backing [`RingBuffer::metrics`].
///
/// Every field is a plain relaxed atomic: these counters are observability
/// only, never consulted by the index protocol, so there is nothing to
/// synchronize-with. Updates happen on the hot path only when
/// `Config::enable_metrics` is set, mirroring the teacher's
/// `config.enable_metrics` gate around `Metrics::add_messages_sent` et al.
#[derive(Debug, Default)]
pub struct Metrics {
    bytes_written: AtomicU64,
    bytes_read: AtomicU64,
    writes_total: AtomicU64,
    writes_partial: AtomicU64,
    reads_total: AtomicU64,
    reads_partial: AtomicU64,
    peeks: AtomicU64,
    skips: AtomicU64,
    drains: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_write(&self, items_requested: usize, items_written: usize, bytes: usize) {
        self.writes_total.fetch_add(1, Ordering::Relaxed);
        if items_written < items_requested {
            self.writes_partial.fetch_add(1, Ordering::Relaxed);
        }
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_read(&self, items_requested: usize, items_read: usize, bytes: usize) {
        self.reads_total.fetch_add(1, Ordering::Relaxed);
        if items_read < items_requested {
            self.reads_partial.fetch_add(1, Ordering::Relaxed);
        }
        self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_peek(&self) {
        self.peeks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_skip(&self, bytes: usize) {
        self.skips.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_drain(&self, bytes: usize) {
        self.drains.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            writes_total: self.writes_total.load(Ordering::Relaxed),
            writes_partial: self.writes_partial.load(Ordering::Relaxed),
            reads_total: self.reads_total.load(Ordering::Relaxed),
            reads_partial: self.reads_partial.load(Ordering::Relaxed),
            peeks: self.peeks.load(Ordering::Relaxed),
            skips: self.skips.load(Ordering::Relaxed),
            drains: self.drains.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`Metrics`], cheap to pass around and compare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub bytes_written: u64,
    pub bytes_read: u64,
    pub writes_total: u64,
    pub writes_partial: u64,
    pub reads_total: u64,
    pub reads_partial: u64,
    pub peeks: u64,
    pub skips: u64,
    pub drains: u64,
}
