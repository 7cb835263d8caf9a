//! spsc-ring-rs - a lock-free single-producer/single-consumer byte ring buffer
//!
//! A fixed-capacity circular buffer sized to the next power of two, with two
//! free-running atomic cursors (`write_position`, `read_position`) handing
//! bytes from exactly one producer thread to exactly one consumer thread
//! without locks. Built for realtime streaming paths (audio callbacks,
//! packet pacing, IPC shims) where allocation and blocking are unacceptable
//! once the buffer is live.
//!
//! # Key features
//!
//! - Power-of-two capacity with masked index arithmetic, no modulo on the
//!   hot path
//! - Bulk byte copy with at-most-one wraparound split, never more than two
//!   `memcpy`-equivalent calls per operation
//! - A zero-copy vector interface (`write_vector`/`commit_write`,
//!   `read_vector`/`commit_read`) for callers that want to write or read
//!   in place
//! - A `Pod`-bounded typed layer on top: single values, slices, and
//!   small heterogeneous tuples written or read as one atomic unit
//!
//! # Example
//!
//! ```
//! use spsc_ring_rs::RingBuffer;
//!
//! let mut ring = RingBuffer::new();
//! assert!(ring.allocate(1024));
//!
//! assert_eq!(ring.write(b"hello", false), 5);
//! let mut out = [0u8; 5];
//! assert_eq!(ring.read(&mut out, false), 5);
//! assert_eq!(&out, b"hello");
//! ```

mod backoff;
mod config;
mod error;
mod invariants;
mod metrics;
mod ring;
mod typed;
mod vector;

pub use backoff::Backoff;
pub use config::{Config, DEFAULT_TEST_CAPACITY};
pub use error::AllocError;
pub use metrics::{Metrics, MetricsSnapshot};
pub use ring::{max_capacity, RingBuffer, MIN_CAPACITY};
pub use typed::ValueTuple;
pub use vector::{ReadVector, WriteVector};
