//! Loom-based concurrency tests for the SPSC index protocol.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! Loom exhaustively explores thread interleavings to catch memory-ordering
//! bugs that only manifest under specific scheduling. `RingBuffer` itself
//! uses `std::sync::atomic`, which loom cannot instrument, so this models
//! the same write_position/read_position protocol (§4.2) with loom's atomic
//! types over a small fixed-size buffer, keeping the state space tractable.

#![cfg(feature = "loom")]

use loom::cell::UnsafeCell;
use loom::sync::atomic::{AtomicUsize, Ordering};
use loom::sync::Arc;
use loom::thread;

const CAPACITY: usize = 4;
const MASK: usize = CAPACITY - 1;

struct LoomByteRing {
    write_position: AtomicUsize,
    read_position: AtomicUsize,
    buffer: UnsafeCell<[u8; CAPACITY]>,
}

unsafe impl Send for LoomByteRing {}
unsafe impl Sync for LoomByteRing {}

impl LoomByteRing {
    fn new() -> Self {
        Self {
            write_position: AtomicUsize::new(0),
            read_position: AtomicUsize::new(0),
            buffer: UnsafeCell::new([0; CAPACITY]),
        }
    }

    fn write_one(&self, value: u8) -> bool {
        let write_pos = self.write_position.load(Ordering::Relaxed);
        let read_pos = self.read_position.load(Ordering::Acquire);
        if write_pos.wrapping_sub(read_pos) == CAPACITY {
            return false;
        }
        let idx = write_pos & MASK;
        // SAFETY: idx is in the free region, not touched by a concurrent reader.
        unsafe {
            self.buffer.with_mut(|ptr| (*ptr)[idx] = value);
        }
        self.write_position.store(write_pos.wrapping_add(1), Ordering::Release);
        true
    }

    fn read_one(&self) -> Option<u8> {
        let write_pos = self.write_position.load(Ordering::Acquire);
        let read_pos = self.read_position.load(Ordering::Relaxed);
        if write_pos == read_pos {
            return None;
        }
        let idx = read_pos & MASK;
        // SAFETY: the Acquire load above synchronizes-with the writer's
        // Release store, so the byte at idx is visible.
        let value = unsafe { self.buffer.with(|ptr| (*ptr)[idx]) };
        self.read_position.store(read_pos.wrapping_add(1), Ordering::Release);
        Some(value)
    }
}

#[test]
fn loom_single_item_handoff_is_visible() {
    loom::model(|| {
        let ring = Arc::new(LoomByteRing::new());

        let producer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                assert!(ring.write_one(42));
            })
        };

        let consumer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || loop {
                if let Some(value) = ring.read_one() {
                    assert_eq!(value, 42);
                    break;
                }
            })
        };

        producer.join().unwrap();
        consumer.join().unwrap();
    });
}

#[test]
fn loom_sequence_order_is_preserved_across_wrap() {
    loom::model(|| {
        let ring = Arc::new(LoomByteRing::new());
        const N: u8 = 6; // exceeds CAPACITY, forcing at least one wrap

        let producer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                for i in 0..N {
                    while !ring.write_one(i) {
                        thread::yield_now();
                    }
                }
            })
        };

        let consumer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                for expected in 0..N {
                    loop {
                        if let Some(value) = ring.read_one() {
                            assert_eq!(value, expected);
                            break;
                        }
                        thread::yield_now();
                    }
                }
            })
        };

        producer.join().unwrap();
        consumer.join().unwrap();
    });
}
