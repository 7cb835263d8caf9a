//! Miri-compatible tests for detecting undefined behavior in the raw
//! allocation and pointer-copy paths.
//!
//! Run with: `cargo +nightly miri test --test miri_tests`
//!
//! These exercise exactly the unsafe code in `src/ring.rs`: manual
//! `alloc`/`dealloc`, the wraparound `copy_nonoverlapping` splits, and the
//! vector interface's raw-slice construction.

use spsc_ring_rs::RingBuffer;

#[test]
fn miri_allocate_deallocate_cycle() {
    let mut ring = RingBuffer::new();
    assert!(ring.allocate(16));
    assert!(ring.allocate(64)); // reallocates, freeing the first region
    ring.deallocate();
    ring.deallocate(); // idempotent, no double-free
}

#[test]
fn miri_wraparound_copy_split() {
    let mut ring = RingBuffer::new();
    assert!(ring.allocate(8));
    assert_eq!(ring.write(&[1, 2, 3, 4, 5, 6], false), 6);
    assert_eq!(ring.read(&mut [0u8; 4], false), 4);
    // write_position is now at 6 (mod 8); this write straddles the
    // physical end of the buffer and must split into two copies.
    assert_eq!(ring.write(&[7, 8, 9, 10], false), 4);
    let mut out = [0u8; 6];
    assert_eq!(ring.read(&mut out, false), 6);
    assert_eq!(out, [5, 6, 7, 8, 9, 10]);
}

#[test]
fn miri_vector_interface_segments_are_disjoint() {
    let mut ring = RingBuffer::new();
    assert!(ring.allocate(8));
    assert_eq!(ring.write(&[0u8; 6], false), 6);
    assert_eq!(ring.drain(), 6);

    let mut vec = ring.write_vector();
    assert_eq!(vec.len(), 8);
    for byte in vec.front.iter_mut() {
        *byte = 0xAA;
    }
    for byte in vec.back.iter_mut() {
        *byte = 0xBB;
    }
    ring.commit_write(8);

    let read_vec = ring.read_vector();
    assert!(read_vec.front.iter().all(|&b| b == 0xAA));
    assert!(read_vec.back.iter().all(|&b| b == 0xBB));
}

#[test]
fn miri_drop_frees_allocation() {
    let mut ring = RingBuffer::new();
    assert!(ring.allocate(128));
    assert_eq!(ring.write(&[1, 2, 3], false), 3);
    drop(ring);
}

#[test]
fn miri_zero_sized_operations_are_noops() {
    let mut ring = RingBuffer::new();
    assert!(ring.allocate(16));
    assert_eq!(ring.write(&[], false), 0);
    assert_eq!(ring.read(&mut [], false), 0);
}
