//! The core SPSC byte ring buffer.
//!
//! See `SPEC_FULL.md` §§3-4 for the data model and algorithms this module
//! is a direct translation of.

use std::alloc::{self, Layout};
use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use crate::config::Config;
use crate::error::AllocError;
use crate::invariants::{debug_assert_bounded_used, debug_assert_commit_bounds, debug_assert_monotonic};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::vector::{ReadVector, WriteVector};

/// The smallest capacity `allocate`/`try_with_capacity` will accept.
pub const MIN_CAPACITY: usize = 2;

/// The largest capacity `allocate`/`try_with_capacity` will accept: half the
/// index type's modulus, so `used = write_position - read_position` (wrapping
/// `usize` subtraction) stays unambiguous even as the free-running cursors
/// wrap the machine word.
#[inline]
pub const fn max_capacity() -> usize {
    1usize << (usize::BITS - 1)
}

struct Storage {
    /// Null when unallocated.
    ptr: *mut u8,
    /// Only meaningful while `ptr` is non-null.
    layout: Layout,
}

impl Storage {
    const fn unallocated() -> Self {
        Self {
            ptr: ptr::null_mut(),
            layout: Layout::new::<()>(),
        }
    }
}

/// A lock-free single-producer/single-consumer byte ring buffer.
///
/// # Memory ordering
///
/// All producer stores to `write_position` use `Release`; all consumer loads
/// of `write_position` use `Acquire`. Symmetrically for `read_position`. Each
/// side's load of its *own* cursor is `Relaxed` -- it is the sole writer of
/// that cursor. This is the textbook SPSC handoff: once the consumer
/// observes a given `write_position`, every byte store the producer issued
/// for the now-visible range happens-before the consumer's reads of those
/// bytes, and vice versa for the producer observing `read_position`.
///
/// # Role discipline
///
/// `allocate`, `deallocate`, and moving a `RingBuffer` all require `&mut
/// self` -- Rust's exclusive-borrow rule is exactly the "not safe under any
/// concurrent access" precondition the spec calls for, enforced by the
/// compiler instead of left as documentation. Every producer- or
/// consumer-side operation below takes `&self`, because the two sides are
/// meant to run concurrently from independent references (typically two
/// clones of an `Arc<RingBuffer>`).
///
/// The two cursors live in separate `CachePadded` cells so the producer and
/// consumer never false-share a cache line while spinning on each other's
/// cursor.
pub struct RingBuffer {
    write_position: CachePadded<AtomicUsize>,
    read_position: CachePadded<AtomicUsize>,
    capacity: AtomicUsize,
    mask: AtomicUsize,
    storage: UnsafeCell<Storage>,
    metrics: Metrics,
    config: Config,
}

// SAFETY: RingBuffer transports plain bytes through the atomically
// published cursor protocol; the raw pointer in `storage` is only mutated
// under `&mut self` (allocate/deallocate/drop), never while a `&self` op is
// concurrently in flight, per the role-discipline precondition above.
unsafe impl Send for RingBuffer {}
unsafe impl Sync for RingBuffer {}

impl RingBuffer {
    /// Creates an empty, unallocated buffer. No heap allocation occurs.
    pub fn new() -> Self {
        Self {
            write_position: CachePadded::new(AtomicUsize::new(0)),
            read_position: CachePadded::new(AtomicUsize::new(0)),
            capacity: AtomicUsize::new(0),
            mask: AtomicUsize::new(0),
            storage: UnsafeCell::new(Storage::unallocated()),
            metrics: Metrics::new(),
            config: Config::default(),
        }
    }

    /// Creates a buffer from a [`Config`], eagerly allocating
    /// `config.initial_capacity` if non-zero. An invalid initial capacity is
    /// silently left unallocated -- use [`RingBuffer::try_with_capacity`] if
    /// the failure needs to be observed.
    pub fn with_config(config: Config) -> Self {
        let mut buf = Self { config, ..Self::new() };
        if config.initial_capacity != 0 {
            buf.allocate(config.initial_capacity);
        }
        buf
    }

    /// The throwing-constructor form of §4.1: allocates `min_capacity`
    /// (rounded up to a power of two) or fails with a specific
    /// [`AllocError`], leaving no partially-constructed object observable.
    pub fn try_with_capacity(min_capacity: usize) -> Result<Self, AllocError> {
        let max = max_capacity();
        if min_capacity < MIN_CAPACITY || min_capacity > max {
            return Err(AllocError::InvalidCapacity {
                requested: min_capacity,
                min: MIN_CAPACITY,
                max,
            });
        }
        let capacity = min_capacity.next_power_of_two();
        let layout = match Layout::array::<u8>(capacity) {
            Ok(layout) => layout,
            // capacity is within [MIN_CAPACITY, max_capacity()] but still too
            // large for the allocator to express as a Layout (its size limit
            // is isize::MAX, one bit narrower than max_capacity()'s range) --
            // this is an allocation failure, not a bad argument.
            Err(_) => return Err(AllocError::AllocationFailed(Layout::new::<()>())),
        };
        // SAFETY: layout has non-zero size since capacity >= MIN_CAPACITY.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        if ptr.is_null() {
            return Err(AllocError::AllocationFailed(layout));
        }
        let buf = Self::new();
        // SAFETY: buf was just constructed, no other reference exists yet.
        unsafe {
            *buf.storage.get() = Storage { ptr, layout };
        }
        buf.capacity.store(capacity, Ordering::Relaxed);
        buf.mask.store(capacity - 1, Ordering::Relaxed);
        Ok(buf)
    }

    // -------------------------------------------------------------------
    // Storage & lifecycle (§4.1)
    // -------------------------------------------------------------------

    /// Allocates (or reallocates) the backing storage to the smallest power
    /// of two `>= min_capacity`. Any existing allocation is released first.
    /// Returns `false` -- leaving the buffer unallocated -- if `min_capacity`
    /// is out of `[MIN_CAPACITY, max_capacity()]` or the allocator refuses.
    pub fn allocate(&mut self, min_capacity: usize) -> bool {
        let max = max_capacity();
        if min_capacity < MIN_CAPACITY || min_capacity > max {
            return false;
        }
        self.deallocate();

        let capacity = min_capacity.next_power_of_two();
        let layout = match Layout::array::<u8>(capacity) {
            Ok(layout) => layout,
            Err(_) => return false,
        };
        // SAFETY: layout has non-zero size since capacity >= MIN_CAPACITY.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        if ptr.is_null() {
            return false;
        }
        // SAFETY: &mut self guarantees no concurrent access to storage.
        unsafe {
            *self.storage.get() = Storage { ptr, layout };
        }
        self.capacity.store(capacity, Ordering::Relaxed);
        self.mask.store(capacity - 1, Ordering::Relaxed);
        self.write_position.store(0, Ordering::Relaxed);
        self.read_position.store(0, Ordering::Relaxed);
        true
    }

    /// Releases the backing storage, if any, and resets to the unallocated
    /// state. Idempotent.
    pub fn deallocate(&mut self) {
        // SAFETY: &mut self guarantees no concurrent access to storage.
        let storage = unsafe { &mut *self.storage.get() };
        if !storage.ptr.is_null() {
            // SAFETY: ptr/layout were produced together by the matching alloc.
            unsafe {
                alloc::dealloc(storage.ptr, storage.layout);
            }
            storage.ptr = ptr::null_mut();
        }
        self.capacity.store(0, Ordering::Relaxed);
        self.mask.store(0, Ordering::Relaxed);
        self.write_position.store(0, Ordering::Relaxed);
        self.read_position.store(0, Ordering::Relaxed);
    }

    /// The allocated capacity in bytes, or zero if unallocated. Safe from
    /// either side.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }

    /// `capacity() - 1`; zero while unallocated.
    #[inline]
    pub fn capacity_mask(&self) -> usize {
        self.mask.load(Ordering::Relaxed)
    }

    /// Whether the backing region is allocated. Safe from either side.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.capacity() != 0
    }

    /// Snapshot of the optional operation counters (all-zero if
    /// `Config::enable_metrics` was false at construction).
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    // -------------------------------------------------------------------
    // Index protocol (§4.2): producer- and consumer-accurate views
    // -------------------------------------------------------------------

    /// Free bytes available for writing. **Accurate only on the producer
    /// side** -- a concurrent consumer read may make more room than this
    /// reflects, never less.
    #[inline]
    pub fn free_space(&self) -> usize {
        let capacity = self.capacity();
        if capacity == 0 {
            return 0;
        }
        let write_pos = self.write_position.load(Ordering::Relaxed);
        let read_pos = self.read_position.load(Ordering::Acquire);
        capacity - write_pos.wrapping_sub(read_pos)
    }

    /// `true` if the buffer cannot accept another byte right now.
    /// **Accurate only on the producer side.**
    #[inline]
    pub fn is_full(&self) -> bool {
        self.is_usable() && self.free_space() == 0
    }

    /// Bytes available for reading. **Accurate only on the consumer side.**
    #[inline]
    pub fn available_bytes(&self) -> usize {
        let capacity = self.capacity();
        if capacity == 0 {
            return 0;
        }
        let write_pos = self.write_position.load(Ordering::Acquire);
        let read_pos = self.read_position.load(Ordering::Relaxed);
        write_pos.wrapping_sub(read_pos)
    }

    /// `true` if there is nothing to read right now. **Accurate only on the
    /// consumer side.**
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.available_bytes() == 0
    }

    /// SAFETY: caller must have verified the buffer is allocated.
    #[inline]
    unsafe fn buffer_ptr(&self) -> *mut u8 {
        (*self.storage.get()).ptr
    }

    // -------------------------------------------------------------------
    // Bulk copy engine (§4.3) -- producer side
    // -------------------------------------------------------------------

    /// Writes up to `item_count` items of `item_size` bytes from `src`.
    ///
    /// Returns the number of whole items written: either `item_count`, or
    /// (when `allow_partial` is true) as many as fit. A null `src`, zero
    /// `item_size`/`item_count`, or an unallocated buffer is a no-op
    /// returning `0` -- not an error. Producer-only.
    pub fn write_raw(&self, src: *const u8, item_size: usize, item_count: usize, allow_partial: bool) -> usize {
        if src.is_null() || item_size == 0 || item_count == 0 || !self.is_usable() {
            return 0;
        }
        let capacity = self.capacity();
        let mask = self.capacity_mask();
        let write_pos = self.write_position.load(Ordering::Relaxed);
        let read_pos = self.read_position.load(Ordering::Acquire);

        let bytes_free = capacity - write_pos.wrapping_sub(read_pos);
        let items_free = bytes_free / item_size;
        if items_free == 0 {
            return 0;
        }
        if items_free < item_count && !allow_partial {
            return 0;
        }

        let items_to_write = items_free.min(item_count);
        let bytes_to_write = items_to_write * item_size;
        let write_idx = write_pos & mask;
        let bytes_to_end = capacity - write_idx;

        // SAFETY: [write_idx, write_idx + bytes_to_write) (mod capacity) lies
        // entirely within the free region just computed, which the consumer
        // never touches.
        unsafe {
            let buffer = self.buffer_ptr();
            if bytes_to_write <= bytes_to_end {
                ptr::copy_nonoverlapping(src, buffer.add(write_idx), bytes_to_write);
            } else {
                ptr::copy_nonoverlapping(src, buffer.add(write_idx), bytes_to_end);
                ptr::copy_nonoverlapping(src.add(bytes_to_end), buffer, bytes_to_write - bytes_to_end);
            }
        }

        let new_write_pos = write_pos.wrapping_add(bytes_to_write);
        debug_assert_bounded_used!(new_write_pos.wrapping_sub(read_pos), capacity);
        debug_assert_monotonic!("write_position", write_pos, new_write_pos);
        self.write_position.store(new_write_pos, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.record_write(item_count, items_to_write, bytes_to_write);
        }
        items_to_write
    }

    /// Byte-level sugar for [`RingBuffer::write_raw`] with `item_size == 1`.
    pub fn write(&self, src: &[u8], allow_partial: bool) -> usize {
        self.write_raw(src.as_ptr(), 1, src.len(), allow_partial)
    }

    // -------------------------------------------------------------------
    // Bulk copy engine (§4.3) -- consumer side
    // -------------------------------------------------------------------

    /// Reads up to `item_count` items of `item_size` bytes into `dst`.
    /// Symmetric with [`RingBuffer::write_raw`]. Consumer-only.
    pub fn read_raw(&self, dst: *mut u8, item_size: usize, item_count: usize, allow_partial: bool) -> usize {
        if dst.is_null() || item_size == 0 || item_count == 0 || !self.is_usable() {
            return 0;
        }
        let capacity = self.capacity();
        let mask = self.capacity_mask();
        let write_pos = self.write_position.load(Ordering::Acquire);
        let read_pos = self.read_position.load(Ordering::Relaxed);

        let bytes_avail = write_pos.wrapping_sub(read_pos);
        let items_avail = bytes_avail / item_size;
        if items_avail == 0 {
            return 0;
        }
        if items_avail < item_count && !allow_partial {
            return 0;
        }

        let items_to_read = items_avail.min(item_count);
        let bytes_to_read = items_to_read * item_size;
        let read_idx = read_pos & mask;
        let bytes_to_end = capacity - read_idx;

        // SAFETY: [read_idx, read_idx + bytes_to_read) (mod capacity) lies
        // entirely within the used region just computed, which the producer
        // never touches until read_position advances.
        unsafe {
            let buffer = self.buffer_ptr();
            if bytes_to_read <= bytes_to_end {
                ptr::copy_nonoverlapping(buffer.add(read_idx), dst, bytes_to_read);
            } else {
                ptr::copy_nonoverlapping(buffer.add(read_idx), dst, bytes_to_end);
                ptr::copy_nonoverlapping(buffer, dst.add(bytes_to_end), bytes_to_read - bytes_to_end);
            }
        }

        let new_read_pos = read_pos.wrapping_add(bytes_to_read);
        debug_assert_monotonic!("read_position", read_pos, new_read_pos);
        self.read_position.store(new_read_pos, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.record_read(item_count, items_to_read, bytes_to_read);
        }
        items_to_read
    }

    /// Byte-level sugar for [`RingBuffer::read_raw`] with `item_size == 1`.
    pub fn read(&self, dst: &mut [u8], allow_partial: bool) -> usize {
        self.read_raw(dst.as_mut_ptr(), 1, dst.len(), allow_partial)
    }

    /// Non-advancing read: delivers the full `item_count` or returns
    /// `false` and copies nothing. Never partial. Consumer-only.
    pub fn peek_raw(&self, dst: *mut u8, item_size: usize, item_count: usize) -> bool {
        if dst.is_null() || item_size == 0 || item_count == 0 || !self.is_usable() {
            return false;
        }
        let capacity = self.capacity();
        let mask = self.capacity_mask();
        let write_pos = self.write_position.load(Ordering::Acquire);
        let read_pos = self.read_position.load(Ordering::Relaxed);

        let bytes_avail = write_pos.wrapping_sub(read_pos);
        let items_avail = bytes_avail / item_size;
        if items_avail < item_count {
            return false;
        }

        let bytes_to_read = item_count * item_size;
        let read_idx = read_pos & mask;
        let bytes_to_end = capacity - read_idx;

        // SAFETY: see read_raw; no cursor advances so the region stays valid
        // regardless of a racing consumer (there is none -- peek is
        // consumer-only).
        unsafe {
            let buffer = self.buffer_ptr();
            if bytes_to_read <= bytes_to_end {
                ptr::copy_nonoverlapping(buffer.add(read_idx), dst, bytes_to_read);
            } else {
                ptr::copy_nonoverlapping(buffer.add(read_idx), dst, bytes_to_end);
                ptr::copy_nonoverlapping(buffer, dst.add(bytes_to_end), bytes_to_read - bytes_to_end);
            }
        }

        if self.config.enable_metrics {
            self.metrics.record_peek();
        }
        true
    }

    /// Byte-level sugar for [`RingBuffer::peek_raw`] with `item_size == 1`.
    pub fn peek(&self, dst: &mut [u8]) -> bool {
        self.peek_raw(dst.as_mut_ptr(), 1, dst.len())
    }

    // -------------------------------------------------------------------
    // Discard operations (§4.5) -- consumer-only
    // -------------------------------------------------------------------

    /// Advances `read_position` by whole items without copying anything.
    /// Same "integral items" policy as `read_raw`.
    pub fn skip(&self, item_size: usize, item_count: usize, allow_partial: bool) -> usize {
        if item_size == 0 || item_count == 0 || !self.is_usable() {
            return 0;
        }
        let write_pos = self.write_position.load(Ordering::Acquire);
        let read_pos = self.read_position.load(Ordering::Relaxed);

        let bytes_avail = write_pos.wrapping_sub(read_pos);
        let items_avail = bytes_avail / item_size;
        if items_avail == 0 {
            return 0;
        }
        if items_avail < item_count && !allow_partial {
            return 0;
        }

        let items_to_skip = items_avail.min(item_count);
        let bytes_to_skip = items_to_skip * item_size;
        let new_read_pos = read_pos.wrapping_add(bytes_to_skip);
        debug_assert_monotonic!("read_position", read_pos, new_read_pos);
        self.read_position.store(new_read_pos, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.record_skip(bytes_to_skip);
        }
        items_to_skip
    }

    /// Discards everything currently readable in one step. Returns the
    /// number of bytes discarded. Idempotent on an empty buffer.
    pub fn drain(&self) -> usize {
        if !self.is_usable() {
            return 0;
        }
        let write_pos = self.write_position.load(Ordering::Acquire);
        let read_pos = self.read_position.load(Ordering::Relaxed);
        self.read_position.store(write_pos, Ordering::Release);
        let bytes = write_pos.wrapping_sub(read_pos);
        if self.config.enable_metrics {
            self.metrics.record_drain(bytes);
        }
        bytes
    }

    // -------------------------------------------------------------------
    // Vector interface (§4.4) -- zero-copy
    // -------------------------------------------------------------------

    /// The two contiguous segments currently free for writing, in physical
    /// order. `front.len() + back.len() == free_space()`. Producer-only.
    pub fn write_vector(&self) -> WriteVector<'_> {
        if !self.is_usable() {
            return WriteVector { front: &mut [], back: &mut [] };
        }
        let capacity = self.capacity();
        let mask = self.capacity_mask();
        let write_pos = self.write_position.load(Ordering::Relaxed);
        let read_pos = self.read_position.load(Ordering::Acquire);

        let free = capacity - write_pos.wrapping_sub(read_pos);
        let write_idx = write_pos & mask;
        let bytes_to_end = capacity - write_idx;
        let front_len = free.min(bytes_to_end);
        let back_len = free - front_len;

        // SAFETY: [write_idx, write_idx + front_len) and [0, back_len) are
        // disjoint sub-ranges of the free region, never touched by the
        // consumer until commit_write advances write_position.
        unsafe {
            let buffer = self.buffer_ptr();
            let front = std::slice::from_raw_parts_mut(buffer.add(write_idx), front_len);
            let back = std::slice::from_raw_parts_mut(buffer, back_len);
            WriteVector { front, back }
        }
    }

    /// Advances `write_position` by `count` bytes after the caller has
    /// copied that many bytes into the segments from the most recent
    /// `write_vector()` call.
    ///
    /// # Panics
    ///
    /// Debug builds assert `count <= free_space()`; in release builds
    /// passing an oversized `count` is undefined behavior per §4.4/§7.
    pub fn commit_write(&self, count: usize) {
        let capacity = self.capacity();
        let write_pos = self.write_position.load(Ordering::Relaxed);
        let read_pos = self.read_position.load(Ordering::Relaxed);
        let free = capacity.saturating_sub(write_pos.wrapping_sub(read_pos));
        debug_assert_commit_bounds!("write", count, free);

        let new_write_pos = write_pos.wrapping_add(count);
        debug_assert_monotonic!("write_position", write_pos, new_write_pos);
        self.write_position.store(new_write_pos, Ordering::Release);
    }

    /// The two contiguous segments currently available for reading, in
    /// physical order. `front.len() + back.len() == available_bytes()`.
    /// Consumer-only.
    pub fn read_vector(&self) -> ReadVector<'_> {
        if !self.is_usable() {
            return ReadVector { front: &[], back: &[] };
        }
        let capacity = self.capacity();
        let mask = self.capacity_mask();
        let write_pos = self.write_position.load(Ordering::Acquire);
        let read_pos = self.read_position.load(Ordering::Relaxed);

        let used = write_pos.wrapping_sub(read_pos);
        let read_idx = read_pos & mask;
        let bytes_to_end = capacity - read_idx;
        let front_len = used.min(bytes_to_end);
        let back_len = used - front_len;

        // SAFETY: [read_idx, read_idx + front_len) and [0, back_len) are
        // disjoint sub-ranges of the used region, published by the
        // producer's Release store to write_position observed above.
        unsafe {
            let buffer = self.buffer_ptr();
            let front = std::slice::from_raw_parts(buffer.add(read_idx), front_len);
            let back = std::slice::from_raw_parts(buffer, back_len);
            ReadVector { front, back }
        }
    }

    /// Advances `read_position` by `count` bytes after the caller has
    /// consumed that many bytes from the segments of the most recent
    /// `read_vector()` call.
    ///
    /// # Panics
    ///
    /// Debug builds assert `count <= available_bytes()`; in release builds
    /// passing an oversized `count` is undefined behavior per §4.4/§7.
    pub fn commit_read(&self, count: usize) {
        let write_pos = self.write_position.load(Ordering::Relaxed);
        let read_pos = self.read_position.load(Ordering::Relaxed);
        let used = write_pos.wrapping_sub(read_pos);
        debug_assert_commit_bounds!("read", count, used);

        let new_read_pos = read_pos.wrapping_add(count);
        debug_assert_monotonic!("read_position", read_pos, new_read_pos);
        self.read_position.store(new_read_pos, Ordering::Release);
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RingBuffer {
    fn drop(&mut self) {
        self.deallocate();
    }
}
