//! Debug assertion macros for ring buffer invariants.
//!
//! These macros provide runtime checks for the invariants documented in
//! `SPEC_FULL.md` (`§3`, `§4.2`, `§4.4`). They are only active in debug
//! builds (`#[cfg(debug_assertions)]`), so there is zero overhead in release
//! builds.

// =============================================================================
// INV-CAP-01: Bounded Used
// =============================================================================

/// Assert that `used` never exceeds `capacity`.
///
/// **Invariant**: `0 <= used <= capacity`
///
/// Used in: `commit_write_internal()` after computing the new write position.
macro_rules! debug_assert_bounded_used {
    ($used:expr, $capacity:expr) => {
        debug_assert!(
            $used <= $capacity,
            "INV-CAP-01 violated: used {} exceeds capacity {}",
            $used,
            $capacity
        )
    };
}

// =============================================================================
// INV-SEQ-01: Monotonic Progress
// =============================================================================

/// Assert that a cursor only moves forward (in modular distance).
///
/// **Invariant**: `new - old` does not look like a backward jump.
///
/// Used in: `commit_write_internal()` for `write_position`, `advance_read()`
/// for `read_position`.
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new.wrapping_sub($old) <= (isize::MAX as usize),
            "INV-SEQ-01 violated: {} moved backward from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

// =============================================================================
// INV-VEC-01: Commit Bounds
// =============================================================================

/// Assert that `commit_write`/`commit_read` never advances past what the
/// matching `write_vector`/`read_vector` call made available.
///
/// **Invariant**: `count <= free` (write side) or `count <= used` (read side)
///
/// Used in: `RingBuffer::commit_write()`, `RingBuffer::commit_read()`
macro_rules! debug_assert_commit_bounds {
    ($what:literal, $count:expr, $bound:expr) => {
        debug_assert!(
            $count <= $bound,
            "INV-VEC-01 violated: commit_{} count {} exceeds available {}",
            $what,
            $count,
            $bound
        )
    };
}

pub(crate) use debug_assert_bounded_used;
pub(crate) use debug_assert_commit_bounds;
pub(crate) use debug_assert_monotonic;
