use std::alloc::Layout;

use thiserror::Error;

/// Failure modes of the throwing constructor, `RingBuffer::try_with_capacity`.
///
/// The non-throwing path (`RingBuffer::allocate`) collapses both of these
/// into a single `false` return, per §4.1/§7 of the spec; this type exists
/// only for callers that want to distinguish "bad argument" from "out of
/// memory".
#[derive(Debug, Error)]
pub enum AllocError {
    /// `requested` fell outside `[min, max]`.
    #[error("requested capacity {requested} is out of range [{min}, {max}]")]
    InvalidCapacity {
        requested: usize,
        min: usize,
        max: usize,
    },
    /// The process allocator refused the request.
    #[error("allocation of {0:?} failed")]
    AllocationFailed(Layout),
}
