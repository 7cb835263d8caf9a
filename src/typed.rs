//! The typed convenience layer (§4.6): `Pod`-bounded single-value, slice, and
//! small-tuple helpers built entirely on top of the byte-level engine in
//! [`crate::ring`] and the zero-copy vector interface in
//! [`crate::vector`]. Nothing here touches `write_position`/`read_position`
//! directly.
//!
//! `bytemuck::Pod` plays the role the spec's "refuse pointer-typed arguments
//! at compile time" plays in the original: only plain-old-data types (no
//! padding, no interior pointers, no `Drop` impl) satisfy it, so a caller
//! cannot accidentally push a `Vec<u8>` or `Box<T>` through the ring and
//! have its pointee silently bypass the buffer's ownership.

use std::mem;

use bytemuck::Pod;

use crate::ring::RingBuffer;
use crate::vector::{blit_from, blit_into};

impl RingBuffer {
    /// Writes one `Pod` value. Returns `false` (no partial write) if there
    /// isn't room for the whole value.
    pub fn write_value<T: Pod>(&self, value: &T) -> bool {
        let bytes = bytemuck::bytes_of(value);
        self.write(bytes, false) == bytes.len()
    }

    /// Reads one `Pod + Default` value, or `None` if fewer than
    /// `size_of::<T>()` bytes are available.
    ///
    /// `T::default()` is constructed *before* the buffer is touched, so a
    /// panicking `Default` impl leaves `read_position` exactly where it was
    /// (§7's strong exception safety, translated to Rust panic semantics).
    pub fn read_value<T: Pod + Default>(&self) -> Option<T> {
        let mut value = T::default();
        let size = mem::size_of::<T>();
        if self.available_bytes() < size {
            return None;
        }
        let bytes = bytemuck::bytes_of_mut(&mut value);
        let read = self.read_raw(bytes.as_mut_ptr(), size, 1, false);
        (read == 1).then_some(value)
    }

    /// Non-advancing counterpart of [`RingBuffer::read_value`].
    pub fn peek_value<T: Pod + Default>(&self) -> Option<T> {
        let mut value = T::default();
        let size = mem::size_of::<T>();
        let bytes = bytemuck::bytes_of_mut(&mut value);
        self.peek_raw(bytes.as_mut_ptr(), size, 1).then_some(value)
    }

    /// Writes a slice of `Pod` items; same partial-write policy as
    /// [`RingBuffer::write`], counted in items rather than bytes.
    pub fn write_slice<T: Pod>(&self, items: &[T], allow_partial: bool) -> usize {
        let bytes = bytemuck::cast_slice(items);
        self.write_raw(bytes.as_ptr(), mem::size_of::<T>(), items.len(), allow_partial)
    }

    /// Reads into a slice of `Pod` items; returns the number of whole items
    /// filled.
    pub fn read_slice<T: Pod>(&self, out: &mut [T], allow_partial: bool) -> usize {
        let count = out.len();
        let bytes = bytemuck::cast_slice_mut(out);
        self.read_raw(bytes.as_mut_ptr(), mem::size_of::<T>(), count, allow_partial)
    }

    /// Non-advancing counterpart of [`RingBuffer::read_slice`]: delivers the
    /// full `out.len()` items or leaves `out` untouched and returns `false`.
    pub fn peek_slice<T: Pod>(&self, out: &mut [T]) -> bool {
        let count = out.len();
        let bytes = bytemuck::cast_slice_mut(out);
        self.peek_raw(bytes.as_mut_ptr(), mem::size_of::<T>(), count)
    }

    /// Discards `count` values of `T` without copying them out.
    pub fn skip_values<T: Pod>(&self, count: usize, allow_partial: bool) -> usize {
        self.skip(mem::size_of::<T>(), count, allow_partial)
    }

    /// Writes several values of possibly different `Pod` types as a single
    /// atomic unit: either every field lands, or none do. Translates the
    /// original's variadic `writeValues<Args...>` template pack to a tuple
    /// bound by [`ValueTuple`].
    pub fn write_values<V: ValueTuple>(&self, values: V) -> bool {
        let size = V::SIZE;
        let vec = self.write_vector();
        if vec.len() < size {
            return false;
        }
        values.write_fields(vec.front, vec.back);
        self.commit_write(size);
        true
    }

    /// Reads a tuple of values written by a matching [`RingBuffer::write_values`]
    /// call. All-or-nothing: `None` if the full tuple isn't yet available.
    pub fn read_values<V: ValueTuple>(&self) -> Option<V> {
        let size = V::SIZE;
        if self.available_bytes() < size {
            return None;
        }
        let vec = self.read_vector();
        let values = V::read_fields(vec.front, vec.back);
        self.commit_read(size);
        Some(values)
    }

    /// Non-advancing counterpart of [`RingBuffer::read_values`].
    pub fn peek_values<V: ValueTuple>(&self) -> Option<V> {
        let size = V::SIZE;
        if self.available_bytes() < size {
            return None;
        }
        let vec = self.read_vector();
        Some(V::read_fields(vec.front, vec.back))
    }
}

/// A fixed tuple of `Pod` types that can be written to or read from the
/// ring's vector interface as one unit. Implemented for tuples of arity 1
/// through 8 by the `impl_value_tuple!` macro below — Rust has no variadic
/// generics, so this is the idiomatic stand-in for the original's template
/// parameter pack.
pub trait ValueTuple: Sized {
    /// Combined byte size of every field, in declaration order.
    const SIZE: usize;

    fn write_fields(&self, front: &mut [u8], back: &mut [u8]);
    fn read_fields(front: &[u8], back: &[u8]) -> Self;
}

macro_rules! impl_value_tuple {
    ($($T:ident),+) => {
        impl<$($T: Pod),+> ValueTuple for ($($T,)+) {
            const SIZE: usize = 0usize $(+ mem::size_of::<$T>())+;

            #[allow(non_snake_case)]
            fn write_fields(&self, front: &mut [u8], back: &mut [u8]) {
                let ($($T,)+) = self;
                let mut pos = 0usize;
                $(
                    let bytes = bytemuck::bytes_of($T);
                    blit_into(pos, bytes, front, back);
                    pos += bytes.len();
                )+
                let _ = pos;
            }

            #[allow(non_snake_case)]
            fn read_fields(front: &[u8], back: &[u8]) -> Self {
                $(let mut $T: $T = bytemuck::Zeroable::zeroed();)+
                let mut pos = 0usize;
                $(
                    {
                        let bytes = bytemuck::bytes_of_mut(&mut $T);
                        blit_from(pos, bytes, front, back);
                        pos += bytes.len();
                    }
                )+
                let _ = pos;
                ($($T,)+)
            }
        }
    };
}

impl_value_tuple!(A);
impl_value_tuple!(A, B);
impl_value_tuple!(A, B, C);
impl_value_tuple!(A, B, C, D);
impl_value_tuple!(A, B, C, D, E);
impl_value_tuple!(A, B, C, D, E, F);
impl_value_tuple!(A, B, C, D, E, F, G);
impl_value_tuple!(A, B, C, D, E, F, G, H);
