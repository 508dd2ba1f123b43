//! Allocation strategies.
//!
//! A [`Sequence`](crate::Sequence) obtains every storage block from an
//! [`AllocStrategy`]. This module defines the trait and the shipped
//! strategies.

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::api::error::AllocError;

pub(crate) mod system;
pub(crate) mod tracking;

/// A pluggable source of raw storage blocks.
///
/// # Safety
///
/// Implementors must return blocks that are valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and not aliased by any
/// other live block. Zero-size layouts must be accepted; the returned
/// pointer only has to be non-null and aligned. A block stays valid until it
/// is passed to [`deallocate`](AllocStrategy::deallocate) with the same
/// layout, on this strategy or on a clone of it.
pub unsafe trait AllocStrategy {
    /// Obtain a block for `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Release a block.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this strategy (or a clone) with
    /// the same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

unsafe impl<A: AllocStrategy + ?Sized> AllocStrategy for &A {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).deallocate(ptr, layout)
    }
}
