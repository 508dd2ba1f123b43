//! Raw element storage obtained from an allocation strategy.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

use crate::allocators::AllocStrategy;
use crate::api::error::{Result, SeqError};
use crate::diagnostics::macros::{seq_debug, seq_emit, seq_trace};
use crate::util::layout::{array_layout, round_capacity};

/// Power-of-two capacity able to hold `requested` elements.
pub(crate) fn capacity_for(requested: usize) -> Result<usize> {
    round_capacity(requested).ok_or_else(|| capacity_overflow(requested))
}

fn capacity_overflow(requested: usize) -> SeqError {
    seq_emit!(SQ004, "{} elements requested", requested);
    SeqError::CapacityOverflow { requested }
}

/// A block of `capacity` uninitialized slots.
///
/// Tracks no liveness: which slots hold values is the owner's business.
/// Has no `Drop`; the owner must hand it back with [`RawBlock::release`]
/// using the strategy that allocated it.
pub(crate) struct RawBlock<T> {
    ptr: Option<NonNull<T>>,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T> RawBlock<T> {
    /// The null block: capacity 0, no storage.
    pub(crate) const fn empty() -> Self {
        Self {
            ptr: None,
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Allocate exactly `capacity` slots. Zero capacity allocates nothing.
    pub(crate) fn allocate<A: AllocStrategy>(alloc: &A, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Ok(Self::empty());
        }

        let layout = array_layout::<T>(capacity).ok_or_else(|| capacity_overflow(capacity))?;
        let ptr = alloc.allocate(layout).map_err(|err| {
            seq_emit!(SQ002, "{} slots of {}: {}", capacity, std::any::type_name::<T>(), err);
            SeqError::AllocationFailure(err)
        })?;

        seq_trace!("allocated {} slots ({} bytes)", capacity, layout.size());
        Ok(Self {
            ptr: Some(ptr.cast()),
            capacity,
            _marker: PhantomData,
        })
    }

    /// Number of slots.
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Storage identity, `None` for the null block.
    pub(crate) fn identity(&self) -> Option<NonNull<T>> {
        self.ptr
    }

    /// Base pointer; dangling but aligned for the null block.
    pub(crate) fn as_ptr(&self) -> *mut T {
        self.ptr.unwrap_or(NonNull::dangling()).as_ptr()
    }

    /// Pointer to slot `index`.
    ///
    /// # Safety
    ///
    /// `index` must be `<= capacity`.
    pub(crate) unsafe fn slot(&self, index: usize) -> *mut T {
        self.as_ptr().add(index)
    }

    /// Bitwise-move the first `len` slots of `src` into this block.
    ///
    /// # Safety
    ///
    /// `src[0..len]` must be live, `[0, len)` here must be vacant, and the
    /// caller must treat the source slots as vacant afterwards.
    pub(crate) unsafe fn relocate_from(&mut self, src: &RawBlock<T>, len: usize) {
        debug_assert!(len <= self.capacity && len <= src.capacity);
        ptr::copy_nonoverlapping(src.as_ptr(), self.as_ptr(), len);
    }

    /// Return the block to `alloc`. Releasing the null block is a no-op.
    ///
    /// # Safety
    ///
    /// `alloc` must be the strategy (or a clone of it) that allocated this
    /// block, and no slot may still hold a value that needs dropping.
    pub(crate) unsafe fn release<A: AllocStrategy>(self, alloc: &A) {
        if let Some(ptr) = self.ptr {
            // The layout was valid when the block was allocated.
            let layout = Layout::array::<T>(self.capacity).unwrap_unchecked();
            alloc.deallocate(ptr.cast(), layout);
            seq_trace!("released {} slots", self.capacity);
        }
    }
}

/// A freshly allocated block not yet adopted by a sequence.
///
/// Released back to the strategy on drop, so every early return or unwind
/// between allocation and adoption gives the block back.
pub(crate) struct PendingBlock<'a, T, A: AllocStrategy> {
    block: RawBlock<T>,
    alloc: &'a A,
}

impl<'a, T, A: AllocStrategy> PendingBlock<'a, T, A> {
    /// Allocate `capacity` slots from `alloc`.
    pub(crate) fn new(alloc: &'a A, capacity: usize) -> Result<Self> {
        Ok(Self {
            block: RawBlock::allocate(alloc, capacity)?,
            alloc,
        })
    }

    pub(crate) fn block(&mut self) -> &mut RawBlock<T> {
        &mut self.block
    }

    /// Hand the block over; it is no longer released on drop.
    pub(crate) fn commit(mut self) -> RawBlock<T> {
        mem::replace(&mut self.block, RawBlock::empty())
    }
}

impl<T, A: AllocStrategy> Drop for PendingBlock<'_, T, A> {
    fn drop(&mut self) {
        let block = mem::replace(&mut self.block, RawBlock::empty());
        if block.identity().is_some() {
            seq_debug!("releasing uncommitted block of {} slots", block.capacity());
        }
        // SAFETY: the block came from `self.alloc` and any values written
        // into it were dropped by their construction guard.
        unsafe { block.release(self.alloc) };
    }
}
