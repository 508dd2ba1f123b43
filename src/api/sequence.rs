//! The growable sequence container.
//!
//! A [`Sequence`] owns one block of element slots obtained from its
//! [`AllocStrategy`]. Slots `[0, len)` hold live values; the rest of the
//! block is uninitialized. Capacity is always zero or a power of two and
//! never shrinks on its own.
//!
//! # Failure safety
//!
//! Every fallible operation is all-or-nothing. When an allocation or an
//! element constructor fails (by returning [`ConstructError`] or by
//! panicking), the values built by that call are dropped, any block
//! allocated by that call is released, and the sequence keeps the length,
//! capacity and values it had before the call.
//!
//! # Threading
//!
//! A sequence is a single-owner, single-thread container: it is neither
//! `Send` nor `Sync`.

use std::fmt;
use std::mem;
use std::ops::{Index, IndexMut};
use std::slice;

use crate::allocators::system::SystemAlloc;
use crate::allocators::AllocStrategy;
use crate::api::error::{ConstructError, Result, SeqError};
use crate::core::guard::{construction_failed, drop_range, fill};
use crate::core::raw::{capacity_for, PendingBlock, RawBlock};
use crate::diagnostics::macros::{seq_emit, seq_trace};
use crate::util::layout::is_valid_capacity;

/// A contiguous, growable sequence of `T` with a pluggable allocation
/// strategy.
///
/// # Example
///
/// ```rust
/// use seqalloc::Sequence;
///
/// let mut seq = Sequence::new();
/// seq.push(1).unwrap();
/// seq.push(2).unwrap();
/// seq.push(3).unwrap();
///
/// assert_eq!(seq.len(), 3);
/// assert_eq!(seq.capacity(), 4);
/// assert_eq!(*seq.at(1).unwrap(), 2);
/// assert!(seq.at(3).is_err());
/// ```
pub struct Sequence<T, A: AllocStrategy = SystemAlloc> {
    buf: RawBlock<T>,
    len: usize,
    alloc: A,
}

impl<T> Sequence<T> {
    /// An empty sequence on the system heap. Allocates nothing.
    pub const fn new() -> Self {
        Self::new_in(SystemAlloc::new())
    }

    /// `len` default values. See [`Sequence::with_len_in`].
    pub fn with_len(len: usize) -> Result<Self>
    where
        T: Default,
    {
        Self::with_len_in(len, SystemAlloc::new())
    }

    /// `len` clones of `value`. See [`Sequence::from_elem_in`].
    pub fn from_elem(len: usize, value: &T) -> Result<Self>
    where
        T: Clone,
    {
        Self::from_elem_in(len, value, SystemAlloc::new())
    }

    /// `len` values built by `make(index)`. See [`Sequence::try_from_fn_in`].
    pub fn try_from_fn<F>(len: usize, make: F) -> Result<Self>
    where
        F: FnMut(usize) -> std::result::Result<T, ConstructError>,
    {
        Self::try_from_fn_in(len, SystemAlloc::new(), make)
    }
}

impl<T, A: AllocStrategy> Sequence<T, A> {
    /// An empty sequence using `alloc`. Allocates nothing.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            buf: RawBlock::empty(),
            len: 0,
            alloc,
        }
    }

    /// `len` default values in a block of `len` rounded up to a power of two.
    ///
    /// A panicking `T::default()` drops the values built so far and
    /// releases the block before unwinding further.
    pub fn with_len_in(len: usize, alloc: A) -> Result<Self>
    where
        T: Default,
    {
        Self::try_from_fn_in(len, alloc, |_| Ok(T::default()))
    }

    /// `len` clones of `value`, with the same rollback as
    /// [`Sequence::with_len_in`].
    pub fn from_elem_in(len: usize, value: &T, alloc: A) -> Result<Self>
    where
        T: Clone,
    {
        Self::try_from_fn_in(len, alloc, |_| Ok(value.clone()))
    }

    /// `len` values built by `make(index)`, in index order.
    ///
    /// If `make` fails at index `i`, the values `[0, i)` are dropped, the
    /// block is released, and [`SeqError::Construction`] is returned.
    pub fn try_from_fn_in<F>(len: usize, alloc: A, make: F) -> Result<Self>
    where
        F: FnMut(usize) -> std::result::Result<T, ConstructError>,
    {
        let capacity = capacity_for(len)?;
        let mut block: PendingBlock<'_, T, A> = PendingBlock::new(&alloc, capacity)?;
        // SAFETY: the block has `capacity >= len` vacant slots.
        unsafe { fill(block.block().as_ptr(), 0, len, make)? };
        let buf = block.commit();

        Ok(Self { buf, len, alloc })
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of slots in the current block.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns true if the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The allocation strategy.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Base of the storage block.
    ///
    /// Dangling (never null) when nothing is allocated. Any growth
    /// invalidates it, together with every element reference.
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Bounds-checked access.
    pub fn at(&self, index: usize) -> Result<&T> {
        self.check_index(index)?;
        // SAFETY: index < len, so the slot is live.
        Ok(unsafe { &*self.buf.slot(index) })
    }

    /// Bounds-checked mutable access.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        self.check_index(index)?;
        // SAFETY: index < len, so the slot is live.
        Ok(unsafe { &mut *self.buf.slot(index) })
    }

    /// Bounds-checked extraction: consumes the sequence and returns the
    /// element at `index` by value. The other elements are dropped.
    ///
    /// The sequence is consumed either way: when `index >= len` every
    /// element is dropped and its storage released before the error is
    /// returned.
    pub fn into_at(self, index: usize) -> Result<T> {
        self.check_index(index)?;
        Ok(self.extract(index))
    }

    /// Unchecked-style extraction: like [`Sequence::into_at`] but panics
    /// when `index >= len`, the way indexing does.
    pub fn into_index(self, index: usize) -> T {
        assert!(
            index < self.len,
            "index {} out of range for length {}",
            index,
            self.len
        );
        self.extract(index)
    }

    /// Access without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be `< len()`.
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        &*self.buf.slot(index)
    }

    /// Mutable access without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be `< len()`.
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        &mut *self.buf.slot(index)
    }

    /// A new sequence with clones of every element, in a block sized for
    /// `len()`. Fails without side effects if allocation or a clone fails.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
        A: Clone,
    {
        self.try_clone_with(|item| Ok(item.clone()))
    }

    /// Deep copy with a fallible per-element copier.
    pub fn try_clone_with<F>(&self, mut copy: F) -> Result<Self>
    where
        A: Clone,
        F: FnMut(&T) -> std::result::Result<T, ConstructError>,
    {
        let source = self.live();
        Self::try_from_fn_in(self.len, self.alloc.clone(), |index| copy(&source[index]))
    }

    /// Move the whole contents out, leaving `self` empty with no storage.
    ///
    /// ```rust
    /// use seqalloc::Sequence;
    ///
    /// let mut a = Sequence::from_elem(3, &7u8).unwrap();
    /// let b = a.take();
    /// assert_eq!((a.len(), a.capacity()), (0, 0));
    /// assert_eq!(b.len(), 3);
    /// ```
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let empty = Self::new_in(self.alloc.clone());
        mem::replace(self, empty)
    }

    /// Copy-assignment: replace the contents with clones of `other`'s.
    ///
    /// The copy is built completely before `self` is touched, so a failed
    /// allocation or clone leaves `self` unmodified. A no-op when both
    /// sequences share storage identity.
    pub fn assign_from(&mut self, other: &Self) -> Result<()>
    where
        T: Clone,
        A: Clone,
    {
        if self.shares_storage(other) {
            return Ok(());
        }

        let source = other.live();
        let mut copy =
            Self::try_from_fn_in(other.len, self.alloc.clone(), |index| Ok(source[index].clone()))?;
        self.move_assign(&mut copy);
        Ok(())
    }

    /// Move-assignment: drop `self`'s elements and adopt `other`'s.
    ///
    /// `other` is left with length 0 and receives `self`'s previous block
    /// and strategy, which it releases when dropped. Never fails; a no-op
    /// when both sequences share storage identity.
    pub fn move_assign(&mut self, other: &mut Self) {
        if self.shares_storage(other) {
            return;
        }

        self.clear();
        self.len = mem::replace(&mut other.len, 0);
        mem::swap(&mut self.buf, &mut other.buf);
        mem::swap(&mut self.alloc, &mut other.alloc);
    }

    /// Append by move. Only allocation can fail; on failure `value` is
    /// dropped and the sequence is unchanged.
    pub fn push(&mut self, value: T) -> Result<()> {
        if self.len == self.capacity() {
            self.grow_for(self.required(1)?)?;
        }

        // SAFETY: len < capacity after growth, and the slot is vacant.
        unsafe { self.buf.slot(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Append a clone of `value`.
    ///
    /// When the block is full the clone is made into the new block before
    /// any existing element moves, so a panicking clone or a failed
    /// allocation leaves the sequence untouched.
    pub fn push_clone(&mut self, value: &T) -> Result<()>
    where
        T: Clone,
    {
        self.try_push_with(|| Ok(value.clone()))
    }

    /// Append a value built by `make`, with the same guarantees as
    /// [`Sequence::push_clone`].
    pub fn try_push_with<F>(&mut self, make: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<T, ConstructError>,
    {
        let index = self.len;

        if index < self.capacity() {
            let value = make().map_err(|source| construction_failed(index, source))?;
            // SAFETY: index < capacity and the slot is vacant.
            unsafe { self.buf.slot(index).write(value) };
            self.len += 1;
            return Ok(());
        }

        let capacity = capacity_for(self.required(1)?)?;
        let mut block: PendingBlock<'_, T, A> = PendingBlock::new(&self.alloc, capacity)?;
        let value = make().map_err(|source| construction_failed(index, source))?;
        // SAFETY: the new block has room for index + 1 slots, all vacant;
        // the old block's live slots are treated as vacant once relocated.
        unsafe {
            block.block().slot(index).write(value);
            block.block().relocate_from(&self.buf, index);
        }
        let new = block.commit();
        self.adopt(new);
        self.len += 1;
        Ok(())
    }

    /// Remove and return the last element, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was live and is vacant from now on.
        Some(unsafe { self.buf.slot(self.len).read() })
    }

    /// Make room for at least `capacity` elements.
    ///
    /// A no-op when `capacity <= self.capacity()`. Otherwise allocates a
    /// block of `capacity` rounded up to a power of two and moves the
    /// elements over; allocation failure leaves the sequence unchanged.
    pub fn reserve(&mut self, capacity: usize) -> Result<()> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        self.grow_for(capacity)
    }

    /// Drop every element. Capacity and storage are kept.
    pub fn clear(&mut self) {
        let len = mem::replace(&mut self.len, 0);
        // SAFETY: [0, len) was live; len is already 0 if a drop panics.
        unsafe { drop_range(self.buf.as_ptr(), 0, len) };
    }

    /// Resize to `new_len`, filling new slots with clones of `value`.
    ///
    /// See [`Sequence::try_resize_with`] for the failure behavior.
    pub fn resize(&mut self, new_len: usize, value: &T) -> Result<()>
    where
        T: Clone,
    {
        self.try_resize_with(new_len, || Ok(value.clone()))
    }

    /// Resize to `new_len`, filling new slots with `T::default()`.
    pub fn resize_default(&mut self, new_len: usize) -> Result<()>
    where
        T: Default,
    {
        self.try_resize_with(new_len, || Ok(T::default()))
    }

    /// Resize to `new_len`, building new slots with `make`.
    ///
    /// - Shrinking drops the tail.
    /// - Growing within capacity builds the tail in place; on failure only
    ///   the new values are dropped and the length is unchanged.
    /// - Growing past capacity builds the tail in a new block first, then
    ///   moves the existing elements; on failure the new block is released
    ///   and the sequence is untouched.
    pub fn try_resize_with<F>(&mut self, new_len: usize, mut make: F) -> Result<()>
    where
        F: FnMut() -> std::result::Result<T, ConstructError>,
    {
        let old_len = self.len;

        if new_len <= old_len {
            self.truncate(new_len);
            return Ok(());
        }

        if new_len <= self.capacity() {
            // SAFETY: [old_len, new_len) is vacant and inside the block.
            unsafe { fill(self.buf.as_ptr(), old_len, new_len, |_| make())? };
            self.len = new_len;
            return Ok(());
        }

        let capacity = capacity_for(new_len)?;
        let mut block: PendingBlock<'_, T, A> = PendingBlock::new(&self.alloc, capacity)?;
        // SAFETY: the new block has `capacity >= new_len` vacant slots; the
        // old live slots are treated as vacant once relocated.
        unsafe {
            fill(block.block().as_ptr(), old_len, new_len, |_| make())?;
            block.block().relocate_from(&self.buf, old_len);
        }
        seq_trace!("resize {} -> {}, capacity {} -> {}", old_len, new_len, self.capacity(), capacity);
        let new = block.commit();
        self.adopt(new);
        self.len = new_len;
        Ok(())
    }

    fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let old_len = mem::replace(&mut self.len, new_len);
        // SAFETY: [new_len, old_len) was live and is no longer counted.
        unsafe { drop_range(self.buf.as_ptr(), new_len, old_len) };
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len {
            return Ok(());
        }
        seq_emit!(SQ001, "index {} len {}", index, self.len);
        Err(SeqError::OutOfRange {
            index,
            len: self.len,
        })
    }

    fn required(&self, additional: usize) -> Result<usize> {
        self.len
            .checked_add(additional)
            .ok_or(SeqError::CapacityOverflow {
                requested: self.len.saturating_add(additional),
            })
    }

    /// Reallocate into a block for at least `min_capacity` slots.
    fn grow_for(&mut self, min_capacity: usize) -> Result<()> {
        let capacity = capacity_for(min_capacity)?;
        let mut block: PendingBlock<'_, T, A> = PendingBlock::new(&self.alloc, capacity)?;
        // SAFETY: the new block is vacant and large enough for len slots.
        unsafe { block.block().relocate_from(&self.buf, self.len) };
        seq_trace!("grow capacity {} -> {} (len {})", self.capacity(), capacity, self.len);
        let new = block.commit();
        self.adopt(new);
        Ok(())
    }

    /// Swap in `new` and release the old block, whose live values must
    /// already have been relocated.
    fn adopt(&mut self, new: RawBlock<T>) {
        let old = mem::replace(&mut self.buf, new);
        // SAFETY: `old` came from `self.alloc` and holds no live values.
        unsafe { old.release(&self.alloc) };
        debug_assert!(is_valid_capacity(self.capacity()));
    }

    fn extract(mut self, index: usize) -> T {
        let len = mem::replace(&mut self.len, 0);
        let base = self.buf.as_ptr();
        // SAFETY: index < len; the element is read out once and every other
        // live slot is dropped exactly once. `Drop` then sees len 0.
        unsafe {
            let value = base.add(index).read();
            drop_range(base, 0, index);
            drop_range(base, index + 1, len);
            value
        }
    }

    fn shares_storage(&self, other: &Self) -> bool {
        match (self.buf.identity(), other.buf.identity()) {
            (None, None) => true,
            // Zero-sized blocks share one dangling address.
            (Some(a), Some(b)) => a == b && mem::size_of::<T>() != 0,
            _ => false,
        }
    }

    fn live(&self) -> &[T] {
        // SAFETY: [0, len) is live and the base is aligned and non-null.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    fn live_mut(&mut self) -> &mut [T] {
        // SAFETY: as in `live`, with exclusive access through &mut self.
        unsafe { slice::from_raw_parts_mut(self.buf.as_ptr(), self.len) }
    }
}

impl<T, A: AllocStrategy> Drop for Sequence<T, A> {
    fn drop(&mut self) {
        self.clear();
        let buf = mem::replace(&mut self.buf, RawBlock::empty());
        // SAFETY: every element was dropped above; the block is ours.
        unsafe { buf.release(&self.alloc) };
    }
}

impl<T, A: AllocStrategy + Default> Default for Sequence<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Clone, A: AllocStrategy + Clone> Clone for Sequence<T, A> {
    /// Panics if allocation fails; use [`Sequence::try_clone`] to handle it.
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => panic!("Sequence::clone failed: {}", err),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.assign_from(source) {
            panic!("Sequence::clone_from failed: {}", err);
        }
    }
}

impl<T, A: AllocStrategy> Index<usize> for Sequence<T, A> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.live()[index]
    }
}

impl<T, A: AllocStrategy> IndexMut<usize> for Sequence<T, A> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.live_mut()[index]
    }
}

impl<T: fmt::Debug, A: AllocStrategy> fmt::Debug for Sequence<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.live()).finish()
    }
}
