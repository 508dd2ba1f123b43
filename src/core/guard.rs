//! Rollback guard for ranges of slots under construction.

use std::mem;
use std::ptr;

use crate::api::error::{ConstructError, Result, SeqError};
use crate::diagnostics::macros::{seq_debug, seq_emit};

/// Owns the slots `[start, end)` constructed so far.
///
/// Dropping the guard drops those values, which covers both an early
/// return on a construction error and unwinding out of a panicking
/// constructor. [`InitGuard::commit`] hands ownership back to the caller.
pub(crate) struct InitGuard<T> {
    base: *mut T,
    start: usize,
    end: usize,
}

impl<T> InitGuard<T> {
    /// Start guarding an empty range at `start`.
    ///
    /// # Safety
    ///
    /// `base` must point to a block whose slots from `start` onwards are
    /// vacant for as long as the guard pushes into them.
    pub(crate) unsafe fn new(base: *mut T, start: usize) -> Self {
        Self {
            base,
            start,
            end: start,
        }
    }

    /// Write `value` into the next slot.
    ///
    /// # Safety
    ///
    /// The slot at `end` must exist in the block.
    pub(crate) unsafe fn push(&mut self, value: T) {
        self.base.add(self.end).write(value);
        self.end += 1;
    }

    /// Stop guarding; the constructed slots now belong to the caller.
    pub(crate) fn commit(self) {
        mem::forget(self);
    }
}

impl<T> Drop for InitGuard<T> {
    fn drop(&mut self) {
        let built = self.end - self.start;
        if built > 0 {
            seq_debug!("rolling back {} constructed slots", built);
        }
        // SAFETY: exactly the slots in [start, end) were written by `push`.
        unsafe { drop_range(self.base, self.start, self.end) };
    }
}

/// Drop the live values in `[start, end)`.
///
/// # Safety
///
/// Every slot in the range must be live, and is vacant afterwards.
pub(crate) unsafe fn drop_range<T>(base: *mut T, start: usize, end: usize) {
    if end > start {
        let tail = ptr::slice_from_raw_parts_mut(base.add(start), end - start);
        ptr::drop_in_place(tail);
    }
}

/// Build the error for a failed constructor and report it.
pub(crate) fn construction_failed(index: usize, source: ConstructError) -> SeqError {
    seq_emit!(SQ003, "slot {}: {}", index, source);
    SeqError::Construction { index, source }
}

/// Construct slots `[start, end)` from `make(index)`, all or nothing.
///
/// On the first error, or if `make` panics, the slots built by this call
/// are dropped before the failure leaves the function.
///
/// # Safety
///
/// `base` must point to a block with at least `end` slots, and
/// `[start, end)` must be vacant.
pub(crate) unsafe fn fill<T, F>(base: *mut T, start: usize, end: usize, mut make: F) -> Result<()>
where
    F: FnMut(usize) -> std::result::Result<T, ConstructError>,
{
    let mut guard = InitGuard::new(base, start);
    for index in start..end {
        match make(index) {
            Ok(value) => guard.push(value),
            Err(source) => return Err(construction_failed(index, source)),
        }
    }
    guard.commit();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::mem::MaybeUninit;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    struct Counted<'a>(&'a Cell<usize>);

    impl Drop for Counted<'_> {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_fill_commits() {
        let mut slots = [MaybeUninit::<u32>::uninit(); 4];
        let base = slots.as_mut_ptr().cast::<u32>();

        unsafe { fill(base, 0, 4, |i| Ok(i as u32 * 10)).unwrap() };

        let values: Vec<u32> = slots.iter().map(|s| unsafe { s.assume_init() }).collect();
        assert_eq!(values, vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_fill_rolls_back_on_error() {
        let drops = Cell::new(0);
        let mut slots: [MaybeUninit<Counted<'_>>; 4] = [
            MaybeUninit::uninit(),
            MaybeUninit::uninit(),
            MaybeUninit::uninit(),
            MaybeUninit::uninit(),
        ];
        let base = slots.as_mut_ptr().cast::<Counted<'_>>();

        let result = unsafe {
            fill(base, 1, 4, |i| {
                if i == 3 {
                    Err(ConstructError::new("third slot refused"))
                } else {
                    Ok(Counted(&drops))
                }
            })
        };

        assert!(matches!(result, Err(SeqError::Construction { index: 3, .. })));
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_guard_drops_on_panic() {
        let drops = Cell::new(0);
        let mut slots: [MaybeUninit<Counted<'_>>; 3] =
            [MaybeUninit::uninit(), MaybeUninit::uninit(), MaybeUninit::uninit()];
        let base = slots.as_mut_ptr().cast::<Counted<'_>>();

        let outcome = catch_unwind(AssertUnwindSafe(|| unsafe {
            fill(base, 0, 3, |i| {
                assert!(i < 2, "constructor panicked");
                Ok(Counted(&drops))
            })
        }));

        assert!(outcome.is_err());
        assert_eq!(drops.get(), 2);
    }
}
