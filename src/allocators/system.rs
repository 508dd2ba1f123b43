//! System heap strategy.

use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

use super::AllocStrategy;
use crate::api::error::AllocError;

/// Stateless strategy backed by the global system allocator.
///
/// Zero-size requests never reach the heap: they are answered with a
/// dangling pointer aligned for the layout, and releasing one is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAlloc;

impl SystemAlloc {
    /// Create the system strategy.
    pub const fn new() -> Self {
        SystemAlloc
    }
}

fn dangling(layout: Layout) -> NonNull<u8> {
    // SAFETY: alignments are non-zero powers of two.
    unsafe { NonNull::new_unchecked(layout.align() as *mut u8) }
}

unsafe impl AllocStrategy for SystemAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }

        // SAFETY: Using system allocator with a non-zero-size layout
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| AllocError::new(layout))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            dealloc(ptr.as_ptr(), layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_allocation() {
        let heap = SystemAlloc::new();
        let layout = Layout::new::<u64>();

        let ptr = heap.allocate(layout).unwrap();
        assert_eq!(ptr.as_ptr() as usize % layout.align(), 0);

        unsafe {
            ptr.cast::<u64>().as_ptr().write(42);
            assert_eq!(*ptr.cast::<u64>().as_ptr(), 42);
            heap.deallocate(ptr, layout);
        }
    }

    #[test]
    fn test_zero_size_is_dangling() {
        let heap = SystemAlloc::new();
        let layout = Layout::from_size_align(0, 16).unwrap();

        let ptr = heap.allocate(layout).unwrap();
        assert_eq!(ptr.as_ptr() as usize, 16);
        unsafe { heap.deallocate(ptr, layout) };
    }
}
