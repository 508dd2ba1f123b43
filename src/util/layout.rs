//! Layout and capacity utilities.

use std::alloc::Layout;

/// Smallest power of two that is `>= n`, with `0` staying `0`.
///
/// Returns `None` when the rounded value does not fit in `usize`.
#[inline]
pub const fn round_capacity(n: usize) -> Option<usize> {
    if n == 0 {
        return Some(0);
    }
    n.checked_next_power_of_two()
}

/// Create a layout for an array of T with the given count.
///
/// `None` when the byte size overflows `isize`.
#[inline]
pub fn array_layout<T>(count: usize) -> Option<Layout> {
    Layout::array::<T>(count).ok()
}

/// Returns true if `n` is zero or a power of two.
#[inline]
pub const fn is_valid_capacity(n: usize) -> bool {
    n == 0 || n.is_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_capacity() {
        assert_eq!(round_capacity(0), Some(0));
        assert_eq!(round_capacity(1), Some(1));
        assert_eq!(round_capacity(2), Some(2));
        assert_eq!(round_capacity(3), Some(4));
        assert_eq!(round_capacity(5), Some(8));
        assert_eq!(round_capacity(1024), Some(1024));
        assert_eq!(round_capacity(1025), Some(2048));
        assert_eq!(round_capacity(usize::MAX), None);
    }

    #[test]
    fn test_array_layout() {
        let layout = array_layout::<u32>(8).unwrap();
        assert_eq!(layout.size(), 32);
        assert_eq!(layout.align(), 4);
        assert!(array_layout::<u64>(usize::MAX / 4).is_none());
    }

    #[test]
    fn test_is_valid_capacity() {
        assert!(is_valid_capacity(0));
        assert!(is_valid_capacity(1));
        assert!(is_valid_capacity(64));
        assert!(!is_valid_capacity(6));
    }
}
