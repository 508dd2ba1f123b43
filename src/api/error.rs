//! Error types for sequence operations and allocation strategies.

use std::alloc::Layout;
use std::error::Error as StdError;

use thiserror::Error;

/// An allocation strategy could not supply a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("allocation of {size} bytes (align {align}) failed")]
pub struct AllocError {
    /// Requested size in bytes.
    pub size: usize,
    /// Requested alignment in bytes.
    pub align: usize,
}

impl AllocError {
    /// Create an error describing a failed request for `layout`.
    pub fn new(layout: Layout) -> Self {
        Self {
            size: layout.size(),
            align: layout.align(),
        }
    }
}

/// Reason an element constructor refused to produce a value.
///
/// Wraps anything convertible into a boxed error, so closures can return
/// `Err(ConstructError::new("out of tickets"))` or wrap a real error type.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct ConstructError {
    reason: Box<dyn StdError + Send + Sync + 'static>,
}

impl ConstructError {
    /// Create a construction error from a message or an error value.
    pub fn new<E>(reason: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self {
            reason: reason.into(),
        }
    }

    /// Borrow the underlying reason.
    pub fn reason(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.reason.as_ref()
    }

    /// Unwrap the underlying reason.
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.reason
    }
}

/// Errors surfaced by [`Sequence`](crate::Sequence) operations.
///
/// Every variant is returned to the immediate caller. Whenever one is
/// returned, the container holds exactly the elements it held before the
/// call, and no block obtained during the call is left allocated.
#[derive(Debug, Error)]
pub enum SeqError {
    /// The allocation strategy could not supply storage.
    #[error(transparent)]
    AllocationFailure(#[from] AllocError),

    /// The requested element count cannot be represented as a block.
    #[error("capacity overflow: cannot hold {requested} elements")]
    CapacityOverflow {
        /// Number of elements requested.
        requested: usize,
    },

    /// An element constructor failed while filling slot `index`.
    #[error("failed to construct element at index {index}: {source}")]
    Construction {
        /// Slot that was being filled.
        index: usize,
        /// What the constructor reported.
        source: ConstructError,
    },

    /// Checked access past the last live element.
    #[error("index {index} out of range for length {len}")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Length at the time of the access.
        len: usize,
    },
}

impl SeqError {
    /// Returns true for allocation-side failures (strategy or overflow).
    pub fn is_allocation(&self) -> bool {
        matches!(
            self,
            SeqError::AllocationFailure(_) | SeqError::CapacityOverflow { .. }
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = SeqError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_error_from_layout() {
        let layout = Layout::array::<u64>(4).unwrap();
        let err = AllocError::new(layout);
        assert_eq!(err.size, 32);
        assert_eq!(err.align, std::mem::align_of::<u64>());
        assert_eq!(err.to_string(), format!("allocation of 32 bytes (align {}) failed", err.align));
    }

    #[test]
    fn test_construct_error_message() {
        let err = SeqError::Construction {
            index: 3,
            source: ConstructError::new("ticket refused"),
        };
        assert_eq!(err.to_string(), "failed to construct element at index 3: ticket refused");
        assert!(!err.is_allocation());
    }

    #[test]
    fn test_out_of_range_message() {
        let err = SeqError::OutOfRange { index: 5, len: 2 };
        assert_eq!(err.to_string(), "index 5 out of range for length 2");
    }

    #[test]
    fn test_alloc_error_converts() {
        let err: SeqError = AllocError { size: 8, align: 8 }.into();
        assert!(err.is_allocation());
        assert!(matches!(err, SeqError::AllocationFailure(AllocError { size: 8, .. })));
    }
}
