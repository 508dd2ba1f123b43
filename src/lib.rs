//! # seqalloc
//!
//! A growable contiguous sequence with pluggable allocation strategies and
//! strong failure safety.
//!
//! ## Features
//!
//! - Power-of-two capacity growth, never shrinking on its own
//! - All-or-nothing operations: a failed allocation or element constructor
//!   leaves the sequence exactly as it was
//! - Pluggable [`AllocStrategy`] (system heap by default)
//! - [`TrackingAlloc`] with counters, byte budgets and fault injection
//! - Coded diagnostics with per-thread sinks and strict mode
//!
//! ## Quick Start
//!
//! ```rust
//! use seqalloc::{Sequence, SeqError};
//!
//! let mut names: Sequence<String> = Sequence::new();
//! names.push("ada".to_string())?;
//! names.push_clone(&"grace".to_string())?;
//!
//! assert_eq!(names.len(), 2);
//! assert_eq!(names[1], "grace");
//! assert!(matches!(names.at(7), Err(SeqError::OutOfRange { index: 7, len: 2 })));
//! # Ok::<(), SeqError>(())
//! ```
//!
//! ## Cargo features
//!
//! - `log` (default): growth, release and rollback events through the
//!   `log` crate under the `seqalloc` target
//! - `diagnostics`: print diagnostics to stderr in release builds too

pub mod api;
pub mod diagnostics;

mod allocators;
mod core;
mod sync;
mod util;

// Re-export public API at crate root for convenience
pub use api::config::TrackingConfig;
pub use api::error::{AllocError, ConstructError, Result, SeqError};
pub use api::sequence::Sequence;
pub use api::stats::AllocStats;

// Allocation strategies
pub use allocators::system::SystemAlloc;
pub use allocators::tracking::TrackingAlloc;
pub use allocators::AllocStrategy;

// Diagnostics - Core types and predefined codes
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use diagnostics::{set_strict_mode, StrictMode, StrictModeGuard};
pub use diagnostics::{SQ001, SQ002, SQ003, SQ004, SQ101, SQ102, SQ103};
