//! Diagnostics for sequence operations and allocation strategies.
//!
//! This module provides:
//! - **Runtime diagnostics**: coded messages for failures the caller sees
//!   as [`SeqError`](crate::SeqError)s
//! - **Sinks**: per-thread capture of diagnostics (tests, overlays)
//! - **Strict mode**: optional panic-on-error for CI
//!
//! ## Diagnostic Codes
//!
//! | Code  | Meaning                        |
//! |-------|--------------------------------|
//! | SQ0xx | Sequence operation failures    |
//! | SQ1xx | Allocation strategy issues     |
//!
//! ## Usage
//!
//! ```rust
//! use std::rc::Rc;
//! use seqalloc::Sequence;
//! use seqalloc::diagnostics::{install_sink, CollectingSink};
//!
//! let sink = Rc::new(CollectingSink::new());
//! let _guard = install_sink(sink.clone());
//!
//! let seq: Sequence<u8> = Sequence::new();
//! assert!(seq.at(0).is_err());
//! assert_eq!(sink.codes(), vec!["SQ001"]);
//! ```

// Core diagnostic types
pub mod kind;
pub mod emit;
pub mod strict;
pub(crate) mod macros;

// Re-export core types
pub use kind::{Diagnostic, DiagnosticKind};
pub use emit::{
    emit, emit_with_context, install_sink, is_suppressed, suppress_diagnostics, Collected,
    CollectingSink, DiagnosticSink, SinkGuard,
};
pub use strict::{set_strict_mode, strict_mode, StrictMode, StrictModeGuard};

// Re-export predefined diagnostics
pub use kind::{SQ001, SQ002, SQ003, SQ004, SQ101, SQ102, SQ103};
