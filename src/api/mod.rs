//! Public API for seqalloc.
//!
//! This module contains all user-facing types.
//! Most users only need [`sequence::Sequence`] and the error types.

pub mod config;
pub mod error;
pub mod sequence;
pub mod stats;
