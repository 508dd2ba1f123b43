//! Synchronization primitives.
//!
//! Counters shared between clones of an allocation strategy.

pub(crate) mod atomics;
