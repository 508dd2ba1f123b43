//! Storage internals: raw blocks and construction guards.
//!
//! Everything here is `unsafe` plumbing used by
//! [`Sequence`](crate::Sequence); none of it is public.

pub(crate) mod guard;
pub(crate) mod raw;
