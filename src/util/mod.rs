//! Small helpers shared by the storage and diagnostics code.

pub(crate) mod layout;
pub(crate) mod size;
