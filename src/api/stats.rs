//! Allocation statistics.

use crate::util::size::format_bytes;

/// Snapshot of a [`TrackingAlloc`](crate::TrackingAlloc)'s counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Total number of successful allocations.
    pub allocation_count: u64,

    /// Total number of deallocations performed.
    pub deallocation_count: u64,

    /// Allocation attempts that were refused (budget or injected).
    pub failed_allocations: u64,

    /// Bytes currently allocated.
    pub live_bytes: usize,

    /// Peak bytes allocated (high water mark).
    pub peak_bytes: usize,
}

impl AllocStats {
    /// Create empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks allocated and not yet released.
    pub fn active_allocations(&self) -> u64 {
        self.allocation_count.saturating_sub(self.deallocation_count)
    }

    /// Every allocation has been paired with a deallocation.
    pub fn is_balanced(&self) -> bool {
        self.allocation_count == self.deallocation_count && self.live_bytes == 0
    }
}

impl std::fmt::Display for AllocStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Allocation Statistics:")?;
        writeln!(f, "  Allocations:     {}", self.allocation_count)?;
        writeln!(f, "  Deallocations:   {}", self.deallocation_count)?;
        writeln!(f, "  Active:          {}", self.active_allocations())?;
        writeln!(f, "  Failed:          {}", self.failed_allocations)?;
        writeln!(f, "  Live:            {}", format_bytes(self.live_bytes))?;
        writeln!(f, "  Peak:            {}", format_bytes(self.peak_bytes))?;
        Ok(())
    }
}
