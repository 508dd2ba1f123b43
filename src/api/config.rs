//! Tracking strategy configuration.

use crate::util::size::mb;

/// Configuration for [`TrackingAlloc`](crate::TrackingAlloc).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingConfig {
    /// Label used in diagnostics (default: "tracking")
    pub name: &'static str,

    /// Maximum live bytes before allocations fail (0 = unlimited)
    pub byte_limit: usize,

    /// Fail the allocation attempt made after this many successful
    /// allocations (one-shot)
    pub fail_after: Option<u64>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            name: "tracking",
            byte_limit: 0,
            fail_after: None,
        }
    }
}

impl TrackingConfig {
    /// Count everything, never fail on purpose.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Fail allocations that would push live bytes over `bytes`.
    pub fn budget(bytes: usize) -> Self {
        Self {
            byte_limit: bytes,
            ..Self::default()
        }
    }

    /// A 1 MB budget for tests or constrained environments.
    pub fn constrained() -> Self {
        Self::budget(mb(1))
    }

    /// Builder pattern: set the diagnostic label.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Builder pattern: set the byte limit.
    pub fn with_byte_limit(mut self, limit: usize) -> Self {
        self.byte_limit = limit;
        self
    }

    /// Builder pattern: inject one failure after `successes` allocations.
    pub fn with_fail_after(mut self, successes: u64) -> Self {
        self.fail_after = Some(successes);
        self
    }
}
