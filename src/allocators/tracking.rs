//! Counting strategy with byte budgets and fault injection.

use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::system::SystemAlloc;
use super::AllocStrategy;
use crate::api::config::TrackingConfig;
use crate::api::error::AllocError;
use crate::api::stats::AllocStats;
use crate::diagnostics::macros::seq_emit;
use crate::sync::atomics::{AtomicCounter, AtomicGauge};

/// `fail_at` value meaning "no failure armed".
const DISARMED: u64 = u64::MAX;

/// Wraps another strategy and records every request that passes through.
///
/// Clones share one set of counters, so a test can keep a handle while the
/// sequence owns another:
///
/// ```rust
/// use seqalloc::{Sequence, TrackingAlloc};
///
/// let tracker = TrackingAlloc::new();
/// {
///     let mut seq = Sequence::new_in(tracker.clone());
///     seq.push(1u32).unwrap();
///     seq.push(2).unwrap();
/// }
/// let stats = tracker.stats();
/// assert_eq!(stats.allocation_count, 2);
/// assert!(stats.is_balanced());
/// ```
#[derive(Clone)]
pub struct TrackingAlloc<A: AllocStrategy = SystemAlloc> {
    inner: A,
    state: Arc<TrackingState>,
}

struct TrackingState {
    config: TrackingConfig,
    allocations: AtomicCounter,
    deallocations: AtomicCounter,
    failures: AtomicCounter,
    live_bytes: AtomicGauge,
    peak_bytes: AtomicGauge,
    /// Allocation count at which the next attempt fails.
    fail_at: AtomicU64,
}

impl TrackingAlloc<SystemAlloc> {
    /// Track the system heap with no limits.
    pub fn new() -> Self {
        Self::with_config(TrackingConfig::default())
    }

    /// Track the system heap with the given configuration.
    pub fn with_config(config: TrackingConfig) -> Self {
        Self::wrap(SystemAlloc, config)
    }
}

impl Default for TrackingAlloc<SystemAlloc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AllocStrategy> TrackingAlloc<A> {
    /// Track an arbitrary inner strategy.
    pub fn wrap(inner: A, config: TrackingConfig) -> Self {
        let fail_at = config.fail_after.unwrap_or(DISARMED);
        Self {
            inner,
            state: Arc::new(TrackingState {
                config,
                allocations: AtomicCounter::default(),
                deallocations: AtomicCounter::default(),
                failures: AtomicCounter::default(),
                live_bytes: AtomicGauge::default(),
                peak_bytes: AtomicGauge::default(),
                fail_at: AtomicU64::new(fail_at),
            }),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &TrackingConfig {
        &self.state.config
    }

    /// Snapshot the counters.
    pub fn stats(&self) -> AllocStats {
        let state = &self.state;
        AllocStats {
            allocation_count: state.allocations.get(),
            deallocation_count: state.deallocations.get(),
            failed_allocations: state.failures.get(),
            live_bytes: state.live_bytes.get(),
            peak_bytes: state.peak_bytes.get(),
        }
    }

    /// Every block handed out has been released.
    pub fn is_balanced(&self) -> bool {
        self.stats().is_balanced()
    }

    /// Fail the allocation attempt made after `successes` further successful
    /// allocations. `arm_failure(0)` fails the very next attempt.
    pub fn arm_failure(&self, successes: u64) {
        let target = self.state.allocations.get().saturating_add(successes);
        self.state.fail_at.store(target, Ordering::Relaxed);
    }

    /// Cancel a pending injected failure.
    pub fn disarm(&self) {
        self.state.fail_at.store(DISARMED, Ordering::Relaxed);
    }

    /// Restart the high-water mark from the current live bytes.
    pub fn reset_peak(&self) {
        self.state.peak_bytes.set(self.state.live_bytes.get());
    }

    fn refuse(&self, layout: Layout) -> AllocError {
        self.state.failures.increment();
        AllocError::new(layout)
    }
}

unsafe impl<A: AllocStrategy> AllocStrategy for TrackingAlloc<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let state = &self.state;

        let attempt = state.allocations.get();
        if state
            .fail_at
            .compare_exchange(attempt, DISARMED, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            seq_emit!(SQ103, "{}: attempt #{} refused", state.config.name, attempt + 1);
            return Err(self.refuse(layout));
        }

        let limit = state.config.byte_limit;
        if limit != 0 && state.live_bytes.get().saturating_add(layout.size()) > limit {
            seq_emit!(
                SQ101,
                "{}: {} live + {} requested > {} limit",
                state.config.name,
                state.live_bytes.get(),
                layout.size(),
                limit
            );
            return Err(self.refuse(layout));
        }

        let ptr = self.inner.allocate(layout).map_err(|err| {
            state.failures.increment();
            err
        })?;

        state.allocations.increment();
        state.peak_bytes.update_max(state.live_bytes.add(layout.size()));
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.inner.deallocate(ptr, layout);
        self.state.deallocations.increment();
        self.state.live_bytes.sub(layout.size());
    }
}

impl Drop for TrackingState {
    fn drop(&mut self) {
        let allocations = self.allocations.get();
        let deallocations = self.deallocations.get();
        if allocations != deallocations {
            seq_emit!(
                SQ102,
                "{}: {} allocations, {} deallocations, {} bytes live",
                self.config.name,
                allocations,
                deallocations,
                self.live_bytes.get()
            );
        }
    }
}

impl<A: AllocStrategy> fmt::Debug for TrackingAlloc<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingAlloc")
            .field("config", &self.state.config)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{install_sink, CollectingSink};
    use std::rc::Rc;

    #[test]
    fn test_counts_and_peak() {
        let tracker = TrackingAlloc::new();
        let small = Layout::array::<u32>(4).unwrap();
        let large = Layout::array::<u32>(16).unwrap();

        let a = tracker.allocate(small).unwrap();
        let b = tracker.allocate(large).unwrap();
        assert_eq!(tracker.stats().live_bytes, 80);

        unsafe {
            tracker.deallocate(a, small);
            tracker.deallocate(b, large);
        }

        let stats = tracker.stats();
        assert_eq!(stats.allocation_count, 2);
        assert_eq!(stats.deallocation_count, 2);
        assert_eq!(stats.peak_bytes, 80);
        assert!(stats.is_balanced());

        tracker.reset_peak();
        assert_eq!(tracker.stats().peak_bytes, 0);
    }

    #[test]
    fn test_budget_refuses() {
        let tracker = TrackingAlloc::with_config(TrackingConfig::budget(64));
        let layout = Layout::array::<u8>(48).unwrap();

        let first = tracker.allocate(layout).unwrap();
        let err = tracker.allocate(layout).unwrap_err();
        assert_eq!(err, AllocError { size: 48, align: 1 });
        assert_eq!(tracker.stats().failed_allocations, 1);

        unsafe { tracker.deallocate(first, layout) };
        assert!(tracker.is_balanced());
    }

    #[test]
    fn test_injected_failure_is_one_shot() {
        let sink = Rc::new(CollectingSink::new());
        let _guard = install_sink(sink.clone());

        let tracker = TrackingAlloc::with_config(TrackingConfig::default().with_fail_after(1));
        let layout = Layout::new::<u64>();

        let first = tracker.allocate(layout).unwrap();
        assert!(tracker.allocate(layout).is_err());
        let third = tracker.allocate(layout).unwrap();

        unsafe {
            tracker.deallocate(first, layout);
            tracker.deallocate(third, layout);
        }
        assert_eq!(sink.codes(), vec!["SQ103"]);
        assert!(tracker.is_balanced());
    }

    #[test]
    fn test_arm_and_disarm() {
        let tracker = TrackingAlloc::new();
        let layout = Layout::new::<u16>();

        tracker.arm_failure(0);
        assert!(tracker.allocate(layout).is_err());

        tracker.arm_failure(0);
        tracker.disarm();
        let ptr = tracker.allocate(layout).unwrap();
        unsafe { tracker.deallocate(ptr, layout) };
    }

    #[test]
    fn test_leak_reported_on_drop() {
        let sink = Rc::new(CollectingSink::new());
        let _guard = install_sink(sink.clone());

        let tracker = TrackingAlloc::with_config(TrackingConfig::default().with_name("leaky"));
        let layout = Layout::new::<u64>();
        let ptr = tracker.allocate(layout).unwrap();
        drop(tracker);

        assert_eq!(sink.codes(), vec!["SQ102"]);
        let context = sink.collected()[0].context.clone().unwrap();
        assert!(context.starts_with("leaky: 1 allocations"));

        // Release through the system heap the tracker wrapped.
        unsafe { SystemAlloc.deallocate(ptr, layout) };
    }

    #[test]
    fn test_clones_share_counters() {
        let tracker = TrackingAlloc::new();
        let other = tracker.clone();
        let layout = Layout::new::<u32>();

        let ptr = other.allocate(layout).unwrap();
        assert_eq!(tracker.stats().allocation_count, 1);
        unsafe { tracker.deallocate(ptr, layout) };
        assert!(other.is_balanced());
    }
}
