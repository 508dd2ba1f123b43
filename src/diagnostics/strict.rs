//! Strict mode handling for diagnostics.
//!
//! Allows configuration of how diagnostics are treated:
//! - Warn: Just emit the diagnostic
//! - Panic: Emit and then panic (useful for CI)
//!
//! Sequences are single-threaded, so the mode is tracked per thread. Each
//! thread starts from the `SEQALLOC_STRICT` environment variable.
//!
//! Strict mode changes the error contract: a failure that would normally
//! come back as a recoverable [`SeqError`](crate::SeqError) (allocation
//! failure, capacity overflow, and with `PanicOnWarning` also out-of-range
//! access and construction failure) panics at the point it is reported
//! instead. Rollback still runs while unwinding, so the sequence is left as
//! it was before the call.

use std::cell::Cell;

/// Strict mode behavior.
///
/// Any mode other than `Warn` turns the matching recoverable errors into
/// panics; see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StrictMode {
    /// Just warn, don't panic.
    Warn = 0,
    /// Panic on errors.
    PanicOnError = 1,
    /// Panic on errors and warnings.
    PanicOnWarning = 2,
}

impl StrictMode {
    /// Parse the value of `SEQALLOC_STRICT`.
    ///
    /// - "0" or "warn" -> Warn
    /// - "1" or "error" -> PanicOnError
    /// - "2" or "warning" -> PanicOnWarning
    pub fn parse(value: &str) -> StrictMode {
        match value.trim().to_lowercase().as_str() {
            "1" | "error" | "true" => StrictMode::PanicOnError,
            "2" | "warning" | "all" => StrictMode::PanicOnWarning,
            _ => StrictMode::Warn,
        }
    }

    fn from_env() -> StrictMode {
        std::env::var("SEQALLOC_STRICT")
            .map(|val| StrictMode::parse(&val))
            .unwrap_or(StrictMode::Warn)
    }
}

thread_local! {
    static STRICT_MODE: Cell<StrictMode> = Cell::new(StrictMode::from_env());
}

/// Set the strict mode for the current thread.
pub fn set_strict_mode(mode: StrictMode) {
    STRICT_MODE.with(|cell| cell.set(mode));
}

/// Get the current thread's strict mode.
pub fn strict_mode() -> StrictMode {
    STRICT_MODE.with(Cell::get)
}

/// Check if we should panic for error diagnostics.
pub fn should_panic() -> bool {
    matches!(strict_mode(), StrictMode::PanicOnError | StrictMode::PanicOnWarning)
}

/// Check if we should panic for warnings.
pub fn should_panic_on_warning() -> bool {
    matches!(strict_mode(), StrictMode::PanicOnWarning)
}

/// RAII guard for temporarily setting strict mode.
pub struct StrictModeGuard {
    previous: StrictMode,
}

impl StrictModeGuard {
    /// Create a new guard that sets strict mode.
    pub fn new(mode: StrictMode) -> Self {
        let previous = strict_mode();
        set_strict_mode(mode);
        Self { previous }
    }

    /// Create a guard that enables panic-on-error.
    pub fn panic_on_error() -> Self {
        Self::new(StrictMode::PanicOnError)
    }

    /// Create a guard that enables panic-on-warning.
    pub fn panic_on_warning() -> Self {
        Self::new(StrictMode::PanicOnWarning)
    }
}

impl Drop for StrictModeGuard {
    fn drop(&mut self) {
        set_strict_mode(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(StrictMode::parse("0"), StrictMode::Warn);
        assert_eq!(StrictMode::parse("Error"), StrictMode::PanicOnError);
        assert_eq!(StrictMode::parse(" all "), StrictMode::PanicOnWarning);
        assert_eq!(StrictMode::parse("bogus"), StrictMode::Warn);
    }

    #[test]
    fn test_strict_mode_panic_on_error() {
        let _guard = StrictModeGuard::new(StrictMode::PanicOnError);
        assert_eq!(strict_mode(), StrictMode::PanicOnError);
        assert!(should_panic());
        assert!(!should_panic_on_warning());
    }

    #[test]
    fn test_strict_mode_guard() {
        set_strict_mode(StrictMode::Warn);

        {
            let _guard = StrictModeGuard::panic_on_warning();
            assert!(should_panic_on_warning());
        }

        // Guard dropped, should be back to Warn
        assert_eq!(strict_mode(), StrictMode::Warn);
    }
}
