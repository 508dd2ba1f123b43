//! Crate-internal diagnostic and tracing macros.
//!
//! Tracing expands to the `log` crate when the `log` feature is enabled and
//! to nothing otherwise.

/// Emit a predefined diagnostic by code, optionally with formatted context.
///
/// ```rust,ignore
/// seq_emit!(SQ001);
/// seq_emit!(SQ001, "index {} len {}", index, len);
/// ```
macro_rules! seq_emit {
    ($code:ident) => {{
        $crate::diagnostics::emit::emit(&$crate::diagnostics::$code);
    }};
    ($code:ident, $($arg:tt)+) => {{
        $crate::diagnostics::emit::emit_with_context(
            &$crate::diagnostics::$code,
            &format!($($arg)+),
        );
    }};
}

/// Trace-level event (growth, relocation).
macro_rules! seq_trace {
    ($($arg:tt)+) => {{
        #[cfg(feature = "log")]
        {
            log::trace!(target: "seqalloc", $($arg)+);
        }
        #[cfg(not(feature = "log"))]
        {
            let _ = format_args!($($arg)+);
        }
    }};
}

/// Debug-level event (rollback, block release).
macro_rules! seq_debug {
    ($($arg:tt)+) => {{
        #[cfg(feature = "log")]
        {
            log::debug!(target: "seqalloc", $($arg)+);
        }
        #[cfg(not(feature = "log"))]
        {
            let _ = format_args!($($arg)+);
        }
    }};
}

pub(crate) use seq_debug;
pub(crate) use seq_emit;
pub(crate) use seq_trace;
