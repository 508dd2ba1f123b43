//! Diagnostic kinds and core types.
//!
//! Mirrors rustc's diagnostic levels for familiar UX.

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A hard error - something is definitely wrong.
    Error,
    /// A warning - something is probably wrong or suboptimal.
    Warning,
    /// Additional context about another diagnostic.
    Note,
}

impl DiagnosticKind {
    /// Get the display prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Note => "note",
        }
    }
}

/// A diagnostic message with code, message, and optional context.
///
/// Diagnostic codes follow the pattern:
/// - `SQ0xx` - Sequence operations
/// - `SQ1xx` - Allocation strategy issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub kind: DiagnosticKind,
    /// Diagnostic code (e.g., "SQ001").
    pub code: &'static str,
    /// Primary message.
    pub message: &'static str,
    /// Optional additional context.
    pub note: Option<&'static str>,
    /// Optional fix suggestion.
    pub help: Option<&'static str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub const fn error(code: &'static str, message: &'static str) -> Self {
        Self::with_kind(DiagnosticKind::Error, code, message)
    }

    /// Create a new warning diagnostic.
    pub const fn warning(code: &'static str, message: &'static str) -> Self {
        Self::with_kind(DiagnosticKind::Warning, code, message)
    }

    /// Create a new note diagnostic.
    pub const fn note(code: &'static str, message: &'static str) -> Self {
        Self::with_kind(DiagnosticKind::Note, code, message)
    }

    const fn with_kind(kind: DiagnosticKind, code: &'static str, message: &'static str) -> Self {
        Self {
            kind,
            code,
            message,
            note: None,
            help: None,
        }
    }

    /// Add a note to this diagnostic.
    pub const fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    /// Add a help message to this diagnostic.
    pub const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

// =============================================================================
// Predefined diagnostics (SQ0xx - Sequence operations)
// =============================================================================

/// SQ001: Checked access past the end.
pub const SQ001: Diagnostic = Diagnostic::warning(
    "SQ001",
    "checked access past the last live element",
)
.with_note("the index is greater than or equal to the sequence length")
.with_help("compare against len() first, or use pop()/into_at() to extract elements");

/// SQ002: Allocation strategy failed.
pub const SQ002: Diagnostic = Diagnostic::error(
    "SQ002",
    "allocation strategy failed to supply a block",
)
.with_note("the sequence was left exactly as it was before the call")
.with_help("check the strategy's byte budget, or reserve() ahead of time to fail early");

/// SQ003: Element construction failed and was rolled back.
pub const SQ003: Diagnostic = Diagnostic::warning(
    "SQ003",
    "element construction failed, partially built range rolled back",
)
.with_note("every element constructed by this call has been dropped");

/// SQ004: Requested capacity cannot be represented.
pub const SQ004: Diagnostic = Diagnostic::error(
    "SQ004",
    "requested capacity overflows the address space",
)
.with_help("the element count rounded to a power of two must fit in isize::MAX bytes");

// =============================================================================
// Predefined diagnostics (SQ1xx - Allocation strategies)
// =============================================================================

/// SQ101: Tracking budget exceeded.
pub const SQ101: Diagnostic = Diagnostic::warning(
    "SQ101",
    "allocation exceeds the tracking allocator's byte budget",
)
.with_help("raise TrackingConfig::byte_limit or release sequences earlier");

/// SQ102: Tracking allocator dropped with live blocks.
pub const SQ102: Diagnostic = Diagnostic::warning(
    "SQ102",
    "tracking allocator dropped while blocks are still allocated",
)
.with_note("allocation and deallocation counts do not match")
.with_help("a block was released through another strategy, or leaked with mem::forget");

/// SQ103: Injected allocation failure fired.
pub const SQ103: Diagnostic = Diagnostic::note(
    "SQ103",
    "injected allocation failure triggered",
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_consts() {
        assert_eq!(SQ001.kind, DiagnosticKind::Warning);
        assert_eq!(SQ002.kind.prefix(), "error");
        assert!(SQ003.help.is_none());
        assert_eq!(SQ103.kind, DiagnosticKind::Note);
        assert_eq!(SQ101.code, "SQ101");
    }
}
