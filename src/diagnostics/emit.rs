//! Diagnostic emission backend.
//!
//! Handles outputting diagnostics to the `log` crate, stderr, or a sink
//! installed on the current thread.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::kind::{Diagnostic, DiagnosticKind};
use super::strict::{should_panic, should_panic_on_warning};

thread_local! {
    static SUPPRESSED: Cell<bool> = Cell::new(false);
    static SINK: RefCell<Option<Rc<dyn DiagnosticSink>>> = RefCell::new(None);
}

/// Suppress all diagnostic output on the current thread.
pub fn suppress_diagnostics(suppress: bool) {
    SUPPRESSED.with(|flag| flag.set(suppress));
}

/// Check if diagnostics are suppressed on the current thread.
pub fn is_suppressed() -> bool {
    SUPPRESSED.with(Cell::get)
}

/// Emit a diagnostic.
pub fn emit(diag: &Diagnostic) {
    dispatch(diag, None);
}

/// Emit a diagnostic with additional runtime context.
pub fn emit_with_context(diag: &Diagnostic, context: &str) {
    dispatch(diag, Some(context));
}

fn dispatch(diag: &Diagnostic, context: Option<&str>) {
    if is_suppressed() {
        return;
    }

    // Clone out of the slot so a sink may install or remove sinks itself.
    let sink = SINK.with(|slot| slot.borrow().clone());
    if let Some(sink) = sink {
        sink.emit(diag, context);
    }

    #[cfg(feature = "log")]
    emit_to_log(diag, context);

    #[cfg(feature = "diagnostics")]
    emit_to_stderr(diag, context);

    let fatal = match diag.kind {
        DiagnosticKind::Error => should_panic(),
        DiagnosticKind::Warning => should_panic_on_warning(),
        DiagnosticKind::Note => false,
    };
    if fatal {
        panic!(
            "[seqalloc][{}] {}\nContext: {}\nStrict mode enabled - diagnostics are fatal.",
            diag.code,
            diag.message,
            context.unwrap_or("-")
        );
    }
}

/// Internal: emit to stderr.
#[cfg(feature = "diagnostics")]
fn emit_to_stderr(diag: &Diagnostic, context: Option<&str>) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(
        stderr,
        "[seqalloc][{}] {}: {}",
        diag.code,
        diag.kind.prefix(),
        diag.message
    );

    if let Some(context) = context {
        let _ = writeln!(stderr, "  context: {}", context);
    }
    if let Some(note) = diag.note {
        let _ = writeln!(stderr, "  note: {}", note);
    }
    if let Some(help) = diag.help {
        let _ = writeln!(stderr, "  help: {}", help);
    }

    let _ = writeln!(stderr);
}

/// Emit a diagnostic using the log crate.
#[cfg(feature = "log")]
fn emit_to_log(diag: &Diagnostic, context: Option<&str>) {
    let context = context.unwrap_or("");
    match diag.kind {
        DiagnosticKind::Error => {
            log::error!(target: "seqalloc", "[{}] {} {}", diag.code, diag.message, context);
        }
        DiagnosticKind::Warning => {
            log::warn!(target: "seqalloc", "[{}] {} {}", diag.code, diag.message, context);
        }
        DiagnosticKind::Note => {
            log::info!(target: "seqalloc", "[{}] {} {}", diag.code, diag.message, context);
        }
    }

    if let Some(note) = diag.note {
        log::debug!(target: "seqalloc", "  note: {}", note);
    }
    if let Some(help) = diag.help {
        log::debug!(target: "seqalloc", "  help: {}", help);
    }
}

/// A diagnostic sink trait for custom output.
pub trait DiagnosticSink {
    /// Handle a diagnostic and its runtime context, if any.
    fn emit(&self, diag: &Diagnostic, context: Option<&str>);
}

/// Install `sink` on the current thread until the returned guard drops.
pub fn install_sink(sink: Rc<dyn DiagnosticSink>) -> SinkGuard {
    let previous = SINK.with(|slot| slot.borrow_mut().replace(sink));
    SinkGuard { previous }
}

/// Restores the previously installed sink on drop.
pub struct SinkGuard {
    previous: Option<Rc<dyn DiagnosticSink>>,
}

impl Drop for SinkGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        SINK.with(|slot| *slot.borrow_mut() = previous);
    }
}

/// A diagnostic together with the context it was emitted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
    /// The emitted diagnostic.
    pub diagnostic: Diagnostic,
    /// Runtime context, if any.
    pub context: Option<String>,
}

/// A simple sink that collects diagnostics.
#[derive(Default)]
pub struct CollectingSink {
    collected: RefCell<Vec<Collected>>,
}

impl CollectingSink {
    /// Create a new collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all collected diagnostics.
    pub fn collected(&self) -> Vec<Collected> {
        self.collected.borrow().clone()
    }

    /// Codes of the collected diagnostics, in emission order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.collected
            .borrow()
            .iter()
            .map(|c| c.diagnostic.code)
            .collect()
    }

    /// Clear collected diagnostics.
    pub fn clear(&self) {
        self.collected.borrow_mut().clear();
    }

    /// Check if any errors were collected.
    pub fn has_errors(&self) -> bool {
        self.collected
            .borrow()
            .iter()
            .any(|c| c.diagnostic.kind == DiagnosticKind::Error)
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diag: &Diagnostic, context: Option<&str>) {
        self.collected.borrow_mut().push(Collected {
            diagnostic: diag.clone(),
            context: context.map(str::to_owned),
        });
    }
}
