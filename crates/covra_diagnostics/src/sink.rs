//! Thread-safe diagnostic accumulator.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A thread-safe accumulator for diagnostics emitted during a scoring run.
///
/// The error count is tracked atomically for fast `has_errors` checks
/// without locking the diagnostic vector.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    error_count: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
        }
    }

    /// Emits a diagnostic into the sink.
    ///
    /// If the diagnostic has [`Severity::Error`], the error count is
    /// incremented atomically.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        let mut diagnostics = self.diagnostics.lock().unwrap();
        diagnostics.push(diag);
    }

    /// Returns `true` if any error-severity diagnostics have been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Returns the number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    ///
    /// The error count is not reset; it reflects the whole session.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics.lock().unwrap();
        std::mem::take(&mut *diagnostics)
    }

    /// Returns a snapshot of all accumulated diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let diagnostics = self.diagnostics.lock().unwrap();
        diagnostics.clone()
    }

    /// Returns the total number of accumulated diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.lock().unwrap().len()
    }

    /// Returns `true` if no diagnostics have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().unwrap().is_empty()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use covra_source::Span;

    fn warning() -> Diagnostic {
        Diagnostic::warning(DiagnosticCode::new(Category::Bind, 101), "w", Span::DUMMY)
    }

    fn error() -> Diagnostic {
        Diagnostic::error(DiagnosticCode::new(Category::Race, 101), "e", Span::DUMMY)
    }

    #[test]
    fn empty_sink() {
        let sink = DiagnosticSink::new();
        assert!(sink.is_empty());
        assert!(!sink.has_errors());
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn emit_and_count() {
        let sink = DiagnosticSink::new();
        sink.emit(warning());
        sink.emit(error());
        sink.emit(error());
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.error_count(), 2);
        assert!(sink.has_errors());
    }

    #[test]
    fn take_all_drains() {
        let sink = DiagnosticSink::new();
        sink.emit(warning());
        let taken = sink.take_all();
        assert_eq!(taken.len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn diagnostics_snapshot_keeps_contents() {
        let sink = DiagnosticSink::new();
        sink.emit(warning());
        let snap = sink.diagnostics();
        assert_eq!(snap.len(), 1);
        assert_eq!(sink.len(), 1);
    }
}
