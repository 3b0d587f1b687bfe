use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use super::{Diagnostic, Severity};

/// Append-only diagnostic sink, safe to share between concurrent validators.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, diagnostic: Diagnostic) {
        if diagnostic.severity.is_error() {
            tracing::debug!(subject = %diagnostic.subject, category = %diagnostic.category, "{}", diagnostic.message);
        }
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }

    pub fn extend(&self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(diagnostics);
    }

    pub fn len(&self) -> usize {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|d| d.severity.is_error())
            .count()
    }

    /// Freezes the collected diagnostics and computes the counts.
    pub fn finalize(self) -> RunReport {
        let diagnostics = self
            .diagnostics
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        RunReport::new(diagnostics)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub successes: usize,
    pub infos: usize,
}

impl SeverityCounts {
    fn tally(diagnostics: &[Diagnostic]) -> Self {
        let mut counts = Self::default();
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Success => counts.successes += 1,
                Severity::Info => counts.infos += 1,
            }
        }
        counts
    }
}

/// Finalized result of a validation run.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub(super) diagnostics: Vec<Diagnostic>,
    pub(super) counts: SeverityCounts,
}

impl RunReport {
    fn new(diagnostics: Vec<Diagnostic>) -> Self {
        let counts = SeverityCounts::tally(&diagnostics);
        Self {
            diagnostics,
            counts,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn counts(&self) -> SeverityCounts {
        self.counts
    }

    pub fn error_count(&self) -> usize {
        self.counts.errors
    }

    pub fn warning_count(&self) -> usize {
        self.counts.warnings
    }

    /// `1` if any error was recorded, `0` otherwise (warnings never fail).
    pub fn exit_code(&self) -> i32 {
        if self.counts.errors > 0 { 1 } else { 0 }
    }

    pub fn is_clean(&self) -> bool {
        self.counts.errors == 0 && self.counts.warnings == 0
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
    }
}
