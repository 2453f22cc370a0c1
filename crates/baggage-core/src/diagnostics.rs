//! Warnings raised while transforming a resource.
//!
//! The loader never fails on a bad directive; it skips it and reports a
//! warning scoped to the resource being processed.

use std::sync::Mutex;

/// A skipped directive or ignored option in one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub resource: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

/// Where the loader sends its warnings
pub trait DiagnosticHandler: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);

    fn warning(&self, resource: &str, message: &str) {
        self.report(Diagnostic::new(resource, message));
    }
}

/// Prints each warning to stderr as it arrives
#[derive(Debug, Clone, Copy)]
pub struct ConsoleDiagnosticHandler {
    pretty: bool,
}

impl ConsoleDiagnosticHandler {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        if self.pretty {
            format!(
                "\x1b[1;33mwarning\x1b[0m in {}: {}",
                diagnostic.resource, diagnostic.message
            )
        } else {
            format!("warning in {}: {}", diagnostic.resource, diagnostic.message)
        }
    }
}

impl DiagnosticHandler for ConsoleDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        eprintln!("{}", self.render(&diagnostic));
    }
}

/// Keeps every warning for later inspection
#[derive(Debug, Default)]
pub struct CollectingDiagnosticHandler {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnosticHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticHandler for CollectingDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.push(diagnostic);
        }
    }
}
