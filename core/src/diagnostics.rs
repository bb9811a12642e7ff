use std::sync::Mutex;

/// A single recoverable parse failure, carrying enough context to be logged
/// or asserted on without the caller needing to reach into the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Destination for non-fatal parse diagnostics.
///
/// The shape codec's robustness contract is that garbled lines cost data,
/// never the file: every recoverable failure is handed to a sink instead of
/// aborting the parse. The default production sink logs through `tracing`;
/// tests use [`VecDiagnosticSink`] to assert on exactly what was reported.
pub trait DiagnosticSink {
    fn record(&self, diagnostic: Diagnostic);
}

/// Emits each diagnostic as a `tracing::warn!` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnosticSink;

impl DiagnosticSink for TracingDiagnosticSink {
    fn record(&self, diagnostic: Diagnostic) {
        tracing::warn!(line = diagnostic.line, message = %diagnostic.message, "shape diagnostic");
    }
}

/// Collects diagnostics in memory, for tests.
#[derive(Debug, Default)]
pub struct VecDiagnosticSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl VecDiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.entries.into_inner().unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl DiagnosticSink for VecDiagnosticSink {
    fn record(&self, diagnostic: Diagnostic) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(diagnostic);
    }
}
