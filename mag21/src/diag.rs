//!
//! # Parse Diagnostics
//!
//! Everything the parser skips over (missing sub-cells, malformed fields,
//! out-of-place statements, unknown lines) is reported as a [Diagnostic]
//! to a [DiagnosticSink], rather than failing the parse.
//!

// Std-Lib
use std::fmt;
use std::path::PathBuf;

// Crates.io
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

/// Enumerated categories of recoverable parse conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A `use` statement's cell file could not be read. The instance is omitted.
    SubCellUnreadable,
    /// A recognized statement with invalid or missing fields. The line is dropped.
    MalformedField,
    /// A valid statement in the wrong place, e.g. `rect` before any layer,
    /// or `transform` with no open instance. The line is dropped.
    OutOfContext,
    /// A line with no recognized keyword
    UnrecognizedLine,
}

/// # Diagnostic
///
/// One recoverable condition, located by file and (1-based) line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub path: PathBuf,
    pub line: usize,
    pub message: String,
}
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}: {:?}: {}",
            self.path.display(),
            self.line,
            self.kind,
            self.message
        )
    }
}

/// # Diagnostic Sink
///
/// Receives every [Diagnostic] produced during a parse.
/// Implemented for [LogSink], which forwards to the `log` facade,
/// and for `Vec<Diagnostic>`, which collects them.
pub trait DiagnosticSink {
    fn report(&mut self, diag: Diagnostic);
}
impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn report(&mut self, diag: Diagnostic) {
        (**self).report(diag)
    }
}
impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diag: Diagnostic) {
        self.push(diag)
    }
}

/// # Logging Sink
///
/// The default sink. Missing sub-cells are warnings; dropped fields are debug-level;
/// unrecognized lines, of which real Magic files have plenty (`string`, `flabel`, `port`, ...),
/// only show up at trace-level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;
impl DiagnosticSink for LogSink {
    fn report(&mut self, diag: Diagnostic) {
        match diag.kind {
            DiagnosticKind::SubCellUnreadable => warn!("{}", diag),
            DiagnosticKind::MalformedField | DiagnosticKind::OutOfContext => debug!("{}", diag),
            DiagnosticKind::UnrecognizedLine => trace!("{}", diag),
        }
    }
}

/// Count the entries of `diags` of each [DiagnosticKind], in enum order
pub fn summarize(diags: &[Diagnostic]) -> Vec<(DiagnosticKind, usize)> {
    use DiagnosticKind::*;
    [SubCellUnreadable, MalformedField, OutOfContext, UnrecognizedLine]
        .into_iter()
        .map(|kind| (kind, diags.iter().filter(|d| d.kind == kind).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}
