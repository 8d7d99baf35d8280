use log::debug;

use crate::completion::{self, CompletionVerdict, Continuation};
use crate::diagnostic::Diagnostic;
use crate::dialect::Dialect;
use crate::highlight::highlight_segments;
use crate::lexer::{self, Boundary};
use crate::span::{push_segment, truncate_segments, Segment, Span};
use crate::state::ScanState;

/// Accumulates the lines of one logical statement in an interactive
/// shell, rescanning only what each line appends.
#[derive(Debug, Clone)]
pub struct StatementBuffer {
    dialect: Dialect,
    text: String,
    state: ScanState,
    settled: ScanState,
    segments: Vec<Segment>,
    diagnostics: Vec<Diagnostic>,
    boundaries: Vec<Boundary>,
}

impl StatementBuffer {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            text: String::new(),
            state: ScanState::new(),
            settled: ScanState::new(),
            segments: Vec::new(),
            diagnostics: Vec::new(),
            boundaries: Vec::new(),
        }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Append a line (or any chunk) and return the new verdict.
    pub fn push(&mut self, text: &str) -> CompletionVerdict {
        let result = lexer::scan(&self.state, text, &self.dialect);
        self.text.push_str(text);
        truncate_segments(&mut self.segments, result.start());
        for segment in result.segments() {
            push_segment(&mut self.segments, segment.start, segment.end, segment.kind);
        }
        self.diagnostics.extend_from_slice(result.diagnostics());
        self.boundaries.extend_from_slice(result.boundaries());
        self.state = result.state;
        self.settled = result.settled;
        self.verdict()
    }

    pub fn verdict(&self) -> CompletionVerdict {
        completion::verdict(&self.settled)
    }

    pub fn continuation(&self) -> Option<Continuation> {
        completion::continuation_of(&self.settled)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// State as if the buffer ended now.
    pub fn state(&self) -> &ScanState {
        &self.settled
    }

    /// Highlight spans for the whole buffer.
    pub fn highlight(&self) -> Vec<Span> {
        highlight_segments(&self.segments, 0, self.text.len())
    }

    /// Unmatched closers seen so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    /// Diagnostics for forced termination: unmatched closers plus every
    /// region still open.
    pub fn finish(&self) -> Vec<Diagnostic> {
        let mut all = self.diagnostics.clone();
        all.extend(lexer::unterminated_regions(&self.settled));
        all
    }

    /// Hand out the accumulated text and reset for the next statement.
    pub fn take(&mut self) -> String {
        debug!(
            "dispatching {} byte statement ({:?})",
            self.text.len(),
            self.verdict()
        );
        let text = std::mem::take(&mut self.text);
        self.clear();
        text
    }

    /// Drop everything without dispatching.
    pub fn clear(&mut self) {
        self.text.clear();
        self.state = ScanState::new();
        self.settled = ScanState::new();
        self.segments.clear();
        self.diagnostics.clear();
        self.boundaries.clear();
    }
}
