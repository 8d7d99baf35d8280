use std::fmt;

use compact_str::CompactString;

use crate::dialect::QuoteStyle;
use crate::lexer::ScanResult;
use crate::state::{Leading, ScanState, StoredMode};

/// Whether a buffer may be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionVerdict {
    /// Ends in a top-level `;` with every region closed, or is a shell
    /// command with no open quote.
    Complete,
    /// Needs more input.
    Incomplete,
    /// Blank or comment-only: nothing to dispatch.
    TriviallyComplete,
}

impl CompletionVerdict {
    pub fn is_complete(self) -> bool {
        matches!(self, CompletionVerdict::Complete)
    }

    pub fn is_incomplete(self) -> bool {
        matches!(self, CompletionVerdict::Incomplete)
    }
}

/// Why a buffer is incomplete: what the line editor shows in the
/// continuation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    Quote(QuoteStyle),
    BlockComment(CompactString),
    DollarBlock(CompactString),
    Bracket(char),
    ProceduralBlock,
    Semicolon,
}

impl Continuation {
    pub fn prompt_hint(&self) -> String {
        match self {
            Continuation::Quote(style) => match style.close {
                '\'' => "quote".to_string(),
                '"' => "dquote".to_string(),
                close => close.to_string(),
            },
            Continuation::BlockComment(closer) => closer.to_string(),
            Continuation::DollarBlock(tag) => format!("${}$", tag),
            Continuation::Bracket('(') => ")".to_string(),
            Continuation::Bracket('[') => "]".to_string(),
            Continuation::Bracket(open) => open.to_string(),
            Continuation::ProceduralBlock => "end".to_string(),
            Continuation::Semicolon => "semicolon".to_string(),
        }
    }
}

impl fmt::Display for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prompt_hint())
    }
}

/// Completion verdict for a scanned buffer.
pub fn is_complete(result: &ScanResult) -> CompletionVerdict {
    verdict(result.settled_state())
}

pub(crate) fn verdict(state: &ScanState) -> CompletionVerdict {
    if state.leading == Leading::Shell {
        return match state.mode {
            StoredMode::Quoted(_) => CompletionVerdict::Incomplete,
            _ => CompletionVerdict::Complete,
        };
    }
    match state.mode {
        StoredMode::Quoted(_) | StoredMode::BlockComment | StoredMode::DollarBlock => {
            return CompletionVerdict::Incomplete;
        }
        // A line comment ends at end of input.
        StoredMode::Default | StoredMode::LineComment => {}
    }
    if !state.has_content {
        return CompletionVerdict::TriviallyComplete;
    }
    if !state.brackets.is_empty() || !state.proc_blocks.is_empty() || state.dollar_tag.is_some() {
        return CompletionVerdict::Incomplete;
    }
    if state.after_command && !state.statement_content {
        return CompletionVerdict::Complete;
    }
    if state.last_significant == Some(';') {
        CompletionVerdict::Complete
    } else {
        CompletionVerdict::Incomplete
    }
}

/// What an incomplete buffer is waiting for. `None` unless incomplete.
pub fn continuation(result: &ScanResult) -> Option<Continuation> {
    continuation_of(result.settled_state())
}

pub(crate) fn continuation_of(state: &ScanState) -> Option<Continuation> {
    if !verdict(state).is_incomplete() {
        return None;
    }
    let reason = match state.mode {
        StoredMode::Quoted(style) => Continuation::Quote(style),
        StoredMode::BlockComment => Continuation::BlockComment(CompactString::from(state.closer())),
        StoredMode::DollarBlock => {
            Continuation::DollarBlock(state.dollar_tag.clone().unwrap_or_default())
        }
        StoredMode::Default | StoredMode::LineComment => {
            if let Some(open) = state.open_bracket() {
                Continuation::Bracket(open)
            } else if !state.proc_blocks.is_empty() {
                Continuation::ProceduralBlock
            } else {
                Continuation::Semicolon
            }
        }
    };
    Some(reason)
}
