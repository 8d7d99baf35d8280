use compact_str::CompactString;
use smallvec::SmallVec;

use crate::dialect::QuoteStyle;
use crate::span::Pos;

/// Lexical mode of the scanner.
///
/// `ProceduralBlock` is never stored: `ScanState::mode` reports it while
/// the scanner reads plain SQL inside an open BEGIN/END block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Default,
    LineComment,
    BlockComment,
    Quoted(QuoteStyle),
    DollarBlock,
    ProceduralBlock,
}

/// What the start of the buffer turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Leading {
    /// Only whitespace so far.
    #[default]
    Blank,
    /// `!set ...`: shell syntax, only quotes are tracked.
    Shell,
    /// SQL, possibly after a `!sql` style command.
    Sql,
}

/// A token whose meaning depends on characters not seen yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Pending {
    #[default]
    None,
    /// Proper prefix of at least one comment marker.
    Marker { start: Pos, text: CompactString },
    /// `$` plus tag characters, waiting for the second `$`.
    Dollar { start: Pos, tag: CompactString },
    /// Identifier run. `text` is only kept for keyword candidates.
    Word {
        start: Pos,
        text: CompactString,
        keyword_candidate: bool,
    },
    Digits { start: Pos },
    /// Command prefix plus command name at the start of the buffer.
    Command { start: Pos, name: CompactString },
}

/// `end` seen inside a procedural dialect, waiting for its `;`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingEnd {
    pub offset: Pos,
    /// A label (`end my_block;`) was already skipped.
    pub labelled: bool,
}

/// Mutable machine state of one statement buffer, carried from one
/// `scan` call to the next.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanState {
    pub(crate) mode: StoredMode,
    /// Absolute offset of the next input byte.
    pub(crate) offset: Pos,
    /// Segments before this offset are final.
    pub(crate) painted: Pos,
    /// Open brackets with their offsets, innermost last.
    pub(crate) brackets: SmallVec<[(char, Pos); 8]>,
    /// Offsets of unmatched procedural start keywords.
    pub(crate) proc_blocks: SmallVec<[Pos; 4]>,
    pub(crate) pending_end: Option<PendingEnd>,
    /// The innermost block was opened by a prelude keyword and has not
    /// reached its body yet.
    pub(crate) prelude_open: bool,
    pub(crate) dollar_tag: Option<CompactString>,
    /// Text closing the current block comment or dollar block.
    pub(crate) closer: CompactString,
    pub(crate) close_matched: usize,
    pub(crate) open_matched: usize,
    pub(crate) comment_depth: u32,
    /// Where the current quote, comment or dollar block opened.
    pub(crate) region_start: Pos,
    pub(crate) pending_escape: bool,
    /// A quote just closed; its close char again reopens it.
    pub(crate) reopen: Option<QuoteStyle>,
    pub(crate) last_significant: Option<char>,
    pub(crate) prev_char: Option<char>,
    pub(crate) leading: Leading,
    /// Any non-comment, non-whitespace input in the whole buffer.
    pub(crate) has_content: bool,
    /// Same, since the last statement boundary.
    pub(crate) statement_content: bool,
    /// The last boundary ended a shell command.
    pub(crate) after_command: bool,
    pub(crate) pending: Pending,
}

/// `Mode` without the derived `ProceduralBlock` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum StoredMode {
    #[default]
    Default,
    LineComment,
    BlockComment,
    Quoted(QuoteStyle),
    DollarBlock,
}

impl ScanState {
    /// Fresh state for an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        match self.mode {
            StoredMode::Default if !self.proc_blocks.is_empty() => Mode::ProceduralBlock,
            StoredMode::Default => Mode::Default,
            StoredMode::LineComment => Mode::LineComment,
            StoredMode::BlockComment => Mode::BlockComment,
            StoredMode::Quoted(style) => Mode::Quoted(style),
            StoredMode::DollarBlock => Mode::DollarBlock,
        }
    }

    pub fn bracket_depth(&self) -> usize {
        self.brackets.len()
    }

    /// Innermost open bracket.
    pub fn open_bracket(&self) -> Option<char> {
        self.brackets.last().map(|&(c, _)| c)
    }

    pub fn proc_block_depth(&self) -> usize {
        self.proc_blocks.len()
    }

    /// Tag of the open dollar-quoted block (`""` for `$$`).
    pub fn dollar_tag(&self) -> Option<&str> {
        self.dollar_tag.as_deref()
    }

    pub fn pending_escape(&self) -> bool {
        self.pending_escape
    }

    pub fn last_significant_char(&self) -> Option<char> {
        self.last_significant
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> Pos {
        self.offset
    }

    /// Whether anything besides whitespace and comments was seen.
    pub fn has_content(&self) -> bool {
        self.has_content
    }

    /// Whether the buffer is a shell command rather than SQL.
    pub fn is_shell_command(&self) -> bool {
        self.leading == Leading::Shell
    }

    /// Whether a token at the end of the input is still undecided.
    pub fn has_pending_token(&self) -> bool {
        self.pending != Pending::None
    }

    pub(crate) fn closer(&self) -> &str {
        &self.closer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::QuoteKind;

    #[test]
    fn test_fresh_state() {
        let state = ScanState::new();
        assert_eq!(state.mode(), Mode::Default);
        assert_eq!(state.bracket_depth(), 0);
        assert_eq!(state.proc_block_depth(), 0);
        assert_eq!(state.dollar_tag(), None);
        assert!(!state.pending_escape());
        assert_eq!(state.last_significant_char(), None);
        assert!(!state.has_content());
    }

    #[test]
    fn test_procedural_block_mode_is_derived() {
        let mut state = ScanState::new();
        state.proc_blocks.push(0);
        assert_eq!(state.mode(), Mode::ProceduralBlock);

        let style = QuoteStyle::symmetric('\'', QuoteKind::Literal);
        state.mode = StoredMode::Quoted(style);
        assert_eq!(state.mode(), Mode::Quoted(style));
    }
}
