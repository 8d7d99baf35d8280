use std::fmt;

use compact_str::CompactString;

use crate::dialect::QuoteStyle;
use crate::span::Pos;

/// A region that was still open when the input was forced to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    Quote(QuoteStyle),
    BlockComment,
    /// Dollar-quoted block with its tag (possibly empty).
    DollarBlock(CompactString),
    ProceduralBlock,
    /// Open bracket, by its opening character.
    Bracket(char),
}

/// What a closer was meant to close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closer {
    Bracket(char),
    Keyword(CompactString),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Closing bracket or end keyword with nothing open to close. The
    /// closer is not applied; depths never go negative.
    UnmatchedCloser(Closer),
    /// Region still open at forced termination (end of a script file).
    UnterminatedRegion(Region),
}

/// Scanner diagnostics are data, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Byte offset of the offending closer, or of the region's opener.
    pub offset: Pos,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn unmatched(offset: Pos, closer: Closer) -> Self {
        Self {
            offset,
            kind: DiagnosticKind::UnmatchedCloser(closer),
        }
    }

    pub fn unterminated(offset: Pos, region: Region) -> Self {
        Self {
            offset,
            kind: DiagnosticKind::UnterminatedRegion(region),
        }
    }

    pub fn is_unterminated(&self) -> bool {
        matches!(self.kind, DiagnosticKind::UnterminatedRegion(_))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::UnmatchedCloser(Closer::Bracket(c)) => {
                write!(f, "extra '{}' at offset {}", c, self.offset)
            }
            DiagnosticKind::UnmatchedCloser(Closer::Keyword(word)) => {
                write!(f, "'{}' without open block at offset {}", word, self.offset)
            }
            DiagnosticKind::UnterminatedRegion(region) => {
                let what = match region {
                    Region::Quote(style) => format!("missing closing quote {}", style.close),
                    Region::BlockComment => "missing end of comment".to_string(),
                    Region::DollarBlock(tag) => format!("missing closing ${}$", tag),
                    Region::ProceduralBlock => "missing end of block".to_string(),
                    Region::Bracket(c) => format!("unclosed '{}'", c),
                };
                write!(f, "{} (opened at offset {})", what, self.offset)
            }
        }
    }
}
