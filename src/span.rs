use crate::dialect::QuoteKind;

/// Position in source string (byte offset).
pub type Pos = usize;

/// Display category of a highlight span. The renderer owns the mapping
/// from category to an actual color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Command,
    Keyword,
    SingleQuote,
    IdentifierQuote,
    Number,
    Comment,
    Default,
}

/// A labeled, contiguous slice `[start, end)` of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
    pub category: Category,
}

impl Span {
    pub fn new(start: Pos, end: Pos, category: Category) -> Self {
        Self {
            start,
            end,
            category,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// What the scanner saw in a region of input. Finer than `Category`:
/// the highlight builder projects segments onto categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Whitespace, operators, identifiers and other plain SQL text.
    Text,
    Keyword,
    Number,
    /// The `!name` token of a shell command.
    Command,
    Quoted(QuoteKind),
    /// Line or block comment, including its markers.
    Comment,
    /// `$tag$ ... $tag$`, including both delimiters.
    Dollar,
}

/// A scanner output region. Segments of one scan are ordered, contiguous
/// and never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: Pos,
    pub end: Pos,
    pub kind: SegmentKind,
}

/// Append `[start, end)` to `segments`, extending the last segment when
/// it has the same kind and touches `start`.
pub(crate) fn push_segment(segments: &mut Vec<Segment>, start: Pos, end: Pos, kind: SegmentKind) {
    if start >= end {
        return;
    }
    if let Some(last) = segments.last_mut() {
        if last.kind == kind && last.end == start {
            last.end = end;
            return;
        }
    }
    segments.push(Segment { start, end, kind });
}

/// Drop everything at or after `offset`, cutting a straddling segment.
pub(crate) fn truncate_segments(segments: &mut Vec<Segment>, offset: Pos) {
    while let Some(last) = segments.last_mut() {
        if last.start >= offset {
            segments.pop();
        } else {
            if last.end > offset {
                last.end = offset;
            }
            break;
        }
    }
}
