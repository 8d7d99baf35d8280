use log::debug;

use crate::dialect::QuoteKind;
use crate::lexer::ScanResult;
use crate::span::{Category, Pos, Segment, SegmentKind, Span};

/// Display category for a scanner segment.
pub fn category(kind: SegmentKind) -> Category {
    match kind {
        SegmentKind::Text => Category::Default,
        SegmentKind::Keyword => Category::Keyword,
        SegmentKind::Number => Category::Number,
        SegmentKind::Command => Category::Command,
        SegmentKind::Quoted(QuoteKind::Literal) => Category::SingleQuote,
        SegmentKind::Quoted(QuoteKind::Identifier) => Category::IdentifierQuote,
        SegmentKind::Comment | SegmentKind::Dollar => Category::Comment,
    }
}

/// Spans covering everything `result` scanned, `[start, end)`.
///
/// Adjacent spans of the same category are merged. Never fails: if the
/// segment stream has a gap or overlap, the rest is `Default`.
pub fn highlight_spans(result: &ScanResult) -> Vec<Span> {
    highlight_segments(result.segments(), result.start(), result.end())
}

pub fn highlight_segments(segments: &[Segment], start: Pos, end: Pos) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::with_capacity(segments.len());
    let mut cursor = start;
    for segment in segments {
        if segment.start != cursor || segment.end <= segment.start || segment.end > end {
            debug!(
                "inconsistent segment {:?} at {}, rest is default",
                segment, cursor
            );
            break;
        }
        push_span(&mut spans, segment.start, segment.end, category(segment.kind));
        cursor = segment.end;
    }
    if cursor < end {
        push_span(&mut spans, cursor, end, Category::Default);
    }
    spans
}

fn push_span(spans: &mut Vec<Span>, start: Pos, end: Pos, category: Category) {
    if let Some(last) = spans.last_mut() {
        if last.category == category && last.end == start {
            last.end = end;
            return;
        }
    }
    spans.push(Span::new(start, end, category));
}
