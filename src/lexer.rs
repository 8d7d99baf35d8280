use compact_str::CompactString;
use log::{trace, warn};
use memchr::memchr;

use crate::diagnostic::{Closer, Diagnostic, Region};
use crate::dialect::{Dialect, EscapeRule, MarkerKind, QuoteStyle};
use crate::span::{push_segment, Pos, Segment, SegmentKind};
use crate::state::{Leading, Pending, PendingEnd, ScanState, StoredMode};

/// A point where one statement ends and the next may begin: just after a
/// top-level `;`, or after the newline ending a shell command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub end: Pos,
    /// The statement before the boundary is a shell command.
    pub command: bool,
    /// The statement before the boundary had non-comment content.
    pub content: bool,
}

/// Output of one `scan` call.
///
/// Segments cover `[start, end)`: `start` is where the previous state
/// stopped being final (the start of a token that was still undecided),
/// `end` is the total number of bytes consumed. A token still undecided at
/// `end` is classified as if the input ended there and is re-scanned by
/// the next call.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub(crate) start: Pos,
    pub(crate) state: ScanState,
    pub(crate) settled: ScanState,
    pub(crate) segments: Vec<Segment>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) boundaries: Vec<Boundary>,
}

impl ScanResult {
    /// State to pass to the next `scan` call for the same buffer.
    pub fn final_state(&self) -> &ScanState {
        &self.state
    }

    /// State as if the input ended here. This is what completion and
    /// forced termination look at.
    pub fn settled_state(&self) -> &ScanState {
        &self.settled
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn end(&self) -> Pos {
        self.state.offset
    }
}

/// Scan `new_text` as the continuation of a buffer in state `previous`.
///
/// Runs in time proportional to `new_text` plus the length of a token left
/// undecided by the previous call. Never fails: malformed input only
/// leaves the state incomplete or records diagnostics.
pub fn scan(previous: &ScanState, new_text: &str, dialect: &Dialect) -> ScanResult {
    let start = previous.painted;
    let mut machine = Machine::new(dialect, previous.clone());
    machine.run(new_text);
    let state = machine.state.clone();
    machine.settle();
    ScanResult {
        start,
        state,
        settled: machine.state,
        segments: machine.segments,
        diagnostics: machine.diagnostics,
        boundaries: machine.boundaries,
    }
}

/// Scan a complete text from a fresh state.
pub fn scan_str(text: &str, dialect: &Dialect) -> ScanResult {
    scan(&ScanState::new(), text, dialect)
}

/// Forced termination (end of a script file): report every region still
/// open in the settled state.
pub fn finish(result: &ScanResult) -> Vec<Diagnostic> {
    unterminated_regions(&result.settled)
}

pub(crate) fn unterminated_regions(state: &ScanState) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    match state.mode {
        StoredMode::Quoted(style) => {
            out.push(Diagnostic::unterminated(state.region_start, Region::Quote(style)));
        }
        StoredMode::BlockComment => {
            out.push(Diagnostic::unterminated(state.region_start, Region::BlockComment));
        }
        StoredMode::DollarBlock => {
            let tag = state.dollar_tag.clone().unwrap_or_default();
            out.push(Diagnostic::unterminated(state.region_start, Region::DollarBlock(tag)));
        }
        StoredMode::Default | StoredMode::LineComment => {}
    }
    for &offset in &state.proc_blocks {
        out.push(Diagnostic::unterminated(offset, Region::ProceduralBlock));
    }
    for &(open, offset) in &state.brackets {
        out.push(Diagnostic::unterminated(offset, Region::Bracket(open)));
    }
    out.sort_by_key(|d| d.offset);
    for diagnostic in &out {
        warn!("unterminated region: {}", diagnostic);
    }
    out
}

/// Length of the longest proper prefix of `prefix` that is also its suffix.
fn border(prefix: &[u8]) -> usize {
    (1..prefix.len())
        .rev()
        .find(|&j| prefix[..j] == prefix[prefix.len() - j..])
        .unwrap_or(0)
}

/// Advance a partial match of `marker` by one character. Returns the new
/// number of matched bytes; equal to `marker.len()` on a full match.
fn advance_match(marker: &[u8], matched: usize, c: char) -> usize {
    if !c.is_ascii() {
        return 0;
    }
    let b = c as u8;
    let mut k = matched;
    loop {
        if k < marker.len() && marker[k] == b {
            return k + 1;
        }
        if k == 0 {
            return 0;
        }
        k = border(&marker[..k]);
    }
}

/// Characters allowed in a dollar-quote tag.
#[inline]
fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// The character state machine. Owns a copy of the state for the duration
/// of one `scan` call.
struct Machine<'d> {
    dialect: &'d Dialect,
    state: ScanState,
    segments: Vec<Segment>,
    diagnostics: Vec<Diagnostic>,
    boundaries: Vec<Boundary>,
}

impl<'d> Machine<'d> {
    fn new(dialect: &'d Dialect, state: ScanState) -> Self {
        Self {
            dialect,
            state,
            segments: Vec::new(),
            diagnostics: Vec::new(),
            boundaries: Vec::new(),
        }
    }

    fn run(&mut self, text: &str) {
        let mut rest = text;
        while let Some(c) = rest.chars().next() {
            // Line comments are opaque up to the newline: skip them whole.
            if self.state.mode == StoredMode::LineComment {
                let n = memchr(b'\n', rest.as_bytes()).unwrap_or(rest.len());
                if n > 0 {
                    let run = &rest[..n];
                    self.state.offset += n;
                    self.paint(self.state.offset, SegmentKind::Comment);
                    self.state.prev_char = run.chars().next_back();
                    rest = &rest[n..];
                    continue;
                }
            }
            self.step(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    /// Paint `[painted, end)` with `kind`.
    fn paint(&mut self, end: Pos, kind: SegmentKind) {
        if end > self.state.painted {
            push_segment(&mut self.segments, self.state.painted, end, kind);
            self.state.painted = end;
        }
    }

    fn set_mode(&mut self, mode: StoredMode) {
        trace!("mode {:?} -> {:?} at {}", self.state.mode, mode, self.state.offset);
        self.state.mode = mode;
    }

    /// Record a significant character of SQL text.
    fn significant(&mut self, c: char) {
        self.state.last_significant = Some(c);
        self.state.has_content = true;
        self.state.statement_content = true;
        self.state.after_command = false;
        if self.state.leading == Leading::Blank {
            self.state.leading = Leading::Sql;
        }
    }

    fn cancel_end(&mut self) {
        self.state.pending_end = None;
    }

    fn step(&mut self, c: char) {
        let start = self.state.offset;
        let end = start + c.len_utf8();
        self.state.offset = end;

        if let Some(style) = self.state.reopen.take() {
            if c == style.close {
                // Doubled close char: the quote continues.
                self.set_mode(StoredMode::Quoted(style));
                self.paint(end, SegmentKind::Quoted(style.kind));
                self.state.prev_char = Some(c);
                return;
            }
        }

        match self.state.mode {
            StoredMode::Quoted(style) => self.step_quoted(style, c, end),
            StoredMode::LineComment => self.step_line_comment(c, end),
            StoredMode::BlockComment => self.step_block_comment(c, end),
            StoredMode::DollarBlock => self.step_dollar(c, end),
            StoredMode::Default => self.step_default(c, start, end),
        }
        self.state.prev_char = Some(c);
    }

    fn step_quoted(&mut self, style: QuoteStyle, c: char, end: Pos) {
        if self.state.pending_escape {
            self.state.pending_escape = false;
        } else if style.escape == EscapeRule::BackslashChar && c == '\\' {
            self.state.pending_escape = true;
        } else if c == style.close {
            self.set_mode(StoredMode::Default);
            if self.state.leading != Leading::Shell {
                self.state.last_significant = Some(c);
            }
            self.state.reopen = Some(style);
        }
        self.paint(end, SegmentKind::Quoted(style.kind));
    }

    fn step_line_comment(&mut self, c: char, end: Pos) {
        if c == '\n' {
            self.set_mode(StoredMode::Default);
            self.paint(end, SegmentKind::Text);
        } else {
            self.paint(end, SegmentKind::Comment);
        }
    }

    fn step_block_comment(&mut self, c: char, end: Pos) {
        self.paint(end, SegmentKind::Comment);
        let matched = advance_match(self.state.closer.as_bytes(), self.state.close_matched, c);
        let closed = matched == self.state.closer.len();
        self.state.close_matched = if closed { 0 } else { matched };

        let dialect = self.dialect;
        if let Some(block) = dialect.block_comment().filter(|b| b.nestable) {
            let opened = advance_match(block.open.as_bytes(), self.state.open_matched, c);
            if opened == block.open.len() && !closed {
                self.state.comment_depth += 1;
                self.state.open_matched = 0;
            } else {
                self.state.open_matched = if closed { 0 } else { opened };
            }
        }

        if closed {
            self.state.comment_depth = self.state.comment_depth.saturating_sub(1);
            if self.state.comment_depth == 0 {
                self.set_mode(StoredMode::Default);
            }
        }
    }

    fn step_dollar(&mut self, c: char, end: Pos) {
        self.paint(end, SegmentKind::Dollar);
        let matched = advance_match(self.state.closer.as_bytes(), self.state.close_matched, c);
        if matched == self.state.closer.len() {
            self.state.close_matched = 0;
            self.state.dollar_tag = None;
            self.set_mode(StoredMode::Default);
        } else {
            self.state.close_matched = matched;
        }
    }

    fn step_default(&mut self, c: char, start: Pos, end: Pos) {
        match std::mem::take(&mut self.state.pending) {
            Pending::None => {}
            Pending::Marker {
                start: marker_start,
                text,
            } => {
                self.continue_marker(marker_start, text, c, end);
                return;
            }
            Pending::Dollar {
                start: dollar_start,
                tag,
            } => {
                self.continue_dollar(dollar_start, tag, c, end);
                return;
            }
            Pending::Word {
                start: word_start,
                mut text,
                keyword_candidate,
            } => {
                if self.dialect.is_name_char(c) {
                    if keyword_candidate {
                        text.push(c);
                    }
                    self.state.pending = Pending::Word {
                        start: word_start,
                        text,
                        keyword_candidate,
                    };
                    return;
                }
                self.finish_word(word_start, &text, keyword_candidate, start);
            }
            Pending::Digits { start: digits_start } => {
                if c.is_ascii_digit() {
                    self.state.pending = Pending::Digits {
                        start: digits_start,
                    };
                    return;
                }
                if self.dialect.is_name_char(c) {
                    // `1abc` is a name, never a keyword.
                    self.state.pending = Pending::Word {
                        start: digits_start,
                        text: CompactString::default(),
                        keyword_candidate: false,
                    };
                    return;
                }
                self.finish_digits(start);
            }
            Pending::Command {
                start: command_start,
                mut name,
            } => {
                if self.dialect.is_name_char(c) {
                    name.push(c);
                    self.state.pending = Pending::Command {
                        start: command_start,
                        name,
                    };
                    return;
                }
                self.finish_command(&name, start);
            }
        }

        match self.state.leading {
            Leading::Blank => {
                if c.is_whitespace() {
                    self.paint(end, SegmentKind::Text);
                    return;
                }
                if c == self.dialect.command_prefix() {
                    self.state.pending = Pending::Command {
                        start,
                        name: CompactString::default(),
                    };
                    return;
                }
                if self.dialect.is_leading_comment(c) {
                    self.enter_marker(MarkerKind::LineComment, "#", start, end);
                    return;
                }
            }
            Leading::Shell => {
                self.step_shell(c, start, end);
                return;
            }
            Leading::Sql => {}
        }

        if self.dialect.starts_marker(c) {
            let mut buf = [0u8; 4];
            let text = c.encode_utf8(&mut buf);
            if let Some((kind, marker)) = self.exact_marker(text) {
                self.enter_marker(kind, marker, start, end);
            } else {
                self.state.pending = Pending::Marker {
                    start,
                    text: CompactString::from(&*text),
                };
            }
            return;
        }

        if c == '$' && self.dialect.dollar_quoting() {
            self.state.pending = Pending::Dollar {
                start,
                tag: CompactString::default(),
            };
            return;
        }

        self.step_plain(c, start, end);
    }

    /// Default-mode rules after comment markers and dollar quotes.
    fn step_plain(&mut self, c: char, start: Pos, end: Pos) {
        if let Some(style) = self.dialect.quote_for_open(c) {
            self.cancel_end();
            self.significant(c);
            self.state.region_start = start;
            self.state.pending_escape = false;
            self.set_mode(StoredMode::Quoted(style));
            self.paint(end, SegmentKind::Quoted(style.kind));
            return;
        }

        if self.dialect.is_bracket_open(c) {
            self.cancel_end();
            self.significant(c);
            self.state.brackets.push((c, start));
            self.paint(end, SegmentKind::Text);
            return;
        }

        if self.dialect.bracket_opener(c).is_some() {
            self.cancel_end();
            self.significant(c);
            // Any closer pops the innermost bracket, as with a plain depth count.
            if self.state.brackets.pop().is_none() {
                self.diagnostics
                    .push(Diagnostic::unmatched(start, Closer::Bracket(c)));
            }
            self.paint(end, SegmentKind::Text);
            return;
        }

        if self.dialect.is_name_start(c) {
            let keyword_candidate = self.state.prev_char != Some('.');
            let mut text = CompactString::default();
            if keyword_candidate {
                text.push(c);
            }
            self.state.pending = Pending::Word {
                start,
                text,
                keyword_candidate,
            };
            return;
        }

        if c.is_ascii_digit() {
            self.state.pending = Pending::Digits { start };
            return;
        }

        if c.is_whitespace() {
            self.paint(end, SegmentKind::Text);
            return;
        }

        if c == ';' {
            self.terminator(end);
            return;
        }

        self.cancel_end();
        self.significant(c);
        self.paint(end, SegmentKind::Text);
    }

    /// `;` in default mode: closes a pending procedural `end` and marks a
    /// statement boundary when nothing else is open.
    fn terminator(&mut self, end: Pos) {
        let content = self.state.statement_content;
        self.significant(';');
        if let Some(pending_end) = self.state.pending_end.take() {
            self.state.prelude_open = false;
            if self.state.proc_blocks.pop().is_none() {
                let keyword = self
                    .dialect
                    .procedural_block()
                    .map(|b| CompactString::from(b.end_keyword()))
                    .unwrap_or_default();
                self.diagnostics.push(Diagnostic::unmatched(
                    pending_end.offset,
                    Closer::Keyword(keyword),
                ));
            }
        }
        self.paint(end, SegmentKind::Text);
        if self.state.brackets.is_empty() && self.state.proc_blocks.is_empty() {
            self.boundary(end, false, content);
        }
    }

    fn boundary(&mut self, end: Pos, command: bool, content: bool) {
        self.boundaries.push(Boundary {
            end,
            command,
            content,
        });
        self.state.statement_content = false;
        self.state.after_command = command;
        self.state.leading = Leading::Blank;
    }

    /// Shell command text: only quotes are tracked, a newline ends it.
    fn step_shell(&mut self, c: char, start: Pos, end: Pos) {
        if let Some(style) = self.dialect.quote_for_open(c) {
            self.state.region_start = start;
            self.state.pending_escape = false;
            self.set_mode(StoredMode::Quoted(style));
            self.paint(end, SegmentKind::Quoted(style.kind));
            return;
        }
        self.paint(end, SegmentKind::Text);
        if c == '\n' {
            self.boundary(end, true, true);
        }
    }

    fn exact_marker(&self, text: &str) -> Option<(MarkerKind, &'d str)> {
        let dialect = self.dialect;
        dialect
            .markers()
            .iter()
            .find(|(_, m)| m == text)
            .map(|(kind, m)| (*kind, m.as_str()))
    }

    fn is_marker_prefix(&self, text: &str) -> bool {
        self.dialect
            .markers()
            .iter()
            .any(|(_, m)| m.len() > text.len() && m.starts_with(text))
    }

    fn enter_marker(&mut self, kind: MarkerKind, marker: &str, start: Pos, end: Pos) {
        self.state.region_start = start;
        self.paint(end, SegmentKind::Comment);
        match kind {
            // A marker ending in a newline (`--\n`) is a whole comment.
            MarkerKind::LineComment if marker.ends_with('\n') => {}
            MarkerKind::LineComment => self.set_mode(StoredMode::LineComment),
            MarkerKind::BlockComment => {
                let close = self
                    .dialect
                    .block_comment()
                    .map(|b| b.close.as_str())
                    .unwrap_or("*/");
                self.state.closer = CompactString::from(close);
                self.state.close_matched = 0;
                self.state.open_matched = 0;
                self.state.comment_depth = 1;
                self.set_mode(StoredMode::BlockComment);
            }
        }
    }

    fn continue_marker(&mut self, start: Pos, mut text: CompactString, c: char, end: Pos) {
        text.push(c);
        if let Some((kind, marker)) = self.exact_marker(&text) {
            self.enter_marker(kind, marker, start, end);
        } else if self.is_marker_prefix(&text) {
            self.state.pending = Pending::Marker { start, text };
        } else {
            self.replay(start, &text);
        }
    }

    fn continue_dollar(&mut self, start: Pos, mut tag: CompactString, c: char, end: Pos) {
        if c == '$' {
            self.cancel_end();
            self.significant('$');
            self.state.region_start = start;
            self.state.closer = CompactString::from("$");
            self.state.closer.push_str(&tag);
            self.state.closer.push('$');
            self.state.close_matched = 0;
            self.state.dollar_tag = Some(tag);
            self.set_mode(StoredMode::DollarBlock);
            self.paint(end, SegmentKind::Dollar);
        } else if is_tag_char(c) && !(tag.is_empty() && c.is_ascii_digit()) {
            tag.push(c);
            self.state.pending = Pending::Dollar { start, tag };
        } else {
            let mut text = CompactString::from("$");
            text.push_str(&tag);
            text.push(c);
            self.replay(start, &text);
        }
    }

    /// A pending marker or dollar prefix turned out to be plain text:
    /// take its first character literally and re-scan the rest.
    fn replay(&mut self, start: Pos, text: &str) {
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return;
        };
        let first_end = start + first.len_utf8();
        self.state.offset = first_end;
        self.step_plain(first, start, first_end);
        self.state.prev_char = Some(first);
        for c in chars {
            self.step(c);
        }
    }

    fn finish_word(&mut self, start: Pos, text: &str, keyword_candidate: bool, end: Pos) {
        let keyword = keyword_candidate && self.dialect.is_keyword(text);
        let kind = if keyword {
            SegmentKind::Keyword
        } else {
            SegmentKind::Text
        };
        self.paint(end, kind);
        if let Some(last) = self.state.prev_char {
            self.significant(last);
        }

        if !keyword_candidate {
            self.cancel_end();
            return;
        }
        let dialect = self.dialect;
        let Some(block) = dialect.procedural_block() else {
            return;
        };

        if let Some(pending_end) = self.state.pending_end {
            if block.is_compound_suffix(text) {
                // `end loop`, `end if`: closes an inner statement.
                self.cancel_end();
                return;
            }
            if !keyword && !pending_end.labelled {
                self.state.pending_end = Some(PendingEnd {
                    labelled: true,
                    ..pending_end
                });
                return;
            }
            self.cancel_end();
        }

        if block.is_prelude(text) {
            self.state.proc_blocks.push(start);
            self.state.prelude_open = true;
        } else if block.is_start(text) {
            if self.state.prelude_open {
                // `declare ... begin`: the body of the open block.
                self.state.prelude_open = false;
            } else {
                self.state.proc_blocks.push(start);
            }
        } else if block.is_end(text) {
            self.state.pending_end = Some(PendingEnd {
                offset: start,
                labelled: false,
            });
        }
    }

    fn finish_digits(&mut self, end: Pos) {
        self.paint(end, SegmentKind::Number);
        self.cancel_end();
        if let Some(last) = self.state.prev_char {
            self.significant(last);
        }
    }

    fn finish_command(&mut self, name: &str, end: Pos) {
        self.paint(end, SegmentKind::Command);
        self.state.has_content = true;
        self.state.statement_content = true;
        self.state.after_command = false;
        self.state.last_significant = self.state.prev_char;
        self.state.leading = if self.dialect.is_sql_command(name) {
            Leading::Sql
        } else {
            Leading::Shell
        };
        trace!("command {:?} -> {:?}", name, self.state.leading);
    }

    /// Resolve an undecided trailing token as if the input ended here.
    fn settle(&mut self) {
        let end = self.state.offset;
        self.state.reopen = None;
        match std::mem::take(&mut self.state.pending) {
            Pending::None => {}
            Pending::Marker { text, .. } => self.settle_plain(&text, end),
            Pending::Dollar { tag, .. } => {
                let mut text = CompactString::from("$");
                text.push_str(&tag);
                self.settle_plain(&text, end);
            }
            Pending::Word {
                start,
                text,
                keyword_candidate,
            } => self.finish_word(start, &text, keyword_candidate, end),
            Pending::Digits { .. } => self.finish_digits(end),
            Pending::Command { name, .. } => self.finish_command(&name, end),
        }
    }

    fn settle_plain(&mut self, text: &str, end: Pos) {
        self.paint(end, SegmentKind::Text);
        self.cancel_end();
        if let Some(last) = text.chars().rev().find(|c| !c.is_whitespace()) {
            self.significant(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Mode;
    use pretty_assertions::assert_eq;

    fn kinds(result: &ScanResult, text: &str) -> Vec<(String, SegmentKind)> {
        result
            .segments()
            .iter()
            .map(|s| (text[s.start..s.end].to_string(), s.kind))
            .collect()
    }

    /// Scan `text` split at every character, carrying the state along.
    fn scan_per_char(text: &str, dialect: &Dialect) -> (ScanState, Vec<Segment>) {
        let mut state = ScanState::new();
        let mut segments: Vec<Segment> = Vec::new();
        for (i, c) in text.char_indices() {
            let result = scan(&state, &text[i..i + c.len_utf8()], dialect);
            crate::span::truncate_segments(&mut segments, result.start());
            for seg in result.segments() {
                push_segment(&mut segments, seg.start, seg.end, seg.kind);
            }
            state = result.final_state().clone();
        }
        (state, segments)
    }

    #[test]
    fn test_border_and_advance_match() {
        assert_eq!(border(b"abab"), 2);
        assert_eq!(border(b"*/"), 0);
        assert_eq!(advance_match(b"*/", 0, '*'), 1);
        assert_eq!(advance_match(b"*/", 1, '*'), 1);
        assert_eq!(advance_match(b"*/", 1, '/'), 2);
        assert_eq!(advance_match(b"$a$", 1, '$'), 1);
        assert_eq!(advance_match(b"$a$", 2, '$'), 3);
        assert_eq!(advance_match(b"$a$", 2, 'é'), 0);
    }

    #[test]
    fn test_segments_classify_simple_select() {
        let dialect = Dialect::ansi();
        let text = "select 'a', \"b\" from t -- done\n";
        let result = scan_str(text, &dialect);
        assert_eq!(
            kinds(&result, text),
            vec![
                ("select".to_string(), SegmentKind::Keyword),
                (" ".to_string(), SegmentKind::Text),
                ("'a'".to_string(), SegmentKind::Quoted(crate::dialect::QuoteKind::Literal)),
                (", ".to_string(), SegmentKind::Text),
                ("\"b\"".to_string(), SegmentKind::Quoted(crate::dialect::QuoteKind::Identifier)),
                (" ".to_string(), SegmentKind::Text),
                ("from".to_string(), SegmentKind::Keyword),
                (" t ".to_string(), SegmentKind::Text),
                ("-- done".to_string(), SegmentKind::Comment),
                ("\n".to_string(), SegmentKind::Text),
            ]
        );
    }

    #[test]
    fn test_quote_modes_and_escapes() {
        let dialect = Dialect::ansi();
        let result = scan_str("select 'it''s", &dialect);
        assert!(matches!(result.settled_state().mode(), Mode::Quoted(_)));

        let result = scan_str("select 'it''s'", &dialect);
        assert_eq!(result.settled_state().mode(), Mode::Default);

        let mysql = Dialect::mysql();
        let result = scan_str("select 'it\\'s", &mysql);
        assert!(matches!(result.settled_state().mode(), Mode::Quoted(_)));
        let result = scan_str("select 'it\\'s'", &mysql);
        assert_eq!(result.settled_state().mode(), Mode::Default);
        let result = scan_str("select 'ends with \\", &mysql);
        assert!(result.settled_state().pending_escape());
    }

    #[test]
    fn test_bracket_quote_doubled_close() {
        let dialect = Dialect::sqlserver();
        let text = "select [a]]b] from t";
        let result = scan_str(text, &dialect);
        assert_eq!(result.settled_state().mode(), Mode::Default);
        assert_eq!(result.settled_state().bracket_depth(), 0);
        assert!(result.diagnostics().is_empty());
        assert!(kinds(&result, text).contains(&(
            "[a]]b]".to_string(),
            SegmentKind::Quoted(crate::dialect::QuoteKind::Identifier)
        )));
    }

    #[test]
    fn test_unmatched_closer_does_not_go_negative() {
        let dialect = Dialect::ansi();
        let result = scan_str("select 1) + (2", &dialect);
        assert_eq!(result.settled_state().bracket_depth(), 1);
        assert_eq!(result.diagnostics().len(), 1);
        assert_eq!(result.diagnostics()[0].offset, 8);
    }

    #[test]
    fn test_block_comment_does_not_nest_by_default() {
        let dialect = Dialect::ansi();
        let result = scan_str("/* a /* b */ c", &dialect);
        assert_eq!(result.settled_state().mode(), Mode::Default);

        let nesting = Dialect::builder("nesting")
            .block_comment(Some(crate::dialect::BlockComment {
                open: "/*".to_string(),
                close: "*/".to_string(),
                nestable: true,
            }))
            .build()
            .unwrap();
        let result = scan_str("/* a /* b */ c", &nesting);
        assert_eq!(result.settled_state().mode(), Mode::BlockComment);
        let result = scan_str("/* a /* b */ c */", &nesting);
        assert_eq!(result.settled_state().mode(), Mode::Default);
    }

    #[test]
    fn test_slash_star_slash_is_still_open() {
        let dialect = Dialect::ansi();
        let result = scan_str("select /*/;", &dialect);
        assert_eq!(result.settled_state().mode(), Mode::BlockComment);
    }

    #[test]
    fn test_mysql_dash_comment_needs_space() {
        let mysql = Dialect::mysql();
        let result = scan_str("select 1 --x", &mysql);
        assert_eq!(result.settled_state().mode(), Mode::Default);
        assert_eq!(result.settled_state().last_significant_char(), Some('x'));

        let result = scan_str("select 1 -- x", &mysql);
        assert_eq!(result.settled_state().mode(), Mode::LineComment);
        assert_eq!(result.settled_state().last_significant_char(), Some('1'));

        let result = scan_str("select 1 # x", &mysql);
        assert_eq!(result.settled_state().mode(), Mode::LineComment);
    }

    #[test]
    fn test_leading_hash_is_comment_in_every_dialect() {
        let dialect = Dialect::ansi();
        let text = "  #select '1\nselect 1 # x";
        let result = scan_str(text, &dialect);
        assert_eq!(
            kinds(&result, text)[..4].to_vec(),
            vec![
                ("  ".to_string(), SegmentKind::Text),
                ("#select '1".to_string(), SegmentKind::Comment),
                ("\n".to_string(), SegmentKind::Text),
                ("select".to_string(), SegmentKind::Keyword),
            ]
        );
        // Past the start of a statement `#` is plain text.
        assert_eq!(result.settled_state().mode(), Mode::Default);
        assert_eq!(result.settled_state().last_significant_char(), Some('x'));

        let result = scan_str("select 1; #x", &dialect);
        assert_eq!(result.settled_state().mode(), Mode::LineComment);
    }

    #[test]
    fn test_dollar_block_tag_must_match_exactly() {
        let pg = Dialect::postgresql();
        let result = scan_str("$AbCd$ x $Abcd$;", &pg);
        assert_eq!(result.settled_state().mode(), Mode::DollarBlock);
        assert_eq!(result.settled_state().dollar_tag(), Some("AbCd"));

        let result = scan_str("$AbCd$ x $AbCd$;", &pg);
        assert_eq!(result.settled_state().mode(), Mode::Default);
        assert_eq!(result.settled_state().dollar_tag(), None);

        let result = scan_str("select $1, a$b$c", &pg);
        assert_eq!(result.settled_state().mode(), Mode::Default);
    }

    #[test]
    fn test_dollar_is_plain_without_dollar_quoting() {
        let dialect = Dialect::ansi();
        let result = scan_str("$x$ ;", &dialect);
        assert_eq!(result.settled_state().mode(), Mode::Default);
        assert_eq!(result.boundaries().len(), 1);
    }

    #[test]
    fn test_procedural_block_depth() {
        let oracle = Dialect::oracle();
        let result = scan_str("begin null;", &oracle);
        assert_eq!(result.settled_state().proc_block_depth(), 1);
        assert_eq!(result.settled_state().mode(), Mode::ProceduralBlock);

        let result = scan_str("begin loop null; end loop; end my_block;", &oracle);
        assert_eq!(result.settled_state().proc_block_depth(), 0);
        assert!(result.diagnostics().is_empty());

        let result = scan_str("declare x number := 1; begin null; end;", &oracle);
        assert_eq!(result.settled_state().proc_block_depth(), 0);
        assert_eq!(result.boundaries().len(), 1);
        let result = scan_str("declare x number;", &oracle);
        assert_eq!(result.settled_state().proc_block_depth(), 1);

        let result = scan_str("end;", &oracle);
        assert_eq!(result.settled_state().proc_block_depth(), 0);
        assert_eq!(result.diagnostics().len(), 1);
    }

    #[test]
    fn test_keyword_after_dot_is_a_name() {
        let dialect = Dialect::ansi();
        let text = "t.select";
        let result = scan_str(text, &dialect);
        assert_eq!(
            kinds(&result, text),
            vec![("t.select".to_string(), SegmentKind::Text)]
        );
    }

    #[test]
    fn test_digits_glued_to_letters_are_names() {
        let dialect = Dialect::ansi();
        let text = "1abc 42";
        let result = scan_str(text, &dialect);
        assert_eq!(
            kinds(&result, text),
            vec![
                ("1abc ".to_string(), SegmentKind::Text),
                ("42".to_string(), SegmentKind::Number),
            ]
        );
    }

    #[test]
    fn test_command_prefix() {
        let dialect = Dialect::ansi();
        let text = "!set color 'x;'";
        let result = scan_str(text, &dialect);
        assert!(result.settled_state().is_shell_command());
        assert_eq!(kinds(&result, text)[0], ("!set".to_string(), SegmentKind::Command));

        let result = scan_str("!sql select 1", &dialect);
        assert!(!result.settled_state().is_shell_command());
    }

    #[test]
    fn test_boundaries() {
        let dialect = Dialect::ansi();
        let result = scan_str("select 1; select (2;); -- x\n;", &dialect);
        let ends: Vec<Pos> = result.boundaries().iter().map(|b| b.end).collect();
        assert_eq!(ends, vec![9, 22, 29]);
        assert!(result.boundaries()[0].content);
        assert!(!result.boundaries()[2].content);
    }

    #[test]
    fn test_finish_reports_open_regions() {
        let dialect = Dialect::ansi();
        let result = scan_str("select (1, 'abc", &dialect);
        let diagnostics = finish(&result);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].offset, 7);
        assert_eq!(diagnostics[1].offset, 11);
        assert!(diagnostics.iter().all(|d| d.is_unterminated()));

        let result = scan_str("select 1 -- open line comment", &dialect);
        assert!(finish(&result).is_empty());
    }

    #[test]
    fn test_split_feeds_match_whole_scan() {
        let cases: Vec<(&str, Dialect)> = vec![
            ("select 'it''s', \"x\"\"y\" -- c\n/* b */ f(1, [2]);", Dialect::ansi()),
            ("select 1 -- x\n-", Dialect::mysql()),
            ("select `a``b`, '\\'' # c\n--\n;", Dialect::mysql()),
            ("$fn$ body ; ' -- $fn$; select $1", Dialect::postgresql()),
            ("begin loop x; end loop; end lbl;", Dialect::oracle()),
            ("select [a]]b] // c\n;", Dialect::sqlserver()),
            ("!set x 'y'\nselect 1;", Dialect::ansi()),
            ("select 'héllo' from tãble;", Dialect::ansi()),
        ];
        for (text, dialect) in &cases {
            let whole = scan_str(text, dialect);
            let (state, segments) = scan_per_char(text, dialect);
            assert_eq!(&state, whole.final_state(), "state for {:?}", text);
            assert_eq!(segments, whole.segments().to_vec(), "segments for {:?}", text);
        }
    }
}
