use std::collections::HashSet;

use log::debug;
use smallvec::{smallvec, SmallVec};

use crate::error::{DialectError, ScanlineError};
use crate::keywords;

/// How a quote style lets its own close character appear inside the quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscapeRule {
    /// `'it''s'`: the close character written twice is a literal.
    DoubledChar,
    /// `'it\'s'`: a backslash makes the next character literal. Doubling
    /// the close character works as well.
    BackslashChar,
}

/// What a quoted region denotes. Drives the highlight category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteKind {
    /// String literal (`'...'`).
    Literal,
    /// Quoted identifier (`"..."`, `` `...` ``, `[...]`).
    Identifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuoteStyle {
    pub open: char,
    pub close: char,
    pub escape: EscapeRule,
    pub kind: QuoteKind,
}

impl QuoteStyle {
    pub const fn new(open: char, close: char, escape: EscapeRule, kind: QuoteKind) -> Self {
        Self {
            open,
            close,
            escape,
            kind,
        }
    }

    /// Same open and close character, doubled-char escaping.
    pub const fn symmetric(quote: char, kind: QuoteKind) -> Self {
        Self::new(quote, quote, EscapeRule::DoubledChar, kind)
    }

    pub const fn with_escape(mut self, escape: EscapeRule) -> Self {
        self.escape = escape;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockComment {
    pub open: String,
    pub close: String,
    /// Whether `/* /* */ */` needs two closers. Off for every built-in dialect.
    pub nestable: bool,
}

impl Default for BlockComment {
    fn default() -> Self {
        Self {
            open: "/*".to_string(),
            close: "*/".to_string(),
            nestable: false,
        }
    }
}

/// BEGIN/END-style procedural block keywords (PL/SQL).
///
/// `end` only closes a block when the next token is `;` (optionally after
/// a label). `end loop`, `end if` and the other compound suffixes close an
/// inner statement instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProceduralBlock {
    start_keywords: Vec<String>,
    end_keyword: String,
    compound_suffixes: Vec<String>,
    /// `declare`: opens a block whose next start keyword is its body.
    prelude_keywords: Vec<String>,
}

impl ProceduralBlock {
    pub fn new(start_keywords: &[&str], end_keyword: &str, compound_suffixes: &[&str]) -> Self {
        Self {
            start_keywords: start_keywords.iter().map(|s| s.to_lowercase()).collect(),
            end_keyword: end_keyword.to_lowercase(),
            compound_suffixes: compound_suffixes.iter().map(|s| s.to_lowercase()).collect(),
            prelude_keywords: Vec::new(),
        }
    }

    pub fn with_prelude(mut self, keywords: &[&str]) -> Self {
        self.prelude_keywords = keywords.iter().map(|s| s.to_lowercase()).collect();
        self
    }

    pub fn is_prelude(&self, word: &str) -> bool {
        self.prelude_keywords
            .iter()
            .any(|k| k.eq_ignore_ascii_case(word))
    }

    pub fn is_start(&self, word: &str) -> bool {
        self.start_keywords
            .iter()
            .any(|k| k.eq_ignore_ascii_case(word))
    }

    pub fn is_end(&self, word: &str) -> bool {
        self.end_keyword.eq_ignore_ascii_case(word)
    }

    pub fn is_compound_suffix(&self, word: &str) -> bool {
        self.compound_suffixes
            .iter()
            .any(|k| k.eq_ignore_ascii_case(word))
    }

    pub fn end_keyword(&self) -> &str {
        &self.end_keyword
    }
}

/// Which region a comment marker opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    LineComment,
    BlockComment,
}

/// Immutable lexical conventions of one database. One dialect is active
/// per connection; the scanner never mutates it.
#[derive(Debug, Clone)]
pub struct Dialect {
    name: String,
    quote_styles: SmallVec<[QuoteStyle; 4]>,
    line_comment_markers: Vec<String>,
    block_comment: Option<BlockComment>,
    dollar_quoting: bool,
    procedural_block: Option<ProceduralBlock>,
    /// Upper-cased keywords on top of the built-in table.
    extra_keywords: HashSet<String>,
    brackets: SmallVec<[(char, char); 2]>,
    extra_name_chars: SmallVec<[char; 2]>,
    command_prefix: char,
    /// Shell-style `#`: a comment when it starts a statement.
    leading_comment: Option<char>,
    sql_commands: Vec<String>,
    /// Line markers followed by the block opener, in match priority order.
    markers: Vec<(MarkerKind, String)>,
}

impl Dialect {
    pub fn builder(name: &str) -> DialectBuilder {
        DialectBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quote_styles(&self) -> &[QuoteStyle] {
        &self.quote_styles
    }

    /// The quote style opened by `c`, if any.
    #[inline]
    pub fn quote_for_open(&self, c: char) -> Option<QuoteStyle> {
        self.quote_styles.iter().copied().find(|q| q.open == c)
    }

    pub fn line_comment_markers(&self) -> &[String] {
        &self.line_comment_markers
    }

    pub fn block_comment(&self) -> Option<&BlockComment> {
        self.block_comment.as_ref()
    }

    pub fn dollar_quoting(&self) -> bool {
        self.dollar_quoting
    }

    pub fn procedural_block(&self) -> Option<&ProceduralBlock> {
        self.procedural_block.as_ref()
    }

    /// Case-insensitive keyword lookup: built-in table plus dialect extras.
    pub fn is_keyword(&self, word: &str) -> bool {
        if keywords::is_sql_keyword(word) {
            return true;
        }
        !self.extra_keywords.is_empty() && self.extra_keywords.contains(&word.to_uppercase())
    }

    pub fn brackets(&self) -> &[(char, char)] {
        &self.brackets
    }

    #[inline]
    pub fn is_bracket_open(&self, c: char) -> bool {
        self.brackets.iter().any(|&(open, _)| open == c)
    }

    /// For a closing bracket, the opener it pairs with.
    #[inline]
    pub fn bracket_opener(&self, c: char) -> Option<char> {
        self.brackets
            .iter()
            .find(|&&(_, close)| close == c)
            .map(|&(open, _)| open)
    }

    #[inline]
    pub fn is_name_start(&self, c: char) -> bool {
        c.is_alphabetic() || c == '_' || self.extra_name_chars.contains(&c)
    }

    #[inline]
    pub fn is_name_char(&self, c: char) -> bool {
        c.is_alphanumeric() || c == '_' || self.extra_name_chars.contains(&c)
    }

    pub fn command_prefix(&self) -> char {
        self.command_prefix
    }

    pub fn with_command_prefix(mut self, prefix: char) -> Self {
        self.command_prefix = prefix;
        self
    }

    /// Whether `c` opens a line comment when nothing but whitespace and
    /// comments precede it in the statement.
    #[inline]
    pub fn is_leading_comment(&self, c: char) -> bool {
        self.leading_comment == Some(c)
    }

    /// Whether a shell command carries SQL (`!sql`, `!all`, `!call`).
    pub fn is_sql_command(&self, name: &str) -> bool {
        self.sql_commands
            .iter()
            .any(|c| c.eq_ignore_ascii_case(name))
    }

    pub(crate) fn markers(&self) -> &[(MarkerKind, String)] {
        &self.markers
    }

    /// Whether any comment marker begins with `c`.
    #[inline]
    pub(crate) fn starts_marker(&self, c: char) -> bool {
        c.is_ascii() && self.markers.iter().any(|(_, m)| m.as_bytes()[0] == c as u8)
    }

    /// ANSI default. Behaves like Oracle and PostgreSQL for quoting and
    /// comments; backticks are accepted as identifier quotes.
    pub fn ansi() -> Self {
        Self::builder("default").build_builtin()
    }

    pub fn postgresql() -> Self {
        Self::builder("PostgreSQL")
            .dollar_quoting(true)
            .extra_name_chars(&['$'])
            .keywords(&["ILIKE", "RETURNING", "ANALYZE", "VACUUM", "LISTEN", "NOTIFY"])
            .build_builtin()
    }

    pub fn oracle() -> Self {
        Self::builder("Oracle")
            .procedural_block(ProceduralBlock::new(
                &["begin"],
                "end",
                &["loop", "if", "case", "while", "for"],
            )
            .with_prelude(&["declare"]))
            .keywords(&["EXCEPTION", "ELSIF", "PRAGMA", "RAISE", "DUAL", "ROWNUM"])
            .build_builtin()
    }

    pub fn mysql() -> Self {
        Self::builder("MySQL")
            .quote_styles(&[
                QuoteStyle::symmetric('\'', QuoteKind::Literal).with_escape(EscapeRule::BackslashChar),
                QuoteStyle::symmetric('"', QuoteKind::Literal).with_escape(EscapeRule::BackslashChar),
                QuoteStyle::symmetric('`', QuoteKind::Identifier),
            ])
            .line_comment_markers(&["-- ", "--\t", "--\n", "#"])
            .extra_name_chars(&['@'])
            .keywords(&["SHOW", "USE", "DATABASES", "TABLES", "ENGINE", "AUTO_INCREMENT"])
            .build_builtin()
    }

    pub fn h2() -> Self {
        Self::builder("H2")
            .line_comment_markers(&["--", "//"])
            .build_builtin()
    }

    pub fn phoenix() -> Self {
        Self::builder("Phoenix")
            .line_comment_markers(&["--", "//"])
            .keywords(&["UPSERT"])
            .build_builtin()
    }

    pub fn sqlserver() -> Self {
        Self::builder("Microsoft SQL Server")
            .quote_styles(&[
                QuoteStyle::symmetric('\'', QuoteKind::Literal).with_escape(EscapeRule::BackslashChar),
                QuoteStyle::symmetric('"', QuoteKind::Identifier).with_escape(EscapeRule::BackslashChar),
                QuoteStyle::new('[', ']', EscapeRule::DoubledChar, QuoteKind::Identifier),
            ])
            .brackets(&[('(', ')')])
            .keywords(&["TOP", "NOLOCK", "IDENTITY_INSERT"])
            .build_builtin()
    }

    /// Finds the built-in dialect whose product name is a case-insensitive
    /// prefix of `product_name` (a JDBC-style `"PostgreSQL 15.2"` matches
    /// PostgreSQL). Falls back to the ANSI default, never fails.
    pub fn from_product_name(product_name: &str) -> Self {
        let lower = product_name.to_ascii_lowercase();
        let found = builtins()
            .into_iter()
            .skip(1)
            .find(|d| lower.starts_with(&d.name.to_ascii_lowercase()));
        let dialect = found.unwrap_or_else(Dialect::ansi);
        debug!(
            "resolved dialect {:?} for product name {:?}",
            dialect.name, product_name
        );
        dialect
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::ansi()
    }
}

/// Every built-in dialect, default first.
pub fn builtins() -> Vec<Dialect> {
    vec![
        Dialect::ansi(),
        Dialect::postgresql(),
        Dialect::oracle(),
        Dialect::mysql(),
        Dialect::h2(),
        Dialect::phoenix(),
        Dialect::sqlserver(),
    ]
}

/// Create a built-in dialect from its short name.
pub fn dialect_from_name(name: &str) -> Result<Dialect, ScanlineError> {
    let dialect = match name.to_ascii_lowercase().as_str() {
        "default" | "ansi" => Dialect::ansi(),
        "postgresql" | "postgres" => Dialect::postgresql(),
        "oracle" => Dialect::oracle(),
        "mysql" | "mariadb" => Dialect::mysql(),
        "h2" => Dialect::h2(),
        "phoenix" => Dialect::phoenix(),
        "sqlserver" | "mssql" => Dialect::sqlserver(),
        _ => return Err(ScanlineError::Config(format!("Unknown dialect: {}", name))),
    };
    debug!("resolved dialect {:?} for name {:?}", dialect.name, name);
    Ok(dialect)
}

/// Builds and validates a `Dialect`. Starts from the ANSI defaults.
#[derive(Debug, Clone)]
pub struct DialectBuilder {
    name: String,
    quote_styles: SmallVec<[QuoteStyle; 4]>,
    line_comment_markers: Vec<String>,
    block_comment: Option<BlockComment>,
    dollar_quoting: bool,
    procedural_block: Option<ProceduralBlock>,
    extra_keywords: HashSet<String>,
    brackets: SmallVec<[(char, char); 2]>,
    extra_name_chars: SmallVec<[char; 2]>,
    command_prefix: char,
    leading_comment: Option<char>,
    sql_commands: Vec<String>,
}

impl DialectBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            quote_styles: smallvec![
                QuoteStyle::symmetric('\'', QuoteKind::Literal).with_escape(EscapeRule::BackslashChar),
                QuoteStyle::symmetric('"', QuoteKind::Identifier).with_escape(EscapeRule::BackslashChar),
                QuoteStyle::symmetric('`', QuoteKind::Identifier).with_escape(EscapeRule::BackslashChar),
            ],
            line_comment_markers: vec!["--".to_string()],
            block_comment: Some(BlockComment::default()),
            dollar_quoting: false,
            procedural_block: None,
            extra_keywords: HashSet::new(),
            brackets: smallvec![('(', ')'), ('[', ']')],
            extra_name_chars: SmallVec::new(),
            command_prefix: '!',
            leading_comment: Some('#'),
            sql_commands: vec!["sql".to_string(), "all".to_string(), "call".to_string()],
        }
    }

    pub fn quote_styles(mut self, styles: &[QuoteStyle]) -> Self {
        self.quote_styles = styles.iter().copied().collect();
        self
    }

    pub fn line_comment_markers(mut self, markers: &[&str]) -> Self {
        self.line_comment_markers = markers.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn block_comment(mut self, block: Option<BlockComment>) -> Self {
        self.block_comment = block;
        self
    }

    pub fn dollar_quoting(mut self, enabled: bool) -> Self {
        self.dollar_quoting = enabled;
        self
    }

    pub fn procedural_block(mut self, block: ProceduralBlock) -> Self {
        self.procedural_block = Some(block);
        self
    }

    pub fn keywords(mut self, words: &[&str]) -> Self {
        self.extra_keywords
            .extend(words.iter().map(|w| w.to_uppercase()));
        self
    }

    pub fn brackets(mut self, pairs: &[(char, char)]) -> Self {
        self.brackets = pairs.iter().copied().collect();
        self
    }

    pub fn extra_name_chars(mut self, chars: &[char]) -> Self {
        self.extra_name_chars = chars.iter().copied().collect();
        self
    }

    pub fn command_prefix(mut self, prefix: char) -> Self {
        self.command_prefix = prefix;
        self
    }

    pub fn leading_comment(mut self, prefix: Option<char>) -> Self {
        self.leading_comment = prefix;
        self
    }

    pub fn sql_commands(mut self, commands: &[&str]) -> Self {
        self.sql_commands = commands.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Validate and freeze the dialect.
    pub fn build(self) -> Result<Dialect, DialectError> {
        if self.quote_styles.is_empty() {
            return Err(DialectError::NoQuoteStyles(self.name));
        }
        for (i, style) in self.quote_styles.iter().enumerate() {
            if self.quote_styles[..i].iter().any(|q| q.open == style.open) {
                return Err(DialectError::DuplicateQuote(style.open));
            }
            let delimiters = [style.open, style.close];
            if self
                .brackets
                .iter()
                .any(|&(open, close)| delimiters.contains(&open) || delimiters.contains(&close))
            {
                return Err(DialectError::QuoteBracketConflict(style.open));
            }
        }

        let mut markers = Vec::new();
        for marker in &self.line_comment_markers {
            check_marker(marker)?;
            markers.push((MarkerKind::LineComment, marker.clone()));
        }
        if let Some(block) = &self.block_comment {
            check_marker(&block.open)?;
            check_marker(&block.close)?;
            markers.push((MarkerKind::BlockComment, block.open.clone()));
        }

        if let Some(block) = &self.procedural_block {
            if block.start_keywords.is_empty()
                || block.start_keywords.iter().any(|k| k.is_empty())
                || block.end_keyword.is_empty()
            {
                return Err(DialectError::EmptyProceduralBlock);
            }
        }

        Ok(Dialect {
            name: self.name,
            quote_styles: self.quote_styles,
            line_comment_markers: self.line_comment_markers,
            block_comment: self.block_comment,
            dollar_quoting: self.dollar_quoting,
            procedural_block: self.procedural_block,
            extra_keywords: self.extra_keywords,
            brackets: self.brackets,
            extra_name_chars: self.extra_name_chars,
            command_prefix: self.command_prefix,
            leading_comment: self.leading_comment,
            sql_commands: self.sql_commands,
            markers,
        })
    }

    /// Built-in tables are checked by the tests below.
    fn build_builtin(self) -> Dialect {
        match self.build() {
            Ok(dialect) => dialect,
            Err(e) => unreachable!("built-in dialect is invalid: {}", e),
        }
    }
}

fn check_marker(marker: &str) -> Result<(), DialectError> {
    if marker.is_empty() || !marker.is_ascii() {
        return Err(DialectError::InvalidCommentMarker(marker.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_valid() {
        let all = builtins();
        assert_eq!(all.len(), 7);
        assert_eq!(all[0].name(), "default");
    }

    #[test]
    fn test_dialect_from_name() {
        assert!(dialect_from_name("default").is_ok());
        assert!(dialect_from_name("PostgreSQL").is_ok());
        assert!(dialect_from_name("oracle").is_ok());
        assert!(dialect_from_name("mysql").is_ok());
        assert!(dialect_from_name("h2").is_ok());
        assert!(dialect_from_name("phoenix").is_ok());
        assert!(dialect_from_name("sqlserver").is_ok());
        assert!(dialect_from_name("unknown").is_err());
    }

    #[test]
    fn test_from_product_name_prefix_match() {
        assert_eq!(Dialect::from_product_name("PostgreSQL 15.2").name(), "PostgreSQL");
        assert_eq!(Dialect::from_product_name("mysql").name(), "MySQL");
        assert_eq!(Dialect::from_product_name("Oracle Database").name(), "Oracle");
        assert_eq!(Dialect::from_product_name("SQLite").name(), "default");
    }

    #[test]
    fn test_duplicate_quote_rejected() {
        let err = Dialect::builder("bad")
            .quote_styles(&[
                QuoteStyle::symmetric('\'', QuoteKind::Literal),
                QuoteStyle::symmetric('\'', QuoteKind::Identifier),
            ])
            .build()
            .unwrap_err();
        assert_eq!(err, DialectError::DuplicateQuote('\''));
    }

    #[test]
    fn test_bracket_quote_needs_bracket_removed() {
        let err = Dialect::builder("bad")
            .quote_styles(&[QuoteStyle::new(
                '[',
                ']',
                EscapeRule::DoubledChar,
                QuoteKind::Identifier,
            )])
            .build()
            .unwrap_err();
        assert_eq!(err, DialectError::QuoteBracketConflict('['));

        let sqlserver = Dialect::sqlserver();
        assert!(sqlserver.quote_for_open('[').is_some());
        assert!(!sqlserver.is_bracket_open('['));
    }

    #[test]
    fn test_invalid_markers_rejected() {
        let err = Dialect::builder("bad")
            .line_comment_markers(&[""])
            .build()
            .unwrap_err();
        assert!(matches!(err, DialectError::InvalidCommentMarker(_)));

        let err = Dialect::builder("bad")
            .procedural_block(ProceduralBlock::new(&[], "end", &[]))
            .build()
            .unwrap_err();
        assert_eq!(err, DialectError::EmptyProceduralBlock);
    }

    #[test]
    fn test_keywords_include_dialect_extras() {
        let pg = Dialect::postgresql();
        assert!(pg.is_keyword("select"));
        assert!(pg.is_keyword("returning"));
        assert!(!Dialect::ansi().is_keyword("returning"));
    }

    #[test]
    fn test_procedural_block_words() {
        let oracle = Dialect::oracle();
        let block = oracle.procedural_block().unwrap();
        assert!(block.is_start("BEGIN"));
        assert!(block.is_end("End"));
        assert!(block.is_compound_suffix("loop"));
        assert!(block.is_prelude("DECLARE"));
        assert!(!block.is_start("declare"));
        assert!(Dialect::ansi().procedural_block().is_none());
    }

    #[test]
    fn test_marker_lookup() {
        let mysql = Dialect::mysql();
        assert!(mysql.starts_marker('#'));
        assert!(mysql.starts_marker('-'));
        assert!(mysql.starts_marker('/'));
        assert!(!mysql.starts_marker('x'));
        assert!(!Dialect::ansi().starts_marker('#'));
    }

    #[test]
    fn test_default_quotes_take_backslash_and_doubled_escapes() {
        for dialect in builtins() {
            let single = dialect.quote_for_open('\'').unwrap();
            assert_eq!(single.escape, EscapeRule::BackslashChar, "{}", dialect.name());
            assert!(dialect.is_leading_comment('#'), "{}", dialect.name());
        }
        let bracket = Dialect::sqlserver().quote_for_open('[').unwrap();
        assert_eq!(bracket.escape, EscapeRule::DoubledChar);

        let plain = Dialect::builder("plain").leading_comment(None).build().unwrap();
        assert!(!plain.is_leading_comment('#'));
    }
}
