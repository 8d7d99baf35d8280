use std::io;

use termcolor::{Color, ColorSpec, WriteColor};

use crate::error::ScanlineError;
use crate::span::{Category, Span};

/// How one category is painted.
#[derive(Debug, Clone, Copy)]
enum Paint {
    Plain(Basic),
    Bold(Basic),
    Italic(Basic),
    /// Intense default foreground.
    Bright,
    ItalicBright,
}

#[derive(Debug, Clone, Copy)]
enum Basic {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Basic {
    fn color(self) -> Color {
        match self {
            Basic::Black => Color::Black,
            Basic::Red => Color::Red,
            Basic::Green => Color::Green,
            Basic::Yellow => Color::Yellow,
            Basic::Blue => Color::Blue,
            Basic::Magenta => Color::Magenta,
            Basic::Cyan => Color::Cyan,
            Basic::White => Color::White,
        }
    }
}

impl Paint {
    fn spec(self) -> ColorSpec {
        let mut spec = ColorSpec::new();
        match self {
            Paint::Plain(c) => {
                spec.set_fg(Some(c.color()));
            }
            Paint::Bold(c) => {
                spec.set_fg(Some(c.color())).set_bold(true);
            }
            Paint::Italic(c) => {
                spec.set_fg(Some(c.color())).set_italic(true);
            }
            Paint::Bright => {
                spec.set_intense(true);
            }
            Paint::ItalicBright => {
                spec.set_italic(true).set_intense(true);
            }
        }
        spec
    }
}

use Basic::*;
use Paint::*;

/// keyword, command, quoted, identifier, comment, number, default
const SCHEMES: &[(&str, [Paint; 7])] = &[
    (
        "dark",
        [Bold(Blue), Bold(White), Plain(Green), Plain(Cyan), ItalicBright, Plain(Yellow), Plain(White)],
    ),
    (
        "light",
        [Bold(Red), Bold(Black), Plain(Green), Plain(Cyan), ItalicBright, Plain(Yellow), Plain(Black)],
    ),
    (
        "chester",
        [Bold(Blue), Bold(White), Plain(Red), Plain(Cyan), Italic(Green), Plain(Yellow), Plain(White)],
    ),
    (
        "dracula",
        [Bold(Magenta), Bold(White), Plain(Green), Plain(Red), Italic(Cyan), Plain(Yellow), Plain(White)],
    ),
    (
        "solarized",
        [Bold(Yellow), Bold(Blue), Plain(Green), Plain(Red), ItalicBright, Plain(Cyan), Plain(Blue)],
    ),
    (
        "vs2010",
        [Bold(Blue), Bold(White), Plain(Red), Plain(Magenta), Italic(Green), Bright, Plain(White)],
    ),
    (
        "obsidian",
        [Bold(Green), Bold(White), Plain(Red), Plain(Magenta), ItalicBright, Plain(Yellow), Plain(White)],
    ),
];

/// Maps highlight categories to terminal colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    name: &'static str,
    keyword: ColorSpec,
    command: ColorSpec,
    quoted: ColorSpec,
    identifier: ColorSpec,
    comment: ColorSpec,
    number: ColorSpec,
    default: ColorSpec,
}

impl ColorScheme {
    /// Built-in scheme by name, case-insensitive.
    pub fn from_name(name: &str) -> Result<Self, ScanlineError> {
        SCHEMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(n, paints)| Self::build(n, paints))
            .ok_or_else(|| ScanlineError::Config(format!("Unknown color scheme: {}", name)))
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        SCHEMES.iter().map(|(n, _)| *n)
    }

    fn build(name: &'static str, p: &[Paint; 7]) -> Self {
        Self {
            name,
            keyword: p[0].spec(),
            command: p[1].spec(),
            quoted: p[2].spec(),
            identifier: p[3].spec(),
            comment: p[4].spec(),
            number: p[5].spec(),
            default: p[6].spec(),
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn spec(&self, category: Category) -> &ColorSpec {
        match category {
            Category::Keyword => &self.keyword,
            Category::Command => &self.command,
            Category::SingleQuote => &self.quoted,
            Category::IdentifierQuote => &self.identifier,
            Category::Comment => &self.comment,
            Category::Number => &self.number,
            Category::Default => &self.default,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::build(SCHEMES[0].0, &SCHEMES[0].1)
    }
}

/// Write `text` painted by `spans`. Text outside every span is written
/// with the default category.
pub fn render<W: WriteColor>(
    text: &str,
    spans: &[Span],
    scheme: &ColorScheme,
    out: &mut W,
) -> io::Result<()> {
    let mut cursor = 0;
    for span in spans {
        if span.start < cursor || span.end > text.len() {
            break;
        }
        if span.start > cursor {
            out.set_color(scheme.spec(Category::Default))?;
            out.write_all(text[cursor..span.start].as_bytes())?;
        }
        out.set_color(scheme.spec(span.category))?;
        out.write_all(span.text(text).as_bytes())?;
        cursor = span.end;
    }
    if cursor < text.len() {
        out.set_color(scheme.spec(Category::Default))?;
        out.write_all(text[cursor..].as_bytes())?;
    }
    out.reset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::highlight::highlight_spans;
    use crate::lexer::scan_str;
    use termcolor::Buffer;

    #[test]
    fn test_scheme_lookup() {
        assert_eq!(ColorScheme::names().count(), 7);
        assert_eq!(ColorScheme::from_name("Dracula").unwrap().name(), "dracula");
        assert!(ColorScheme::from_name("nope").is_err());
        assert_eq!(ColorScheme::default().name(), "dark");
    }

    #[test]
    fn test_dark_scheme_colors() {
        let scheme = ColorScheme::from_name("dark").unwrap();
        let keyword = scheme.spec(Category::Keyword);
        assert_eq!(keyword.fg(), Some(&Color::Blue));
        assert!(keyword.bold());
        let comment = scheme.spec(Category::Comment);
        assert!(comment.italic());
        assert!(comment.intense());
        assert_eq!(comment.fg(), None);
    }

    #[test]
    fn test_render_without_color_is_identity() {
        let text = "select 'a' -- c\nfrom t;";
        let spans = highlight_spans(&scan_str(text, &Dialect::ansi()));
        let mut out = Buffer::no_color();
        render(text, &spans, &ColorScheme::default(), &mut out).unwrap();
        assert_eq!(String::from_utf8_lossy(out.as_slice()), text);
    }

    #[test]
    fn test_render_ansi_emits_escapes() {
        let text = "select 1;";
        let spans = highlight_spans(&scan_str(text, &Dialect::ansi()));
        let mut out = Buffer::ansi();
        render(text, &spans, &ColorScheme::default(), &mut out).unwrap();
        let rendered = String::from_utf8_lossy(out.as_slice()).to_string();
        assert!(rendered.contains("\x1b["));
        assert!(rendered.contains("select"));
        assert!(rendered.len() > text.len());
    }
}
