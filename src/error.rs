use thiserror::Error;

/// Problems detected while building a `Dialect`. These are configuration
/// mistakes and are rejected before any scan runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialectError {
    #[error("quote character {0:?} opens more than one quote style")]
    DuplicateQuote(char),

    #[error("character {0:?} is used both as a quote delimiter and as a bracket")]
    QuoteBracketConflict(char),

    #[error("comment marker {0:?} must be a non-empty ASCII string")]
    InvalidCommentMarker(String),

    #[error("procedural block needs at least one start keyword and an end keyword")]
    EmptyProceduralBlock,

    #[error("dialect {0:?} has no quote styles")]
    NoQuoteStyles(String),
}

/// User-facing errors.
#[derive(Error, Debug)]
pub enum ScanlineError {
    #[error("sqlscan config error: {0}")]
    Config(String),

    #[error("sqlscan dialect error: {0}")]
    Dialect(#[from] DialectError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ScanlineError>;
