pub mod api;
pub mod buffer;
pub mod completion;
pub mod config;
pub mod diagnostic;
pub mod dialect;
pub mod error;
pub mod highlight;
pub mod keywords;
pub mod lexer;
pub mod report;
pub mod settings;
pub mod span;
pub mod splitter;
pub mod state;
pub mod style;

// Re-export the main public API
pub use api::{check_string, get_matching_paths, highlight_string, run};
pub use buffer::StatementBuffer;
pub use completion::{continuation, is_complete, CompletionVerdict, Continuation};
pub use config::load_config;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use dialect::{dialect_from_name, Dialect};
pub use error::ScanlineError;
pub use highlight::highlight_spans;
pub use lexer::{finish, scan, scan_str, ScanResult};
pub use settings::Settings;
pub use span::{Category, Span};
pub use splitter::{split_statements, Statement};
pub use state::{Mode, ScanState};
