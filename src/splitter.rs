use crate::completion::{self, CompletionVerdict};
use crate::diagnostic::Diagnostic;
use crate::dialect::Dialect;
use crate::lexer;
use crate::span::Pos;

/// One statement cut out of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub start: Pos,
    pub end: Pos,
    pub text: String,
    /// Ended in a top-level `;`, or is a complete shell command.
    pub terminated: bool,
    /// Shell command rather than SQL.
    pub command: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl Statement {
    /// Statement text without surrounding whitespace.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

/// Split a whole script into statements at complete-statement
/// boundaries. Blank and comment-only fragments are dropped; a trailing
/// incomplete statement is returned with its forced-termination
/// diagnostics.
pub fn split_statements(text: &str, dialect: &Dialect) -> Vec<Statement> {
    let result = lexer::scan_str(text, dialect);
    let mut statements = Vec::new();
    let mut start = 0;
    let mut diagnostics = result.diagnostics().iter().peekable();

    for boundary in result.boundaries() {
        let mut own = Vec::new();
        while let Some(d) = diagnostics.next_if(|d| d.offset < boundary.end) {
            own.push(d.clone());
        }
        if boundary.content {
            statements.push(Statement {
                start,
                end: boundary.end,
                text: text[start..boundary.end].to_string(),
                terminated: true,
                command: boundary.command,
                diagnostics: own,
            });
        }
        start = boundary.end;
    }

    let settled = result.settled_state();
    if settled.statement_content {
        let mut own: Vec<Diagnostic> = diagnostics.cloned().collect();
        own.extend(lexer::finish(&result));
        statements.push(Statement {
            start,
            end: text.len(),
            text: text[start..].to_string(),
            terminated: completion::verdict(settled) == CompletionVerdict::Complete,
            command: settled.is_shell_command(),
            diagnostics: own,
        });
    } else {
        // Blank tail, but a region may still be open (`/* ...`).
        let own = lexer::finish(&result);
        if !own.is_empty() {
            statements.push(Statement {
                start,
                end: text.len(),
                text: text[start..].to_string(),
                terminated: false,
                command: false,
                diagnostics: own,
            });
        }
    }
    statements
}
