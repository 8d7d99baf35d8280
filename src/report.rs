use std::path::PathBuf;

use crate::diagnostic::Diagnostic;

/// Status of scanning a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Every statement is terminated and no diagnostics were found.
    Clean,
    /// The file ends in an incomplete statement or carries diagnostics.
    Problems,
    /// An error occurred while reading the file.
    Error,
}

/// Result of scanning a single file.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: PathBuf,
    pub status: FileStatus,
    pub statements: usize,
    /// The last statement is not terminated.
    pub incomplete_tail: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub error: Option<String>,
}

impl FileResult {
    pub fn error(path: PathBuf, error: String) -> Self {
        Self {
            path,
            status: FileStatus::Error,
            statements: 0,
            incomplete_tail: false,
            diagnostics: Vec::new(),
            error: Some(error),
        }
    }
}

/// Aggregated report of scan results.
#[derive(Debug, Default)]
pub struct Report {
    pub results: Vec<FileResult>,
}

impl Report {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
        }
    }

    pub fn add(&mut self, result: FileResult) {
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    fn count(&self, status: FileStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn clean(&self) -> usize {
        self.count(FileStatus::Clean)
    }

    pub fn with_problems(&self) -> usize {
        self.count(FileStatus::Problems)
    }

    pub fn errors(&self) -> usize {
        self.count(FileStatus::Error)
    }

    pub fn statements(&self) -> usize {
        self.results.iter().map(|r| r.statements).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }

    pub fn has_problems(&self) -> bool {
        self.with_problems() > 0
    }

    /// Generate a summary string.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!(
            "{} file(s) processed, {} statement(s)",
            self.total(),
            self.statements()
        ));
        if self.with_problems() > 0 {
            parts.push(format!("{} with problems", self.with_problems()));
        }
        if self.clean() > 0 {
            parts.push(format!("{} clean", self.clean()));
        }
        if self.errors() > 0 {
            parts.push(format!("{} error(s)", self.errors()));
        }
        parts.join(", ")
    }

    /// Print problem details.
    pub fn print_problems(&self) {
        for result in &self.results {
            if let Some(ref error) = result.error {
                eprintln!("error: {}: {}", result.path.display(), error);
            }
            for diagnostic in &result.diagnostics {
                eprintln!("{}: {}", result.path.display(), diagnostic);
            }
            if result.incomplete_tail && result.diagnostics.is_empty() {
                eprintln!("{}: last statement is not terminated", result.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Closer, Diagnostic};

    fn result(name: &str, status: FileStatus, statements: usize) -> FileResult {
        FileResult {
            path: PathBuf::from(name),
            status,
            statements,
            incomplete_tail: false,
            diagnostics: Vec::new(),
            error: None,
        }
    }

    #[test]
    fn test_report_summary() {
        let mut report = Report::new();
        report.add(result("a.sql", FileStatus::Clean, 3));
        let mut bad = result("b.sql", FileStatus::Problems, 1);
        bad.diagnostics
            .push(Diagnostic::unmatched(4, Closer::Bracket(')')));
        report.add(bad);
        report.add(FileResult::error(
            PathBuf::from("c.sql"),
            "Read error".to_string(),
        ));

        assert_eq!(report.total(), 3);
        assert_eq!(report.clean(), 1);
        assert_eq!(report.with_problems(), 1);
        assert_eq!(report.errors(), 1);
        assert_eq!(report.statements(), 4);
        assert!(report.has_errors());
        assert!(report.has_problems());
        assert_eq!(
            report.summary(),
            "3 file(s) processed, 4 statement(s), 1 with problems, 1 clean, 1 error(s)"
        );
    }
}
