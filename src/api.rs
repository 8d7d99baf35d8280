use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::dialect::Dialect;
use crate::error::ScanlineError;
use crate::highlight::highlight_spans;
use crate::lexer;
use crate::report::{FileResult, FileStatus, Report};
use crate::settings::Settings;
use crate::span::Span;
use crate::splitter::{split_statements, Statement};

/// Split a SQL script into statements according to the given settings.
/// This is the core API function.
pub fn check_string(source: &str, settings: &Settings) -> Result<Vec<Statement>, ScanlineError> {
    let dialect = settings.dialect()?;
    Ok(split_statements(source, &dialect))
}

/// Highlight spans for a whole script.
pub fn highlight_string(source: &str, settings: &Settings) -> Result<Vec<Span>, ScanlineError> {
    let dialect = settings.dialect()?;
    Ok(highlight_spans(&lexer::scan_str(source, &dialect)))
}

/// Run the scanner on a collection of files.
pub fn run(files: &[PathBuf], settings: &Settings) -> Result<Report, ScanlineError> {
    let dialect = settings.dialect()?;
    let matching_paths = get_matching_paths(files, settings);
    let mut report = Report::new();

    if settings.single_process || matching_paths.len() <= 1 {
        for path in &matching_paths {
            report.add(check_file(path, &dialect));
        }
        return Ok(report);
    }

    // Parallel processing with rayon
    use rayon::prelude::*;

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(settings.threads)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            warn!("falling back to a single thread: {}", e);
            for path in &matching_paths {
                report.add(check_file(path, &dialect));
            }
            return Ok(report);
        }
    };

    let results: Vec<FileResult> = pool.install(|| {
        matching_paths
            .par_iter()
            .map(|path| check_file(path, &dialect))
            .collect()
    });
    for result in results {
        report.add(result);
    }

    Ok(report)
}

/// Scan a single file.
pub fn check_file(path: &Path, dialect: &Dialect) -> FileResult {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => return FileResult::error(path.to_path_buf(), format!("Read error: {}", e)),
    };

    let statements = split_statements(&source, dialect);
    let incomplete_tail = statements.last().is_some_and(|s| !s.terminated);
    let diagnostics: Vec<_> = statements
        .iter()
        .flat_map(|s| s.diagnostics.iter().cloned())
        .collect();
    let status = if incomplete_tail || !diagnostics.is_empty() {
        FileStatus::Problems
    } else {
        FileStatus::Clean
    };
    debug!(
        "{}: {} statement(s), {:?}",
        path.display(),
        statements.len(),
        status
    );

    FileResult {
        path: path.to_path_buf(),
        status,
        statements: statements.len(),
        incomplete_tail,
        diagnostics,
        error: None,
    }
}

/// Get all SQL file paths that match the given inputs.
pub fn get_matching_paths(paths: &[PathBuf], settings: &Settings) -> Vec<PathBuf> {
    let extensions = settings.sql_extensions();
    let mut result = HashSet::new();

    for path in paths {
        if path.is_file() {
            if is_sql_file(path, extensions) {
                result.insert(path.clone());
            }
        } else if path.is_dir() {
            collect_sql_files(path, extensions, &settings.exclude, &mut result);
        }
    }

    let mut sorted: Vec<PathBuf> = result.into_iter().collect();
    sorted.sort();
    sorted
}

/// Check if a file has a SQL extension.
fn is_sql_file(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Recursively collect SQL files from a directory.
fn collect_sql_files(
    dir: &Path,
    extensions: &[&str],
    exclude: &[String],
    result: &mut HashSet<PathBuf>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("cannot read {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Skip hidden directories and excluded patterns
        if name.starts_with('.') {
            continue;
        }
        if exclude.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| p.matches(&name))
                .unwrap_or(false)
        }) {
            continue;
        }

        if path.is_dir() {
            collect_sql_files(&path, extensions, exclude, result);
        } else if is_sql_file(&path, extensions) {
            result.insert(path);
        }
    }
}
