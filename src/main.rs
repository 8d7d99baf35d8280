use std::io::{self, BufRead, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use termcolor::{ColorChoice, StandardStream};

use sqlscan::buffer::StatementBuffer;
use sqlscan::completion::CompletionVerdict;
use sqlscan::settings::Settings;
use sqlscan::style::{render, ColorScheme};

/// sqlscan - SQL statement scanner for interactive shells and scripts.
/// Splits scripts into statements, reports unterminated regions and
/// highlights SQL.
#[derive(Parser, Debug)]
#[command(name = "sqlscan", version, about)]
struct Cli {
    /// Files or directories to scan. Use "-" to read a script from stdin.
    #[arg(required_unless_present = "interactive")]
    files: Vec<PathBuf>,

    /// SQL dialect: default, postgresql, oracle, mysql, h2, phoenix, sqlserver.
    #[arg(short = 'd', long)]
    dialect: Option<String>,

    /// Exit with code 1 if a file ends in an incomplete statement or has diagnostics.
    #[arg(long)]
    check: bool,

    /// Print files with syntax highlighting.
    #[arg(long)]
    highlight: bool,

    /// Read statements line by line from stdin, like a SQL shell.
    #[arg(short = 'i', long)]
    interactive: bool,

    /// Color scheme: dark, light, chester, dracula, solarized, vs2010, obsidian.
    #[arg(long)]
    color_scheme: Option<String>,

    /// Shell command prefix (default '!').
    #[arg(long)]
    command_prefix: Option<char>,

    /// Glob patterns to exclude.
    #[arg(long)]
    exclude: Vec<String>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only).
    #[arg(short, long)]
    quiet: bool,

    /// Force color output.
    #[arg(long)]
    force_color: bool,

    /// Disable color output.
    #[arg(long)]
    no_color: bool,

    /// Number of threads for parallel processing (0 = all cores).
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Disable multi-threaded processing.
    #[arg(long)]
    single_process: bool,

    /// Path to config file (sqlscan.toml or pyproject.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let base = match sqlscan::load_config(&cli.files, cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };
    let settings = merge_settings(&cli, base);

    if cli.interactive {
        if let Err(e) = interactive(&settings) {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
        return;
    }

    let is_stdin = cli.files.len() == 1 && cli.files[0].to_string_lossy() == "-";
    if is_stdin {
        std::process::exit(scan_stdin(&settings));
    }

    if settings.highlight {
        if let Err(e) = highlight_files(&cli.files, &settings) {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }

    let report = match sqlscan::run(&cli.files, &settings) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if !settings.quiet {
        print_verbose_results(&report, &settings);
        eprintln!("{}", report.summary());
    }

    if settings.check || settings.verbose {
        report.print_problems();
    }

    if report.has_errors() {
        std::process::exit(2);
    } else if settings.check && report.has_problems() {
        std::process::exit(1);
    }
}

/// CLI flags override config values.
fn merge_settings(cli: &Cli, base: Settings) -> Settings {
    Settings {
        dialect_name: cli.dialect.clone().unwrap_or(base.dialect_name),
        color_scheme: cli.color_scheme.clone().unwrap_or(base.color_scheme),
        check: cli.check || base.check,
        highlight: cli.highlight || base.highlight,
        exclude: if cli.exclude.is_empty() {
            base.exclude
        } else {
            cli.exclude.clone()
        },
        verbose: cli.verbose || base.verbose,
        quiet: cli.quiet || base.quiet,
        no_color: cli.no_color || base.no_color,
        force_color: cli.force_color || base.force_color,
        threads: cli.threads.unwrap_or(base.threads),
        single_process: cli.single_process || base.single_process,
        command_prefix: cli.command_prefix.or(base.command_prefix),
    }
}

fn color_choice(settings: &Settings) -> ColorChoice {
    if !settings.color() {
        ColorChoice::Never
    } else if settings.force_color {
        ColorChoice::Always
    } else {
        ColorChoice::Auto
    }
}

/// Scan a script from stdin. Returns the exit code.
fn scan_stdin(settings: &Settings) -> i32 {
    let mut source = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut source) {
        eprintln!("Error reading stdin: {}", e);
        return 2;
    }

    let statements = match sqlscan::check_string(&source, settings) {
        Ok(statements) => statements,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 2;
        }
    };

    if settings.highlight {
        if let Err(e) = print_highlighted(&source, settings) {
            eprintln!("Error: {:#}", e);
            return 2;
        }
    }

    let mut problems = false;
    for statement in &statements {
        for diagnostic in &statement.diagnostics {
            eprintln!("<stdin>: {}", diagnostic);
            problems = true;
        }
        if !statement.terminated {
            problems = true;
        }
    }
    if !settings.quiet {
        eprintln!("{} statement(s)", statements.len());
    }
    if settings.check && problems {
        1
    } else {
        0
    }
}

fn print_highlighted(source: &str, settings: &Settings) -> anyhow::Result<()> {
    let spans = sqlscan::highlight_string(source, settings)?;
    let scheme = settings.color_scheme()?;
    let mut stdout = StandardStream::stdout(color_choice(settings));
    render(source, &spans, &scheme, &mut stdout).context("writing highlighted output")?;
    Ok(())
}

fn highlight_files(files: &[PathBuf], settings: &Settings) -> anyhow::Result<()> {
    for path in sqlscan::get_matching_paths(files, settings) {
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        print_highlighted(&source, settings)?;
    }
    Ok(())
}

/// Line-by-line statement loop: dispatches each complete statement and
/// prints a continuation hint while one is open.
fn interactive(settings: &Settings) -> anyhow::Result<()> {
    let dialect = settings.dialect()?;
    let scheme: ColorScheme = settings.color_scheme()?;
    let mut buffer = StatementBuffer::new(dialect);
    let mut stdout = StandardStream::stdout(color_choice(settings));
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();

    loop {
        line.clear();
        let n = input.read_line(&mut line).context("reading stdin")?;
        if n == 0 {
            break;
        }
        match buffer.push(&line) {
            CompletionVerdict::Complete => {
                for diagnostic in buffer.diagnostics() {
                    eprintln!("warning: {}", diagnostic);
                }
                let spans = buffer.highlight();
                let text = buffer.take();
                render(&text, &spans, &scheme, &mut stdout).context("writing statement")?;
            }
            CompletionVerdict::TriviallyComplete => buffer.clear(),
            CompletionVerdict::Incomplete => {
                if !settings.quiet {
                    if let Some(reason) = buffer.continuation() {
                        eprintln!("{}>", reason.prompt_hint());
                    }
                }
            }
        }
    }

    if buffer.verdict().is_incomplete() {
        for diagnostic in buffer.finish() {
            eprintln!("error: {}", diagnostic);
        }
        anyhow::bail!("input ended inside an incomplete statement");
    }
    Ok(())
}

fn print_verbose_results(report: &sqlscan::report::Report, settings: &Settings) {
    if !settings.verbose {
        return;
    }
    for result in &report.results {
        match result.status {
            sqlscan::report::FileStatus::Problems => {
                eprintln!("problems in {}", result.path.display());
            }
            sqlscan::report::FileStatus::Error => {
                eprintln!(
                    "error: {}: {}",
                    result.path.display(),
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            sqlscan::report::FileStatus::Clean => {
                eprintln!("{}: {} statement(s)", result.path.display(), result.statements);
            }
        }
    }
}
