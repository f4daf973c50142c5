//! Binary entry point for the tugsort CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Print the sorted contents of one file
//! tugsort sort src/app.ts
//!
//! # Rewrite every JS/TS file under src/
//! tugsort sort src --write
//!
//! # Fail (exit 5) if anything would change, showing what
//! tugsort sort src --check --format diff
//!
//! # Show the effective configuration
//! tugsort config
//! ```

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use tugsort::cli::{self, FileResult, Overrides};
use tugsort::config::Config;
use tugsort_core::error::TugSortError;
use tugsort_core::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Import sorting for JavaScript and TypeScript.
///
/// Groups and orders import statements while keeping every comment attached
/// to the code it describes.
#[derive(Parser, Debug)]
#[command(name = "tugsort", version, about = "Import sorting for JavaScript and TypeScript")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Config file (default: tugsort.toml in the current directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for the sort command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum SortFormat {
    /// Sorted text for a single file, otherwise a list of changed files.
    #[default]
    Text,
    /// JSON report.
    Json,
    /// Unified diff.
    Diff,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Sort the imports of files and directories.
    Sort {
        /// Files or directories to process.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Rewrite files whose imports change.
        #[arg(long)]
        write: bool,
        /// Exit with code 5 if any file would change.
        #[arg(long, conflicts_with = "write")]
        check: bool,
        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: SortFormat,
        /// Group pattern; repeat to build the import order.
        #[arg(long = "import-order", value_name = "PATTERN")]
        import_order: Vec<String>,
        /// Compare module paths and names case-sensitively.
        #[arg(long)]
        case_sensitive: bool,
        /// Keep specifiers inside braces in their written order.
        #[arg(long)]
        no_sort_specifiers: bool,
        /// Keep duplicate imports of the same module apart.
        #[arg(long)]
        no_merge: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            let response = ErrorResponse::from_error(&err);
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();
            ExitCode::from(err.error_code().code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<ExitCode, TugSortError> {
    let cwd = env::current_dir()
        .map_err(|e| TugSortError::internal(format!("cannot read working directory: {e}")))?;
    let mut config = Config::discover(cli.global.config.as_deref(), &cwd)?;

    match cli.command {
        Command::Sort {
            paths,
            write,
            check,
            format,
            import_order,
            case_sensitive,
            no_sort_specifiers,
            no_merge,
        } => {
            Overrides {
                import_order: (!import_order.is_empty()).then_some(import_order),
                case_sensitive,
                no_sort_specifiers,
                no_merge,
            }
            .apply(&mut config.tugsort);
            execute_sort(&config, &paths, write, check, format)
        }
        Command::Config => {
            let text = config.to_toml()?;
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// Command Executors
// ============================================================================

/// Execute the sort command.
///
/// In JSON mode per-file failures are part of the report and the exit code
/// is that of the first failure. Elsewhere the first failure aborts the run
/// before anything is written.
fn execute_sort(
    config: &Config,
    paths: &[PathBuf],
    write: bool,
    check: bool,
    format: SortFormat,
) -> Result<ExitCode, TugSortError> {
    let files = cli::collect_files(paths, &config.tugsort)?;
    let mut results = cli::sort_files(&files, &config.tugsort);

    if format == SortFormat::Json {
        let failed = results.iter().any(|result| result.outcome.is_err());
        if write && !failed {
            cli::write_changes(&results)?;
        }
        let response = cli::report(&results, write && !failed);
        let _ = emit_response(&response, &mut io::stdout());
        let checked = if check { cli::check(&results) } else { Ok(()) };
        let code = match (cli::take_first_error(&mut results), checked) {
            (Some(err), _) | (None, Err(err)) => ExitCode::from(err.error_code().code()),
            (None, Ok(())) => ExitCode::SUCCESS,
        };
        return Ok(code);
    }

    if let Some(err) = cli::take_first_error(&mut results) {
        return Err(err);
    }

    let mut stdout = io::stdout().lock();
    if format == SortFormat::Diff {
        for result in &results {
            let _ = stdout.write_all(result.diff().as_bytes());
        }
    } else if !write && !check && paths.len() == 1 && results.len() == 1 && paths[0].is_file() {
        if let Ok(outcome) = &results[0].outcome {
            let _ = stdout.write_all(outcome.text.as_bytes());
        }
    } else {
        print_changed(&mut stdout, &results, write);
    }
    let _ = stdout.flush();

    if write {
        cli::write_changes(&results)?;
    }
    if check {
        cli::check(&results)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// One line per changed file.
fn print_changed(out: &mut impl Write, results: &[FileResult], write: bool) {
    let verb = if write { "sorted" } else { "would sort" };
    for result in results.iter().filter(|result| result.changed()) {
        let _ = writeln!(out, "{verb} {}", result.display_path());
    }
}

// ============================================================================
// Tests
// ============================================================================
