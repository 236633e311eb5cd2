//! Binary entry point for the apiscan CLI.
//!
//! ## Usage
//!
//! ```bash
//! # API of a package in the working tree
//! apiscan inspect src/mypkg
//!
//! # API of the same package at the latest tag
//! apiscan inspect src/mypkg --ref "$(apiscan latest-tag | jq -r .value)"
//!
//! # Repository root of a path
//! apiscan repo-root src/mypkg
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use apiscan::error::{ApiscanError, OutputErrorCode};
use apiscan::git::{latest_tag, repo_root};
use apiscan::loader::{load_git, load_path, LoadOptions};
use apiscan::output::{emit_response, ErrorResponse, InspectResponse, ValueResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Static API extraction for Python packages.
///
/// All output is JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "apiscan", version, about = "Static API extraction for Python packages")]
struct Cli {
    /// Log level for tracing output (RUST_LOG takes precedence).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
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

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the API of a Python file or package directory.
    Inspect {
        /// Python file or package directory.
        path: PathBuf,

        /// Git revision to load instead of the working tree.
        #[arg(long = "ref")]
        git_ref: Option<String>,

        /// Repository root (default: the repository containing PATH).
        #[arg(long)]
        repo: Option<PathBuf>,

        /// Dotted module path to use instead of the file or directory name.
        #[arg(long)]
        module_name: Option<String>,

        /// Exclude package files matching a pattern (`tests/`, `test_*.py`).
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Print the most recent tag reachable from HEAD.
    #[command(name = "latest-tag")]
    LatestTag {
        /// Path inside the repository (default: current directory).
        path: Option<PathBuf>,
    },

    /// Print the root directory of the repository containing a path.
    #[command(name = "repo-root")]
    RepoRoot {
        /// Path inside the repository (default: current directory).
        path: Option<PathBuf>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), ApiscanError> {
    match cli.command {
        Command::Inspect {
            path,
            git_ref,
            repo,
            module_name,
            exclude,
        } => execute_inspect(&path, git_ref, repo.as_deref(), module_name, exclude),
        Command::LatestTag { path } => {
            let tag = latest_tag(&path_or_cwd(path)?)?;
            emit(&ValueResponse::new(tag))
        }
        Command::RepoRoot { path } => {
            let root = repo_root(&path_or_cwd(path)?)?;
            emit(&ValueResponse::new(root.display().to_string()))
        }
    }
}

// ============================================================================
// Command Executors
// ============================================================================

fn execute_inspect(
    path: &Path,
    git_ref: Option<String>,
    repo: Option<&Path>,
    module_name: Option<String>,
    exclude: Vec<String>,
) -> Result<(), ApiscanError> {
    let options = LoadOptions {
        module_name,
        exclude,
    };

    let modules = match &git_ref {
        Some(reference) => load_git(path, reference, repo, &options)?,
        None => {
            if repo.is_some() {
                return Err(ApiscanError::invalid_args("--repo requires --ref"));
            }
            if !path.exists() {
                return Err(ApiscanError::file_not_found(path.display().to_string()));
            }
            load_path(path, &options)?
        }
    };

    emit(&InspectResponse::new(git_ref, modules))
}

fn path_or_cwd(path: Option<PathBuf>) -> Result<PathBuf, ApiscanError> {
    match path {
        Some(path) => Ok(path),
        None => Ok(std::env::current_dir()?),
    }
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), ApiscanError> {
    emit_response(response, &mut io::stdout())
        .map_err(|e| ApiscanError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}
