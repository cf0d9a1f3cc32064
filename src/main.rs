//! The CLI surface. A thin wrapper: argument parsing, config-file
//! discovery/precedence, directory walking, `exclude_filter` application
//! before a file is ever parsed, and plain-text report rendering. None of
//! this is part of the core's contract (`dittory::pipeline::analyze`) —
//! this binary just drives it the way a real host would.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dittory::ast::RawFile;
use dittory::config::{self, ConfigError};

/// Detects parameters that are always passed the same literal value across
/// every call site in a codebase.
#[derive(Parser, Debug)]
#[command(name = "dittory", version, about)]
struct Cli {
    /// Directory to analyze.
    #[arg(default_value = "./src")]
    directory: PathBuf,

    /// Minimum number of call sites required before a parameter can be
    /// reported as constant.
    #[arg(long = "min")]
    min: Option<u64>,

    /// Which declaration kinds to analyze.
    #[arg(long = "target")]
    target: Option<String>,

    /// Report rendering mode.
    #[arg(long = "output")]
    output: Option<String>,

    /// Restrict reported values to a comma-separated subset of
    /// boolean,number,string,enum,undefined (default: all).
    #[arg(long = "value-types")]
    value_types: Option<String>,

    /// Path to a tsconfig.json; currently used only for existence
    /// validation (no module-resolution config is consumed from it).
    #[arg(long = "tsconfig")]
    tsconfig: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dittory=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ConfigError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // `--help`/`--version` are not configuration errors: let clap print
        // and exit 0 the way it always has.
        Err(e)
            if matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            e.exit();
        }
        Err(e) => return Err(ConfigError::UnknownOption(e.to_string())),
    };

    if !cli.directory.is_dir() {
        return Err(ConfigError::MissingDirectory(cli.directory));
    }
    if let Some(tsconfig) = &cli.tsconfig {
        if !tsconfig.is_file() {
            return Err(ConfigError::MissingTsconfig(tsconfig.clone()));
        }
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config_file = config::load_config_file(&cwd)?;
    let options = config::resolve_options(
        config_file.as_ref(),
        cli.min,
        cli.target.as_deref(),
        cli.output.as_deref(),
        cli.value_types.as_deref(),
    )?;

    let files = collect_source_files(&cli.directory);
    tracing::info!(count = files.len(), directory = %cli.directory.display(), "discovered source files");

    let raw_files: Vec<RawFile> = files
        .into_iter()
        .filter_map(|path| match std::fs::read_to_string(&path) {
            Ok(text) => Some(RawFile::new(path, text)),
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "skipping unreadable file");
                None
            }
        })
        .collect();

    let result = dittory::analyze(&raw_files, &options);
    tracing::info!(
        constants = result.constant_params.len(),
        declarations = result.declarations.len(),
        "analysis complete"
    );

    print!("{}", dittory::report::render(&result, options.output));
    Ok(())
}

const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Walks `root` via `walkdir`, keeping only TS/JS/JSX source files and
/// skipping the usual noise directories the analyzed set should never
/// include (`node_modules`, VCS metadata, build output).
fn collect_source_files(root: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
        })
        .collect()
}

fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    matches!(
        entry.file_name().to_str(),
        Some("node_modules") | Some(".git") | Some("dist") | Some("build")
    )
}
