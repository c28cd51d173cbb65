//! Hookpass CLI
//!
//! Command-line interface for callback instrumentation and preprocessed
//! output filtering.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hookpass_core::{paths, Config};
use hookpass_pipeline::{execute, RunRequest, SystemRunner};
use hookpass_preprocess::{Boundary, LineMarkerFilter, PreprocessedInput};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hookpass")]
#[command(author, version, about = "Callback instrumentation driver for C-family sources", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Instrument every translation unit of a compile database in place
    Instrument {
        /// Directory containing the annotate, merge and instrument tools
        #[arg(value_name = "TOOL_DIR")]
        tool_dir: PathBuf,

        /// File listing callback names, one per line
        #[arg(value_name = "CALLBACKS")]
        callbacks: PathBuf,

        /// Compile commands database
        #[arg(value_name = "COMPILE_COMMANDS")]
        compile_commands: PathBuf,

        /// File listing the source files to process (default: all)
        #[arg(long, value_name = "FILE")]
        files: Option<PathBuf>,

        /// YAML configuration file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Remove content that is not part of the project from preprocessed output
    Filter {
        /// Project directory
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep the expansion of project header files
        #[arg(long)]
        expand_headers: bool,

        /// Read preprocessed text from a file instead of running a command
        #[arg(long, value_name = "FILE", conflicts_with = "command")]
        input: Option<PathBuf>,

        /// YAML configuration file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Preprocessor command whose standard output is filtered
        #[arg(last = true, value_name = "COMMAND")]
        command: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Instrument {
            tool_dir,
            callbacks,
            compile_commands,
            files,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let request = RunRequest {
                tool_dir,
                callbacks_file: callbacks,
                compile_commands,
                files,
            };
            cmd_instrument(&request, &config)?;
        }
        Commands::Filter {
            dir,
            output,
            expand_headers,
            input,
            config,
            command,
        } => {
            let config = load_config(config.as_deref())?;
            let source = match input {
                Some(path) => PreprocessedInput::File(path),
                None if !command.is_empty() => PreprocessedInput::Command(command),
                None => bail!("nothing to filter: pass --input <FILE> or a command after `--`"),
            };
            cmd_filter(&dir, output.as_deref(), expand_headers, &source, &config)?;
        }
    }

    Ok(())
}

/// Log to stderr so filtered output on stdout stays clean
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn cmd_instrument(request: &RunRequest, config: &Config) -> Result<()> {
    let report = execute(request, &config.pipeline, SystemRunner::new(), None)
        .context("instrumentation run aborted")?;
    println!("{}", report);
    Ok(())
}

fn cmd_filter(
    dir: &Path,
    output: Option<&Path>,
    expand_headers: bool,
    source: &PreprocessedInput,
    config: &Config,
) -> Result<()> {
    let project_dir = paths::absolutize(dir)?;
    if !project_dir.is_dir() {
        bail!("{}: invalid project directory", project_dir.display());
    }

    let boundary = Boundary::from_config(&project_dir, &config.filter)
        .with_expand_headers(expand_headers || config.filter.expand_headers);
    let filter = LineMarkerFilter::new(boundary);

    // Nothing is written unless the input was produced successfully
    let preprocessed = source.read().context("failed to obtain preprocessed input")?;
    let filtered = filter.filter_bytes(&preprocessed);

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            filtered.write_to(BufWriter::new(file))?;
            info!("Output written to: {}", path.display());
        }
        None => filtered.write_to(io::stdout().lock())?,
    }

    Ok(())
}
