//! Preprocessed input
//!
//! The filter reads preprocessed text either from the standard output of a
//! compiler command or from a file produced earlier.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info};

use hookpass_core::{Error, Result, Stage};

/// Where preprocessed text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreprocessedInput {
    /// Run a command and capture its standard output
    Command(Vec<String>),
    /// Read an existing file
    File(PathBuf),
}

impl PreprocessedInput {
    /// Produce the preprocessed bytes, unmodified
    ///
    /// A command exiting with a non-zero status yields
    /// [`Error::SubprocessFailure`] and no output.
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            PreprocessedInput::Command(tokens) => run_capture(tokens),
            PreprocessedInput::File(path) => {
                debug!("Reading preprocessed input from {:?}", path);
                std::fs::read(path).map_err(|e| Error::io(path, e))
            }
        }
    }
}

fn run_capture(tokens: &[String]) -> Result<Vec<u8>> {
    let (program, args) = tokens
        .split_first()
        .ok_or_else(|| Error::Config("no preprocessor command given".to_string()))?;

    info!("{}", tokens.join(" "));
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|source| Error::Spawn {
            program: PathBuf::from(program),
            source,
        })?;

    debug!("Exit code: {:?}", output.status.code());
    if !output.status.success() {
        return Err(Error::SubprocessFailure {
            stage: Stage::FilterInput,
            unit: PathBuf::from(program),
            code: output.status.code(),
        });
    }

    Ok(output.stdout)
}
