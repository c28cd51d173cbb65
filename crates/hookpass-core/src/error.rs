//! Error types for hookpass

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Processing stage an external invocation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Select,
    Annotate,
    Expand,
    Merge,
    CopyThrough,
    Instrument,
    Cleanup,
    /// Command producing preprocessed text for the filter
    FilterInput,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Select => "select",
            Stage::Annotate => "annotate",
            Stage::Expand => "expand",
            Stage::Merge => "merge",
            Stage::CopyThrough => "copy-through",
            Stage::Instrument => "instrument",
            Stage::Cleanup => "cleanup",
            Stage::FilterInput => "filter-input",
        };
        f.write_str(name)
    }
}

/// Hookpass error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("tool `{tool}` not found in {}", dir.display())]
    ToolNotFound { tool: String, dir: PathBuf },

    #[error("malformed compile database {}: {reason}", path.display())]
    MalformedDatabase { path: PathBuf, reason: String },

    #[error("{stage} stage failed for {}: {}", unit.display(), describe_status(*code))]
    SubprocessFailure {
        stage: Stage,
        unit: PathBuf,
        code: Option<i32>,
    },

    #[error("cannot identify the source token for {} ({candidates} candidates)", file.display())]
    UnmatchedSourceToken { file: PathBuf, candidates: usize },

    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error at {}: {source}", path.display())]
    PathIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PathIo {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedDatabase {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

fn describe_status(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Result type alias for hookpass
pub type Result<T> = std::result::Result<T, Error>;
