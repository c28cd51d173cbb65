//! Compile command database
//!
//! Reads `compile_commands.json` style databases: a JSON array of entries
//! with `directory`, `file`, and either a shell-quoted `command` or an
//! explicit `arguments` list.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::paths;

/// Build command for one translation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommand {
    /// Working directory of the recorded command
    pub directory: PathBuf,
    /// Source file, possibly relative to `directory`
    pub file: PathBuf,
    /// Shell-quoted command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Pre-split command line; takes precedence over `command`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,
}

impl CompileCommand {
    /// Create a command from an explicit argument list
    pub fn with_arguments(
        directory: impl Into<PathBuf>,
        file: impl Into<PathBuf>,
        arguments: Vec<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            file: file.into(),
            command: None,
            arguments: Some(arguments),
        }
    }

    /// Create a command from a shell-quoted command line
    pub fn with_command(
        directory: impl Into<PathBuf>,
        file: impl Into<PathBuf>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            file: file.into(),
            command: Some(command.into()),
            arguments: None,
        }
    }

    /// Resolve the command line into tokens
    ///
    /// Returns `None` when the `command` string has unbalanced quoting.
    pub fn tokens(&self) -> Option<Vec<String>> {
        if let Some(arguments) = &self.arguments {
            return Some(arguments.clone());
        }
        match &self.command {
            Some(command) => shlex::split(command),
            None => Some(Vec::new()),
        }
    }

    /// Normalized source path, resolved against `directory` when relative
    pub fn source_path(&self) -> PathBuf {
        paths::resolve_in(&self.directory, &self.file)
    }

    /// Source file name without its extension
    pub fn stem(&self) -> String {
        self.file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Ordered collection of compile commands
#[derive(Debug, Clone, Default)]
pub struct CompileDatabase {
    commands: Vec<CompileCommand>,
}

impl CompileDatabase {
    /// Load a database file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let db = Self::from_json_str(path, &content)?;
        debug!("Loaded {} compile commands from {:?}", db.len(), path);
        Ok(db)
    }

    /// Parse database content; `path` is only used in error messages
    pub fn from_json_str(path: &Path, content: &str) -> Result<Self> {
        let commands: Vec<CompileCommand> =
            serde_json::from_str(content).map_err(|e| Error::malformed(path, e.to_string()))?;

        for (index, command) in commands.iter().enumerate() {
            match command.tokens() {
                None => {
                    return Err(Error::malformed(
                        path,
                        format!("entry {}: unbalanced quoting in command", index),
                    ))
                }
                Some(tokens) if tokens.is_empty() => {
                    return Err(Error::malformed(
                        path,
                        format!("entry {}: no command or arguments", index),
                    ))
                }
                Some(_) => {}
            }
        }

        Ok(Self { commands })
    }

    pub fn from_commands(commands: Vec<CompileCommand>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[CompileCommand] {
        &self.commands
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompileCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
