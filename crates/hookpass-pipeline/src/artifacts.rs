//! Temporary pipeline artifacts
//!
//! Each unit produces up to three intermediate files next to its source:
//! the annotated original, the preprocessed expansion and the merged result.
//! Names are derived from the source stem, so the files are removed whenever
//! the guard goes out of scope, including on error paths.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use hookpass_core::CompileCommand;

/// Temporary files of one translation unit
#[derive(Debug)]
pub struct PipelineArtifacts {
    pub original: PathBuf,
    pub expanded: PathBuf,
    pub merged: PathBuf,
}

impl PipelineArtifacts {
    /// Derive artifact paths for a compile command
    ///
    /// The artifacts keep the source's extension so the compiler treats them
    /// as the same language.
    pub fn for_command(command: &CompileCommand) -> Self {
        let source = command.source_path();
        let dir = source.parent().map(Path::to_path_buf).unwrap_or_default();
        let stem = command.stem();
        let ext = source
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "c".to_string());

        let name = |tag: &str| dir.join(format!("{}__hookpass_{}__.{}", stem, tag, ext));
        Self {
            original: name("org"),
            expanded: name("pp"),
            merged: name("new"),
        }
    }

    pub fn paths(&self) -> [&Path; 3] {
        [
            self.original.as_path(),
            self.expanded.as_path(),
            self.merged.as_path(),
        ]
    }

    /// Remove whichever artifacts exist
    pub fn cleanup(&self) {
        for path in self.paths() {
            if !path.exists() {
                continue;
            }
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed {:?}", path),
                Err(e) => warn!("Failed to remove {:?}: {}", path, e),
            }
        }
    }
}

impl Drop for PipelineArtifacts {
    fn drop(&mut self) {
        self.cleanup();
    }
}
