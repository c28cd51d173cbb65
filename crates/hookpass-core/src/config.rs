//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Hookpass configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Instrumentation pipeline configuration
    pub pipeline: PipelineConfig,

    /// Preprocessed-output filter configuration
    pub filter: FilterConfig,
}

impl Config {
    /// Load configuration from a YAML file; missing keys keep their defaults
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Binary name of the annotation tool inside the tool directory
    pub annotate_tool: String,

    /// Binary name of the merge (reconcile) tool
    pub merge_tool: String,

    /// Binary name of the callback instrumentation tool
    pub instrument_tool: String,

    /// Flags putting the native compiler in preprocess-only mode
    pub preprocess_flags: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            annotate_tool: "hookpass-annotate".into(),
            merge_tool: "hookpass-merge".into(),
            instrument_tool: "hookpass-instrument".into(),
            preprocess_flags: vec!["-E".into(), "-P".into(), "-C".into()],
        }
    }
}

/// Filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Extensions (with leading dot, compared case-insensitively) of files
    /// that are always project content
    pub source_extensions: Vec<String>,

    /// Compiler-injected headers that are elided without an include line
    pub pseudo_headers: Vec<String>,

    /// Keep the expansion of project headers instead of collapsing them
    pub expand_headers: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            source_extensions: vec![
                ".c".into(),
                ".cc".into(),
                ".cxx".into(),
                ".cpp".into(),
                ".m".into(),
                ".mm".into(),
            ],
            pseudo_headers: vec!["stdc-predef.h".into()],
            expand_headers: false,
        }
    }
}
