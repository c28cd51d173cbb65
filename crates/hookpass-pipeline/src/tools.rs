//! External tool discovery

use std::path::{Path, PathBuf};
use tracing::debug;

use hookpass_core::config::PipelineConfig;
use hookpass_core::{paths, Error, Result};

/// Paths of the three external pipeline tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSet {
    pub annotate: PathBuf,
    pub merge: PathBuf,
    pub instrument: PathBuf,
}

impl ToolSet {
    /// Find the tools in `tool_dir`
    ///
    /// Fails with [`Error::ToolNotFound`] naming the first missing binary.
    pub fn locate(tool_dir: &Path, config: &PipelineConfig) -> Result<Self> {
        let dir = paths::absolutize(tool_dir).map_err(|e| Error::io(tool_dir, e))?;
        let find = |name: &str| -> Result<PathBuf> {
            let path = dir.join(name);
            if path.is_file() {
                debug!("Found {} at {:?}", name, path);
                Ok(path)
            } else {
                Err(Error::ToolNotFound {
                    tool: name.to_string(),
                    dir: dir.clone(),
                })
            }
        };

        Ok(Self {
            annotate: find(&config.annotate_tool)?,
            merge: find(&config.merge_tool)?,
            instrument: find(&config.instrument_tool)?,
        })
    }
}
