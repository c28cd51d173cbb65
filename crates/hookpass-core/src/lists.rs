//! List files
//!
//! Callbacks and allowlists are plain text: one entry per line, surrounding
//! whitespace trimmed, blank lines ignored.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::paths;

/// Parse list file content into its non-empty trimmed lines
pub fn parse_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a list file
pub fn read_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(parse_list(&content))
}

/// Callback names handed to the instrumentation tool
#[derive(Debug, Clone)]
pub struct CallbackList {
    path: PathBuf,
    names: Vec<String>,
}

impl CallbackList {
    /// Load the list; the file must be readable
    pub fn load(path: &Path) -> Result<Self> {
        let path = paths::absolutize(path).map_err(|e| Error::io(path, e))?;
        let names = read_list(&path)?;
        debug!("Loaded {} callbacks from {:?}", names.len(), path);
        Ok(Self { path, names })
    }

    /// Absolute path of the list file, passed through to the tool
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Set of source files a run is restricted to
///
/// An empty allowlist admits every file.
#[derive(Debug, Clone, Default)]
pub struct FileAllowlist {
    files: BTreeSet<PathBuf>,
}

impl FileAllowlist {
    /// Load an allowlist file
    ///
    /// A missing allowlist file yields an empty list. Entries naming files
    /// that do not exist are dropped; the rest are stored as normalized
    /// absolute paths.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Allowlist {:?} does not exist, processing all files", path);
            return Ok(Self::default());
        }

        let mut files = BTreeSet::new();
        for entry in read_list(path)? {
            let entry_path = Path::new(&entry);
            if !entry_path.exists() {
                debug!("Dropping missing allowlist entry {:?}", entry);
                continue;
            }
            files.insert(paths::absolutize(entry_path)?);
        }
        if files.is_empty() {
            warn!("Allowlist {:?} has no existing entries, processing all files", path);
        }
        Ok(Self { files })
    }

    pub fn from_paths<I: IntoIterator<Item = PathBuf>>(files: I) -> Self {
        Self {
            files: files.into_iter().map(|p| paths::normalize(&p)).collect(),
        }
    }

    /// Check whether a normalized absolute source path may be processed
    pub fn admits(&self, source: &Path) -> bool {
        self.files.is_empty() || self.files.contains(source)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_list() {
        let list = parse_list("  on_open \n\n on_close\n   \n");
        assert_eq!(list, vec!["on_open".to_string(), "on_close".to_string()]);
    }

    #[test]
    fn test_allowlist_drops_missing_entries() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("a.c"), "").unwrap();
        let list_file = root.join("files.txt");
        fs::write(
            &list_file,
            format!("{}\n{}\n", root.join("a.c").display(), root.join("gone.c").display()),
        )
        .unwrap();

        let allowlist = FileAllowlist::load(&list_file).unwrap();
        assert_eq!(allowlist.len(), 1);
        assert!(allowlist.admits(&paths::normalize(&root.join("a.c"))));
        assert!(!allowlist.admits(&paths::normalize(&root.join("gone.c"))));
    }

    #[test]
    fn test_missing_allowlist_admits_everything() {
        let allowlist = FileAllowlist::load(Path::new("/nonexistent/files.txt")).unwrap();
        assert!(allowlist.is_empty());
        assert!(allowlist.admits(Path::new("/anything.c")));
    }

    #[test]
    fn test_callback_list_requires_file() {
        assert!(CallbackList::load(Path::new("/nonexistent/callbacks.txt")).is_err());
    }
}
