//! Elision state machine
//!
//! Walks preprocessor output line by line. When the compiler enters a
//! foreign file, a single `#include` is emitted in its place and everything
//! up to the matching return marker is dropped. The walk is a fold over
//! [`FilterState`], so no state outlives a call. Lines are bytes and
//! project lines are copied through unchanged, whatever their encoding.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use hookpass_core::config::FilterConfig;
use hookpass_core::paths;

use crate::marker::{LineMarker, MarkerParser};

/// Nesting depth of foreign files currently being elided
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterState {
    pub elision_depth: usize,
}

impl FilterState {
    pub fn is_eliding(&self) -> bool {
        self.elision_depth > 0
    }
}

/// Decides which entered files belong to the project
#[derive(Debug, Clone)]
pub struct Boundary {
    project_dir: PathBuf,
    expand_headers: bool,
    source_extensions: Vec<String>,
    pseudo_headers: Vec<String>,
}

impl Boundary {
    /// Boundary with the default extension and pseudo-header lists
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(project_dir, &FilterConfig::default())
    }

    pub fn from_config(project_dir: impl Into<PathBuf>, config: &FilterConfig) -> Self {
        let project_dir: PathBuf = project_dir.into();
        Self {
            project_dir: paths::normalize(&project_dir),
            expand_headers: config.expand_headers,
            source_extensions: config
                .source_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            pseudo_headers: config.pseudo_headers.clone(),
        }
    }

    pub fn with_expand_headers(mut self, expand_headers: bool) -> Self {
        self.expand_headers = expand_headers;
        self
    }

    /// Check whether an entered file should be collapsed into an include
    ///
    /// Without header expansion anything that is not a source file is
    /// foreign. Independently, an existing absolute path outside the project
    /// directory is foreign. Compiler pseudo-files such as `<built-in>` never
    /// are.
    pub fn is_foreign(&self, filename: &str) -> bool {
        if filename.starts_with('<') && filename.ends_with('>') {
            return false;
        }

        let path = Path::new(filename);
        if !self.expand_headers && !self.has_source_extension(path) {
            return true;
        }

        path.is_absolute() && path.exists() && !paths::is_descendant(path, &self.project_dir)
    }

    /// Check whether a file is a compiler-injected header with no include
    pub fn is_pseudo_header(&self, filename: &str) -> bool {
        Path::new(filename)
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| self.pseudo_headers.iter().any(|h| h == name))
            .unwrap_or(false)
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => {
                let ext = format!(".{}", ext.to_lowercase());
                self.source_extensions.contains(&ext)
            }
            None => false,
        }
    }
}

/// Result of filtering a whole stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutput {
    pub lines: Vec<Vec<u8>>,
    /// State after the last line; depth 0 for balanced input
    pub final_state: FilterState,
}

impl FilterOutput {
    /// Write the lines, each terminated by a newline
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for line in &self.lines {
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }
}

/// Line marker filter
pub struct LineMarkerFilter {
    parser: MarkerParser,
    boundary: Boundary,
}

impl LineMarkerFilter {
    pub fn new(boundary: Boundary) -> Self {
        Self {
            parser: MarkerParser::new(),
            boundary,
        }
    }

    /// Advance the state machine by one input line
    ///
    /// Returns the next state and the line to emit, if any.
    pub fn step<'l>(&self, state: FilterState, line: &'l [u8]) -> (FilterState, Option<Cow<'l, [u8]>>) {
        match self.parser.parse(line) {
            Some(marker) => self.on_marker(state, &marker),
            None if state.is_eliding() => (state, None),
            None => (state, Some(Cow::Borrowed(line))),
        }
    }

    fn on_marker<'l>(&self, state: FilterState, marker: &LineMarker) -> (FilterState, Option<Cow<'l, [u8]>>) {
        let flags = marker.flags;

        if flags.enter_file {
            if state.is_eliding() {
                return (
                    FilterState {
                        elision_depth: state.elision_depth + 1,
                    },
                    None,
                );
            }
            if !self.boundary.is_foreign(&marker.filename) {
                return (state, None);
            }

            debug!("Eliding {}", marker.filename);
            let include = if self.boundary.is_pseudo_header(&marker.filename) {
                None
            } else if flags.system_header {
                Some(Cow::Owned(format!("#include <{}>", marker.filename).into_bytes()))
            } else {
                Some(Cow::Owned(format!("#include \"{}\"", marker.filename).into_bytes()))
            };
            return (FilterState { elision_depth: 1 }, include);
        }

        if flags.return_to_previous && state.is_eliding() {
            return (
                FilterState {
                    elision_depth: state.elision_depth - 1,
                },
                None,
            );
        }

        (state, None)
    }

    /// Filter a sequence of lines
    pub fn filter<'l, I>(&self, lines: I) -> FilterOutput
    where
        I: IntoIterator<Item = &'l [u8]>,
    {
        let mut state = FilterState::default();
        let mut out = Vec::new();

        for line in lines {
            let (next, emitted) = self.step(state, line);
            state = next;
            if let Some(emitted) = emitted {
                out.push(emitted.into_owned());
            }
        }

        if state.is_eliding() {
            warn!(
                "Preprocessed input ended inside {} elided file(s)",
                state.elision_depth
            );
        }

        FilterOutput {
            lines: out,
            final_state: state,
        }
    }

    /// Filter raw preprocessed output
    pub fn filter_bytes(&self, content: &[u8]) -> FilterOutput {
        self.filter(split_lines(content))
    }

    pub fn filter_str(&self, content: &str) -> FilterOutput {
        self.filter_bytes(content.as_bytes())
    }
}

/// Split on `\n`, dropping a trailing `\r` and the empty tail after a final
/// newline
fn split_lines(content: &[u8]) -> impl Iterator<Item = &[u8]> + '_ {
    let body = content.strip_suffix(b"\n").unwrap_or(content);
    let lines = (!content.is_empty()).then(|| body.split(|&b| b == b'\n'));
    lines
        .into_iter()
        .flatten()
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}
