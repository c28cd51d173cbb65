//! Hookpass Preprocess
//!
//! Reconstructs a project-only view of preprocessor output. Foreign header
//! expansions are collapsed back into `#include` directives by following
//! the GNU line markers (`# <line> "<file>" <flags>`) the compiler emits.
//!
//! ## Modules
//!
//! - `marker` - Line marker parsing
//! - `filter` - Elision state machine
//! - `source` - Where preprocessed text comes from (a command or a file)

pub mod filter;
pub mod marker;
pub mod source;

pub use filter::{Boundary, FilterOutput, FilterState, LineMarkerFilter};
pub use marker::{LineMarker, MarkerFlags, MarkerParser};
pub use source::PreprocessedInput;

#[cfg(test)]
mod tests;
