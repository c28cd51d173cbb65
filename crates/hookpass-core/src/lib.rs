//! Hookpass Core
//!
//! Shared building blocks for the instrumentation pipeline and the
//! preprocessed-output filter.
//!
//! ## Modules
//!
//! - `compdb` - Compile command database loading
//! - `args` - Argument views derived from a compile command
//! - `config` - Tool names and filter settings
//! - `paths` - Lexical path normalization and project boundaries
//! - `lists` - Newline-separated list files (callbacks, allowlists)

pub mod args;
pub mod compdb;
pub mod config;
pub mod error;
pub mod lists;
pub mod paths;

pub use args::{ArgItem, ArgumentViews};
pub use compdb::{CompileCommand, CompileDatabase};
pub use config::Config;
pub use error::{Error, Result, Stage};
