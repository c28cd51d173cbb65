//! Hookpass Pipeline
//!
//! Runs every selected translation unit of a compile database through the
//! external toolchain:
//!
//! ```text
//! SELECT -> ANNOTATE -> (EXPAND -> MERGE | COPY_THROUGH) -> INSTRUMENT -> CLEANUP
//! ```
//!
//! ## Modules
//!
//! - `tools` - Locating the external tool binaries
//! - `runner` - Process invocation behind a trait seam
//! - `artifacts` - Temporary files of one unit, removed on every exit path
//! - `progress` - Progress events and the run summary
//! - `orchestrator` - The per-unit state machine and the batch driver

pub mod artifacts;
pub mod orchestrator;
pub mod progress;
pub mod runner;
pub mod tools;

pub use artifacts::PipelineArtifacts;
pub use orchestrator::{execute, Orchestrator, RunRequest};
pub use progress::{ProgressCallback, ProgressEvent, RunReport, UnitOutcome};
pub use runner::{CommandRunner, Invocation, RunStatus, SystemRunner};
pub use tools::ToolSet;
