//! Pipeline orchestrator
//!
//! Drives each compile command through the external tools, strictly one
//! unit after another:
//!
//! 1. `annotate -o <org> <source> -- <no-output args>`
//! 2. if `<org>` exists:
//!    `cc -E -P -C <org> -o <pp> <compiler-only args>`, then
//!    `merge <org> <pp> <new>`;
//!    otherwise the source is copied to `<new>` unchanged
//! 3. `instrument -c <callbacks> -o <source> <new> -- <no-output args>`
//!
//! Any failing stage aborts the whole run. The unit's artifacts are removed
//! on the way out either way.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use hookpass_core::config::PipelineConfig;
use hookpass_core::lists::{CallbackList, FileAllowlist};
use hookpass_core::{ArgumentViews, CompileCommand, CompileDatabase, Error, Result, Stage};

use crate::artifacts::PipelineArtifacts;
use crate::progress::{ProgressCallback, ProgressEvent, RunReport, UnitOutcome};
use crate::runner::{CommandRunner, Invocation};
use crate::tools::ToolSet;

/// Inputs of one pipeline run
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Directory holding the annotate, merge and instrument tools
    pub tool_dir: PathBuf,
    /// Callback list handed to the instrumentation tool
    pub callbacks_file: PathBuf,
    /// Compile command database
    pub compile_commands: PathBuf,
    /// Optional allowlist restricting which sources are processed
    pub files: Option<PathBuf>,
}

/// Prepare and run a whole batch
///
/// Checks run in a fixed order before any unit is touched: tools, compile
/// database, callback list, allowlist.
pub fn execute<R: CommandRunner>(
    request: &RunRequest,
    config: &PipelineConfig,
    runner: R,
    progress: Option<ProgressCallback>,
) -> Result<RunReport> {
    let tools = ToolSet::locate(&request.tool_dir, config)?;
    let database = CompileDatabase::load(&request.compile_commands)?;
    let callbacks = CallbackList::load(&request.callbacks_file)?;
    let allowlist = match &request.files {
        Some(path) => FileAllowlist::load(path)?,
        None => FileAllowlist::default(),
    };

    info!(
        "{} compile commands, {} callbacks, {} allowlisted files",
        database.len(),
        callbacks.names().len(),
        allowlist.len()
    );

    let mut orchestrator = Orchestrator::new(tools, callbacks, runner)
        .with_config(config.clone())
        .with_allowlist(allowlist);
    if let Some(callback) = progress {
        orchestrator.progress_callback = Some(Arc::new(callback));
    }
    orchestrator.run(&database)
}

/// Sequential per-unit pipeline
pub struct Orchestrator<R> {
    tools: ToolSet,
    callbacks: CallbackList,
    allowlist: FileAllowlist,
    config: PipelineConfig,
    runner: R,
    progress_callback: Option<Arc<ProgressCallback>>,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(tools: ToolSet, callbacks: CallbackList, runner: R) -> Self {
        Self {
            tools,
            callbacks,
            allowlist: FileAllowlist::default(),
            config: PipelineConfig::default(),
            runner,
            progress_callback: None,
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_allowlist(mut self, allowlist: FileAllowlist) -> Self {
        self.allowlist = allowlist;
        self
    }

    /// Set progress callback
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Process every unit of the database in order
    ///
    /// Stops at the first error; later units are left untouched.
    pub fn run(&mut self, database: &CompileDatabase) -> Result<RunReport> {
        let total = database.len();
        let mut report = RunReport {
            total,
            ..Default::default()
        };

        for (index, command) in database.iter().enumerate() {
            let outcome = self.process_unit(index + 1, total, command)?;
            report.record(outcome);
        }

        info!("{}", report);
        Ok(report)
    }

    /// Run one unit through the state machine
    pub fn process_unit(
        &mut self,
        current: usize,
        total: usize,
        command: &CompileCommand,
    ) -> Result<UnitOutcome> {
        let source = command.source_path();
        let cwd = command.directory.as_path();
        info!("[{}/{}] Preprocessing {}", current, total, source.display());

        // SELECT
        if !self.allowlist.admits(&source) {
            info!("SKIPPED");
            self.emit(Stage::Select, current, total, &source, "skipped");
            return Ok(UnitOutcome::Skipped);
        }

        let views = ArgumentViews::new(command)?;
        let no_output = views.no_output();
        let tool_args = &no_output[1..];
        let artifacts = PipelineArtifacts::for_command(command);
        // Leftovers of a killed run would otherwise be taken for fresh output
        artifacts.cleanup();

        // ANNOTATE
        self.emit(Stage::Annotate, current, total, &source, "annotating");
        let annotate = Invocation::new(Stage::Annotate, &self.tools.annotate, cwd)
            .arg("-o")
            .arg(&artifacts.original)
            .arg(&source)
            .arg("--")
            .args(tool_args);
        self.invoke(&annotate, &source)?;

        let copied_through = if artifacts.original.exists() {
            // EXPAND
            self.emit(Stage::Expand, current, total, &source, "expanding");
            let compiler_only = views.compiler_only()?;
            let expand = Invocation::new(Stage::Expand, views.program(), cwd)
                .args(&self.config.preprocess_flags)
                .arg(&artifacts.original)
                .arg("-o")
                .arg(&artifacts.expanded)
                .args(&compiler_only[1..]);
            self.invoke(&expand, &source)?;

            // MERGE
            self.emit(Stage::Merge, current, total, &source, "merging");
            let merge = Invocation::new(Stage::Merge, &self.tools.merge, cwd)
                .arg(&artifacts.original)
                .arg(&artifacts.expanded)
                .arg(&artifacts.merged);
            self.invoke(&merge, &source)?;
            false
        } else {
            // COPY_THROUGH
            debug!("Nothing annotated in {:?}, copying through", source);
            self.emit(Stage::CopyThrough, current, total, &source, "copying through");
            fs::copy(&source, &artifacts.merged).map_err(|e| Error::io(&source, e))?;
            true
        };

        // INSTRUMENT
        self.emit(Stage::Instrument, current, total, &source, "instrumenting");
        let instrument = Invocation::new(Stage::Instrument, &self.tools.instrument, cwd)
            .arg("-c")
            .arg(self.callbacks.path())
            .arg("-o")
            .arg(&source)
            .arg(&artifacts.merged)
            .arg("--")
            .args(tool_args);
        self.invoke(&instrument, &source)?;

        // CLEANUP
        self.emit(Stage::Cleanup, current, total, &source, "cleaning up");
        artifacts.cleanup();

        Ok(UnitOutcome::Instrumented { copied_through })
    }

    /// Run an invocation, turning a non-zero exit into a failure of `unit`
    fn invoke(&mut self, invocation: &Invocation, unit: &Path) -> Result<()> {
        let status = self.runner.run(invocation)?;
        if status.is_success() {
            return Ok(());
        }
        Err(Error::SubprocessFailure {
            stage: invocation.stage,
            unit: unit.to_path_buf(),
            code: status.code,
        })
    }

    fn emit(&self, stage: Stage, current: usize, total: usize, source: &Path, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(ProgressEvent {
                stage,
                current,
                total,
                source: source.to_path_buf(),
                message: message.to_string(),
            });
        }
    }
}
