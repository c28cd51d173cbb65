//! Process invocation
//!
//! Every external tool call goes through [`CommandRunner`]. The production
//! [`SystemRunner`] spawns a real process; tests script the tools instead.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

use hookpass_core::{Error, Result, Stage};

/// One external tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub stage: Stage,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Working directory of the call
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(stage: Stage, program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            stage,
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments as lossy strings, mostly for logging and assertions
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit status of a finished invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn failure(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes invocations to completion
pub trait CommandRunner {
    /// Run the invocation and wait for it to finish
    ///
    /// Returns `Err` only when the process could not be run at all; a
    /// non-zero exit is reported through [`RunStatus`].
    fn run(&mut self, invocation: &Invocation) -> Result<RunStatus>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, invocation: &Invocation) -> Result<RunStatus> {
        (**self).run(invocation)
    }
}

/// Runs invocations as child processes with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<RunStatus> {
        info!("{}", invocation);

        let program = resolve_program(&invocation.cwd, &invocation.program);
        let status = Command::new(&program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| Error::Spawn {
                program: program.clone(),
                source,
            })?;

        debug!("Exit code: {:?}", status.code());
        Ok(RunStatus {
            code: status.code(),
        })
    }
}

/// Resolve a relative program path containing a separator against `cwd`
///
/// Bare names are left for the `PATH` lookup.
pub fn resolve_program(cwd: &Path, program: &Path) -> PathBuf {
    if program.is_relative() && program.components().count() > 1 {
        cwd.join(program)
    } else {
        program.to_path_buf()
    }
}
