//! Version-control query: the `git describe` invocation behind every stamp.
//!
//! [`VersionControlQuery`] is the seam between the stamping logic and the
//! outside world. [`GitDescribe`] runs the real binary; tests pass a closure
//! returning canned output or a simulated failure instead.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use fwstamp_config::DescribeConfig;

/// Errors from running the version-control query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program} describe` exited with {status}: {stderr}")]
    Status {
        program: String,
        status: ExitCode,
        stderr: String,
    },

    #[error("`{program} describe` produced non-UTF-8 output")]
    Encoding { program: String },
}

/// Exit status of a finished query process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Exited normally with this code.
    Code(i32),
    /// Terminated by a signal (Unix) or otherwise without a code.
    Terminated,
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "status {code}"),
            Self::Terminated => f.write_str("no status (terminated)"),
        }
    }
}

/// A source of describe output for the current checkout.
///
/// Returns the raw standard output; trimming and validation happen in the
/// [`VersionFlagProvider`](crate::VersionFlagProvider).
pub trait VersionControlQuery {
    /// Run the query and return its standard output.
    fn describe(&self) -> Result<String, QueryError>;
}

impl<F> VersionControlQuery for F
where
    F: Fn() -> Result<String, QueryError>,
{
    fn describe(&self) -> Result<String, QueryError> {
        self()
    }
}

/// Runs `git describe --tags --long` as a blocking child process.
#[derive(Debug, Clone)]
pub struct GitDescribe {
    program: String,
    repo_dir: Option<PathBuf>,
    match_pattern: Option<String>,
    dirty: bool,
}

impl GitDescribe {
    /// Query the repository containing the working directory with `git`.
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
            repo_dir: None,
            match_pattern: None,
            dirty: false,
        }
    }

    /// Build a query from the `[describe]` config section.
    pub fn from_config(config: &DescribeConfig) -> Self {
        Self {
            program: config.program.clone(),
            repo_dir: config.repo_dir.clone(),
            match_pattern: config.match_pattern.clone(),
            dirty: config.dirty,
        }
    }

    /// Run from `dir` instead of the working directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = Some(dir.into());
        self
    }

    /// Use a different VCS executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// The argument vector passed to the program.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "describe".to_string(),
            "--tags".to_string(),
            "--long".to_string(),
        ];
        if self.dirty {
            args.push("--dirty".to_string());
        }
        if let Some(pattern) = &self.match_pattern {
            args.push("--match".to_string());
            args.push(pattern.clone());
        }
        args
    }
}

impl Default for GitDescribe {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionControlQuery for GitDescribe {
    fn describe(&self) -> Result<String, QueryError> {
        let args = self.args();
        debug!(program = %self.program, ?args, dir = ?self.repo_dir, "Running describe");

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.repo_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| QueryError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            let status = output
                .status
                .code()
                .map_or(ExitCode::Terminated, ExitCode::Code);
            return Err(QueryError::Status {
                program: self.program.clone(),
                status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| QueryError::Encoding {
            program: self.program.clone(),
        })
    }
}
