//! Fake version-control queries.
//!
//! [`FakeQuery`] stands in for `git describe`: it returns canned output or a
//! simulated failure and counts how often it was asked.

use std::cell::Cell;
use std::io;

use fwstamp_core::describe::ExitCode;
use fwstamp_core::{QueryError, VersionControlQuery};

#[derive(Debug, Clone)]
enum Response {
    Output(String),
    Exit { code: i32, stderr: String },
    NotInstalled,
}

/// A scripted [`VersionControlQuery`].
#[derive(Debug)]
pub struct FakeQuery {
    response: Response,
    calls: Cell<usize>,
}

impl FakeQuery {
    /// Succeed with `stdout` verbatim (whitespace included).
    pub fn output(stdout: &str) -> Self {
        Self::with(Response::Output(stdout.to_string()))
    }

    /// Fail as if the program exited with `code`.
    pub fn exit(code: i32, stderr: &str) -> Self {
        Self::with(Response::Exit {
            code,
            stderr: stderr.to_string(),
        })
    }

    /// What `git describe` reports in a repository without tags.
    pub fn no_tags() -> Self {
        Self::exit(128, "fatal: No names found, cannot describe anything.")
    }

    /// Fail as if the program could not be found.
    pub fn not_installed() -> Self {
        Self::with(Response::NotInstalled)
    }

    /// How many times the query ran.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    fn with(response: Response) -> Self {
        Self {
            response,
            calls: Cell::new(0),
        }
    }
}

impl VersionControlQuery for FakeQuery {
    fn describe(&self) -> Result<String, QueryError> {
        self.calls.set(self.calls.get() + 1);
        match &self.response {
            Response::Output(stdout) => Ok(stdout.clone()),
            Response::Exit { code, stderr } => Err(QueryError::Status {
                program: "git".to_string(),
                status: ExitCode::Code(*code),
                stderr: stderr.clone(),
            }),
            Response::NotInstalled => Err(QueryError::Spawn {
                program: "git".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            }),
        }
    }
}

impl VersionControlQuery for &FakeQuery {
    fn describe(&self) -> Result<String, QueryError> {
        (**self).describe()
    }
}
