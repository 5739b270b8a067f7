//! Build environments that receive the generated compiler flags.
//!
//! The host build tool owns its flag list; fwstamp only ever appends to it
//! through [`BuildEnvironment`], passed in explicitly by the caller.

use std::io::{self, Write};

/// The host build tool's mutable list of compiler flags.
pub trait BuildEnvironment {
    /// Append `flags`, in order, to the active build configuration.
    fn append_build_flags(&mut self, flags: &[String]);
}

impl BuildEnvironment for Vec<String> {
    fn append_build_flags(&mut self, flags: &[String]) {
        self.extend_from_slice(flags);
    }
}

impl<E: BuildEnvironment + ?Sized> BuildEnvironment for &mut E {
    fn append_build_flags(&mut self, flags: &[String]) {
        (**self).append_build_flags(flags);
    }
}

/// In-memory flag list that also records how often it was appended to.
#[derive(Debug, Default, Clone)]
pub struct FlagList {
    flags: Vec<String>,
    append_calls: usize,
}

impl FlagList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from flags the host already had configured.
    pub fn with_flags(flags: Vec<String>) -> Self {
        Self {
            flags,
            append_calls: 0,
        }
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Number of `append_build_flags` calls received.
    pub fn append_calls(&self) -> usize {
        self.append_calls
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn into_flags(self) -> Vec<String> {
        self.flags
    }
}

impl BuildEnvironment for FlagList {
    fn append_build_flags(&mut self, flags: &[String]) {
        self.append_calls += 1;
        self.flags.extend_from_slice(flags);
    }
}

/// Writes each appended flag on its own line.
///
/// With stdout this is the PlatformIO dynamic build-flag protocol
/// (`build_flags = !fwstamp flag`): the host reads the command's output and
/// adds every line to the compiler invocation. The first write error is kept
/// and returned by [`finish`](Self::finish).
#[derive(Debug)]
pub struct WriterFlags<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> WriterFlags<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Flush and hand back the writer, or the first error encountered.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> BuildEnvironment for WriterFlags<W> {
    fn append_build_flags(&mut self, flags: &[String]) {
        if self.error.is_some() {
            return;
        }
        for flag in flags {
            if let Err(err) = writeln!(self.writer, "{flag}") {
                self.error = Some(err);
                return;
            }
        }
    }
}
