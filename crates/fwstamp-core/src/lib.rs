#![deny(unsafe_code)]

//! fwstamp core: stamps firmware builds with the `git describe` version.
//!
//! A [`VersionFlagProvider`] asks a [`VersionControlQuery`] for the nearest
//! tag, commit distance and abbreviated hash, renders them as a
//! `-D FWVERSION=\"...\"` compiler flag, and appends that flag to the host's
//! [`BuildEnvironment`]. Both the query and the environment are passed in,
//! so the whole pipeline runs in tests without a real repository.

/// Version-control query trait and the `git describe` implementation.
pub mod describe;
/// Build-flag sinks: in-memory lists and line-oriented writers.
pub mod env;
/// Macro definitions and compiler-flag rendering.
pub mod flag;
/// Generated C header output.
pub mod header;
/// The stamping pipeline.
pub mod provider;
/// Describe output and its parsed components.
pub mod version;

pub use describe::{GitDescribe, QueryError, VersionControlQuery};
pub use env::{BuildEnvironment, FlagList, WriterFlags};
pub use flag::{FlagStyle, MacroDefinition};
pub use provider::{StampError, StampOptions, VersionFlagProvider, compute_firmware_version_flag};
pub use version::{BuildVersionString, DescribeParts};
