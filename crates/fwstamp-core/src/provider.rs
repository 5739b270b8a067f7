//! Turns describe output into a firmware version flag.
//!
//! One stateless request/response per build: query the VCS, trim, validate,
//! log `Firmware Revision: <version>`, render the macro, and append it to
//! the caller's [`BuildEnvironment`]. Every failure propagates; a firmware
//! image is never stamped with a made-up version.

use tracing::{debug, info, warn};

use fwstamp_config::AppConfig;

use crate::describe::{QueryError, VersionControlQuery};
use crate::env::BuildEnvironment;
use crate::flag::{DEFAULT_MACRO_NAME, FlagStyle, MacroDefinition};
use crate::version::{BuildVersionString, ParseError};

/// Prefix of the operator-visible diagnostic line.
pub const REVISION_LABEL: &str = "Firmware Revision";

/// Errors from stamping a build.
#[derive(Debug, thiserror::Error)]
pub enum StampError {
    #[error("version query failed")]
    VersionQuery(#[from] QueryError),

    #[error("describe output is empty; tag the repository or set validation.allow_empty")]
    EmptyDescribeOutput,

    #[error("describe output {output:?} is malformed")]
    MalformedDescribeOutput {
        output: String,
        #[source]
        source: ParseError,
    },
}

/// Knobs controlling validation and rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampOptions {
    /// Macro to define.
    pub macro_name: String,
    /// `-D NAME` or `-DNAME`.
    pub style: FlagStyle,
    /// Embed empty output as `""` rather than failing.
    pub allow_empty: bool,
    /// Fail on output that does not parse as `<tag>-<n>-g<hash>`.
    pub strict: bool,
}

impl Default for StampOptions {
    fn default() -> Self {
        Self {
            macro_name: DEFAULT_MACRO_NAME.to_string(),
            style: FlagStyle::Spaced,
            allow_empty: false,
            strict: false,
        }
    }
}

impl StampOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            macro_name: config.flag.macro_name.clone(),
            style: FlagStyle::from_config(&config.flag.style),
            allow_empty: config.validation.allow_empty,
            strict: config.validation.strict,
        }
    }
}

/// Computes the firmware version flag from an injected query.
#[derive(Debug, Clone)]
pub struct VersionFlagProvider<Q> {
    query: Q,
    options: StampOptions,
}

impl<Q: VersionControlQuery> VersionFlagProvider<Q> {
    /// A provider with the default `FWVERSION` options.
    pub fn new(query: Q) -> Self {
        Self::with_options(query, StampOptions::default())
    }

    pub fn with_options(query: Q, options: StampOptions) -> Self {
        Self { query, options }
    }

    pub fn options(&self) -> &StampOptions {
        &self.options
    }

    /// Run the query and return the validated, trimmed version.
    ///
    /// Emits the `Firmware Revision:` diagnostic on success.
    pub fn describe_version(&self) -> Result<BuildVersionString, StampError> {
        let raw = self.query.describe()?;
        let version = BuildVersionString::from_raw(&raw);

        if version.is_empty() {
            if !self.options.allow_empty {
                return Err(StampError::EmptyDescribeOutput);
            }
            warn!("Describe output is empty, embedding an empty version");
        } else if let Err(source) = version.parts() {
            if self.options.strict {
                return Err(StampError::MalformedDescribeOutput {
                    output: version.into_inner(),
                    source,
                });
            }
            warn!(output = %version, error = %source, "Describe output is not <tag>-<distance>-g<hash>, embedding as-is");
        }

        info!("{REVISION_LABEL}: {version}");
        Ok(version)
    }

    /// The macro definition for an already-described version.
    pub fn definition_for(&self, version: &BuildVersionString) -> MacroDefinition {
        MacroDefinition::new(&self.options.macro_name, version.as_str())
            .with_style(self.options.style)
    }

    /// Compute the flag and append it to `env` with a single call.
    ///
    /// Returns the flag that was appended.
    pub fn compute_firmware_version_flag<E>(&self, env: &mut E) -> Result<String, StampError>
    where
        E: BuildEnvironment + ?Sized,
    {
        let version = self.describe_version()?;
        let flag = self.definition_for(&version).to_build_flag();
        env.append_build_flags(std::slice::from_ref(&flag));
        debug!(%flag, "Appended firmware version flag");
        Ok(flag)
    }
}

/// Stamp `env` using `query` and the default `FWVERSION` options.
pub fn compute_firmware_version_flag<Q, E>(query: Q, env: &mut E) -> Result<String, StampError>
where
    Q: VersionControlQuery,
    E: BuildEnvironment + ?Sized,
{
    VersionFlagProvider::new(query).compute_firmware_version_flag(env)
}
