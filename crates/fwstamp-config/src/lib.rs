#![deny(unsafe_code)]

//! Configuration loading and validation for fwstamp.
//!
//! Loads `fwstamp.toml` and validates it. Every field has a default, so an
//! empty file (or no file at all) reproduces the classic behaviour:
//! `git describe --tags --long` rendered as `-D FWVERSION=\"...\"`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// How the version-control system is queried.
    #[serde(default)]
    pub describe: DescribeConfig,

    /// How the compiler flag is rendered.
    #[serde(default)]
    pub flag: FlagConfig,

    /// What describe output is accepted.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Version-control query configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeConfig {
    /// The VCS executable, looked up on `PATH` unless absolute.
    #[serde(default = "default_describe_program")]
    pub program: String,

    /// Directory to run the query from. Defaults to the working directory.
    #[serde(default)]
    pub repo_dir: Option<PathBuf>,

    /// Only consider tags matching this glob (`--match`).
    #[serde(default)]
    pub match_pattern: Option<String>,

    /// Append `-dirty` when the worktree has local modifications (`--dirty`).
    #[serde(default)]
    pub dirty: bool,
}

impl Default for DescribeConfig {
    fn default() -> Self {
        Self {
            program: default_describe_program(),
            repo_dir: None,
            match_pattern: None,
            dirty: false,
        }
    }
}

fn default_describe_program() -> String {
    "git".to_string()
}

/// Compiler flag configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagConfig {
    /// Name of the preprocessor macro to define.
    #[serde(default = "default_macro_name")]
    pub macro_name: String,

    /// "spaced" renders `-D NAME=...`, "compact" renders `-DNAME=...`.
    #[serde(default = "default_flag_style")]
    pub style: String,
}

impl Default for FlagConfig {
    fn default() -> Self {
        Self {
            macro_name: default_macro_name(),
            style: default_flag_style(),
        }
    }
}

fn default_macro_name() -> String {
    "FWVERSION".to_string()
}

fn default_flag_style() -> String {
    "spaced".to_string()
}

/// Describe output validation.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Embed an empty describe output as `""` instead of failing the build.
    #[serde(default)]
    pub allow_empty: bool,

    /// Fail on output that is not `<tag>-<distance>-g<hash>[-dirty]`.
    #[serde(default)]
    pub strict: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Whether `name` is usable as a C preprocessor identifier.
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.describe.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "describe.program must not be empty".to_string(),
            ));
        }
        if let Some(pattern) = &self.describe.match_pattern {
            if pattern.is_empty() {
                return Err(ConfigError::Validation(
                    "describe.match_pattern must not be empty when set".to_string(),
                ));
            }
        }

        if !is_c_identifier(&self.flag.macro_name) {
            return Err(ConfigError::Validation(format!(
                "flag.macro_name must be a C identifier, got {:?}",
                self.flag.macro_name
            )));
        }
        let valid_styles = ["spaced", "compact"];
        if !valid_styles.contains(&self.flag.style.as_str()) {
            return Err(ConfigError::Validation(format!(
                "flag.style must be one of {:?}, got {:?}",
                valid_styles, self.flag.style
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }
}
