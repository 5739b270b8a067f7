//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values without
//! repeating boilerplate across crate boundaries.

use std::path::Path;

use fwstamp_config::AppConfig;

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .repo_dir(repo.path())
///     .macro_name("BUILD_ID")
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn program(mut self, program: &str) -> Self {
        self.config.describe.program = program.to_string();
        self
    }

    pub fn repo_dir(mut self, dir: &Path) -> Self {
        self.config.describe.repo_dir = Some(dir.to_path_buf());
        self
    }

    pub fn match_pattern(mut self, pattern: &str) -> Self {
        self.config.describe.match_pattern = Some(pattern.to_string());
        self
    }

    pub fn dirty(mut self, dirty: bool) -> Self {
        self.config.describe.dirty = dirty;
        self
    }

    pub fn macro_name(mut self, name: &str) -> Self {
        self.config.flag.macro_name = name.to_string();
        self
    }

    pub fn style(mut self, style: &str) -> Self {
        self.config.flag.style = style.to_string();
        self
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.config.validation.allow_empty = allow;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.config.validation.strict = strict;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
