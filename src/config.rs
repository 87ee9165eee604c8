//! Validator configuration.
//!
//! Read from a TOML file; every field is optional:
//!
//! ```toml
//! rules_dir = "rules"
//! platforms = ["web", "android"]
//! format = "w3c"
//!
//! [execution]
//! parallel = true
//! max_threads = 0
//! ```

use crate::core::error::{ValidatorError, ValidatorResult};
use crate::core::manifest::BASE_FORMAT;
use crate::execution::engine::ExecutionOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Rule directory bundled with the crate.
///
/// The path is fixed at compile time and points into the source checkout.
/// A relocated binary has to pass its own directory (the CLI also looks for
/// a `rules/` directory next to the executable).
pub const BUNDLED_RULES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/rules");

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Directory holding the common rules.
    pub rules_dir: PathBuf,
    /// Platforms to validate for.
    pub platforms: Vec<String>,
    /// Format tag manifests must carry.
    pub format: String,
    pub execution: ExecutionConfig,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            rules_dir: PathBuf::from(BUNDLED_RULES_DIR),
            platforms: Vec::new(),
            format: BASE_FORMAT.to_string(),
            execution: ExecutionConfig::default(),
        }
    }
}

/// `[execution]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionConfig {
    pub parallel: bool,
    pub max_threads: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_threads: 0,
        }
    }
}

impl From<&ExecutionConfig> for ExecutionOptions {
    fn from(config: &ExecutionConfig) -> Self {
        ExecutionOptions::new()
            .with_parallel(config.parallel)
            .with_max_threads(config.max_threads)
    }
}

impl ValidatorConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> ValidatorResult<Self> {
        toml::from_str(text).map_err(|e| ValidatorError::Config(e.to_string()))
    }

    /// Load configuration from a file.
    ///
    /// A relative `rules_dir` is resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> ValidatorResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ValidatorError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_toml_str(&text)?;
        if config.rules_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.rules_dir = parent.join(&config.rules_dir);
            }
        }
        Ok(config)
    }

    /// Execution options derived from the `[execution]` table.
    pub fn execution_options(&self) -> ExecutionOptions {
        ExecutionOptions::from(&self.execution)
    }
}
