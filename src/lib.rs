//! # Manifest Validator - Pluggable Web App Manifest Validation
//!
//! Validates a web application manifest against a directory of
//! independently-authored rule modules plus per-platform rule sources, and
//! merges every finding into a single report. A broken rule file or a
//! failing rule degrades the report; it never aborts the run.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use manifest_validator::prelude::*;
//!
//! let manifest = Manifest::from_json_str(r#"{ "name": "Demo", "icons": [] }"#)?;
//! let info = ManifestInfo::w3c(manifest);
//!
//! // Rules owned by a platform module
//! let android = StaticRuleSource::shared(
//!     "android",
//!     vec![require_icon_sizes("Launcher icons", "android", Level::Error, ["48x48", "96x96"])],
//! );
//!
//! let validator = ManifestValidator::new("rules");
//! let report = validator.validate(&info, &[android], &["android"])?;
//! for record in &report.results {
//!     println!("{}", record);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Manifest, result records, the rule trait, errors
//! - [`rules`]: Rule registry, rule module files, the directory loader and built-in factories
//! - [`execution`]: Concurrent rule execution with failure isolation
//! - [`validation`]: Preconditions, platform sources and report merging
//! - [`config`]: TOML configuration
//!
//! ## Rule Directory Layout
//!
//! ```text
//! rules/
//!   manifest.toml      common rules, always loaded
//!   icons.toml
//!   android/           loaded only when "android" is requested
//!     icons.toml
//!   ios/
//!     icons.toml
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod execution;
pub mod rules;
pub mod validation;

pub use crate::execution::engine::run_validation_rules;
pub use crate::rules::builtin::{require_any_icon_size, require_icon_sizes, require_member};
pub use crate::rules::loader::load_validation_rules;
pub use crate::validation::pipeline::validate_manifest;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use manifest_validator::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::manifest::{Icon, Manifest, ManifestInfo, BASE_FORMAT};
    pub use crate::core::result::{codes, members, Level, ResultRecord};
    pub use crate::core::rule::{FnRule, SharedRule, ValidationRule};

    // Errors
    pub use crate::core::error::{
        LoadFailure, RuleError, RuleLoadError, SourceError, ValidatorError, ValidatorResult,
    };

    // Rules
    pub use crate::rules::builtin::{require_any_icon_size, require_icon_sizes, require_member};
    pub use crate::rules::definition::RuleDefinition;
    pub use crate::rules::loader::{load_validation_rules, RuleLoader};
    pub use crate::rules::registry::{RuleFactory, RuleRegistry};

    // Execution
    pub use crate::execution::engine::{run_validation_rules, ExecutionOptions, RuleExecutor};
    pub use crate::execution::sink::{ResultSink, RuleFailure, RunOutcome};

    // Validation
    pub use crate::validation::pipeline::{validate_manifest, ManifestValidator, ValidationReport};
    pub use crate::validation::sources::{
        DirectoryRuleSource, PlatformRuleSource, SharedSource, StaticRuleSource,
    };

    // Configuration
    pub use crate::config::{ValidatorConfig, BUNDLED_RULES_DIR};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "manifest-validator");
    }

    #[test]
    fn test_standalone_pipeline_composition() {
        let info = ManifestInfo::w3c(Manifest::from_json_str(r#"{ "icons": [{ "sizes": 16 }] }"#).unwrap());
        let rules = vec![
            require_icon_sizes("desc", "web", Level::Error, ["16", "32"]),
            require_any_icon_size("desc", "web", ["16", "32"]),
        ];

        let results = run_validation_rules(&info, &rules);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].data, vec![serde_json::json!("32")]);
    }

    #[test]
    fn test_bundled_rule_directory_loads() {
        let rules = load_validation_rules(BUNDLED_RULES_DIR, &["android", "ios", "windows"]).unwrap();
        // manifest.toml: 4, icons.toml: 2, android: 1, ios: 1, windows: 2
        assert_eq!(rules.len(), 10);
    }
}
