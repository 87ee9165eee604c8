//! Validation coordination.
//!
//! The coordinator checks manifest preconditions, runs the common rules and
//! every platform's rules, and merges the findings.

pub mod pipeline;
pub mod sources;

pub use pipeline::{validate_manifest, ManifestValidator, ValidationReport};
pub use sources::{DirectoryRuleSource, PlatformRuleSource, SharedSource, StaticRuleSource};
