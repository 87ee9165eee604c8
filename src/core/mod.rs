//! Core types and traits for the manifest validator.
//!
//! This module contains the shapes every other component agrees on:
//! - The manifest document and its format envelope
//! - Result records and severity levels
//! - The rule trait
//! - Error types

pub mod error;
pub mod manifest;
pub mod result;
pub mod rule;

// Re-export commonly used types
pub use error::{LoadFailure, RuleError, RuleLoadError, SourceError, ValidatorError};
pub use manifest::{Icon, Manifest, ManifestInfo, BASE_FORMAT};
pub use result::{Level, ResultRecord};
pub use rule::{FnRule, SharedRule, ValidationRule};
