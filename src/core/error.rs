//! Error types for the manifest validator.
//!
//! Uses thiserror for structured errors with context. Errors fall in two groups:
//! - Fatal errors that reject a whole call (`ValidatorError`)
//! - Per-unit errors that are isolated, logged and dropped (`RuleLoadError`,
//!   `RuleError`, `SourceError`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the validator.
///
/// Every variant here aborts the call that produced it. Per-rule and
/// per-file problems never surface through this type.
#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Manifest is empty: no document content was provided")]
    EmptyDocument,

    #[error("Manifest format is '{found}', expected '{expected}'")]
    WrongFormat { expected: String, found: String },

    #[error("Failed to read rule directory {}: {source}", .path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a single rule module could not be loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadFailure {
    #[error("unsupported rule module extension '{0}'")]
    UnsupportedExtension(String),

    #[error("could not read file: {0}")]
    Read(String),

    #[error("could not parse rule module: {0}")]
    Parse(String),

    #[error("no rule registered under id '{0}'")]
    UnknownRule(String),

    #[error("could not list directory: {0}")]
    Directory(String),
}

/// A per-entry failure from the rule loader.
///
/// These never fail a load call; the loader logs and drops them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to load rule module {}: {reason}", .path.display())]
pub struct RuleLoadError {
    /// The file or directory that failed.
    pub path: PathBuf,
    /// What went wrong.
    pub reason: LoadFailure,
}

impl RuleLoadError {
    /// Create a new load error for `path`.
    pub fn new(path: impl Into<PathBuf>, reason: LoadFailure) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

/// Errors raised by a rule while evaluating a manifest.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleError {
    #[error("rule failed: {0}")]
    Failed(String),

    #[error("rule panicked: {0}")]
    Panicked(String),
}

impl RuleError {
    /// Shorthand for a plain failure.
    pub fn failed(message: impl Into<String>) -> Self {
        RuleError::Failed(message.into())
    }
}

/// Errors raised by a platform rule source when asked for its rules.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Platform '{platform}' could not load its rules: {source}")]
    Load {
        platform: String,
        #[source]
        source: ValidatorError,
    },

    #[error("Platform '{platform}' failed to supply rules: {message}")]
    Other { platform: String, message: String },
}

/// Result type alias for validator operations.
pub type ValidatorResult<T> = Result<T, ValidatorError>;

/// Result type alias for a single rule evaluation.
pub type RuleResult<T> = Result<T, RuleError>;
