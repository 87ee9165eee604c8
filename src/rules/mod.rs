//! Rule discovery.
//!
//! Contains the rule registry, the rule module file format, the directory
//! loader and the built-in rule factories.

pub mod builtin;
pub mod definition;
pub mod loader;
pub mod registry;

pub use definition::RuleDefinition;
pub use loader::{load_validation_rules, RuleLoader};
pub use registry::{RuleFactory, RuleRegistry};
