//! The rule contract.
//!
//! A rule is evaluated exactly once per run against one manifest and
//! settles with either zero-or-more result records or an error. Rules come
//! from rule files, from platform sources, from the built-in factories, or
//! from any closure wrapped in [`FnRule`].

use crate::core::error::RuleResult;
use crate::core::manifest::Manifest;
use crate::core::result::ResultRecord;
use std::fmt;
use std::sync::Arc;

/// A unit of validation logic checking one concern against a manifest.
pub trait ValidationRule: Send + Sync {
    /// Identifier used in diagnostics and rule listings.
    fn name(&self) -> &str;

    /// Evaluate the rule.
    ///
    /// `Ok(vec![])` means the manifest passed this rule.
    fn evaluate(&self, manifest: &Manifest) -> RuleResult<Vec<ResultRecord>>;
}

/// Rules are shared between the loader, sources and executor.
pub type SharedRule = Arc<dyn ValidationRule>;

impl fmt::Debug for dyn ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("name", &self.name())
            .finish()
    }
}

/// Function signature accepted by [`FnRule`].
pub type RuleFn = dyn Fn(&Manifest) -> RuleResult<Vec<ResultRecord>> + Send + Sync;

/// A rule backed by a closure.
pub struct FnRule {
    name: String,
    func: Box<RuleFn>,
}

impl FnRule {
    /// Wrap a closure as a rule.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Manifest) -> RuleResult<Vec<ResultRecord>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    /// Wrap a closure and share it.
    pub fn shared<F>(name: impl Into<String>, func: F) -> SharedRule
    where
        F: Fn(&Manifest) -> RuleResult<Vec<ResultRecord>> + Send + Sync + 'static,
    {
        Arc::new(Self::new(name, func))
    }
}

impl ValidationRule for FnRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, manifest: &Manifest) -> RuleResult<Vec<ResultRecord>> {
        (self.func)(manifest)
    }
}

impl fmt::Debug for FnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule")
            .field("name", &self.name)
            .field("func", &"<closure>")
            .finish()
    }
}
