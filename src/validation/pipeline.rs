//! Validation coordinator.
//!
//! Checks the manifest preconditions, runs the common rules from the rule
//! directory, then runs every platform's rules concurrently and merges
//! everything into one report.

use crate::config::{ValidatorConfig, BUNDLED_RULES_DIR};
use crate::core::error::{ValidatorError, ValidatorResult};
use crate::core::manifest::{Manifest, ManifestInfo, BASE_FORMAT};
use crate::core::result::{Level, ResultRecord};
use crate::execution::engine::{ExecutionOptions, RuleExecutor};
use crate::execution::sink::{RuleFailure, RunOutcome};
use crate::rules::loader::RuleLoader;
use crate::rules::registry::RuleRegistry;
use crate::validation::sources::{PlatformRuleSource, SharedSource};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Merged outcome of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Every record from the common rules and all platforms.
    pub results: Vec<ResultRecord>,
    /// Rules that failed while evaluating.
    pub failures: Vec<RuleFailure>,
    /// Number of rules invoked.
    pub rules_run: usize,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

impl ValidationReport {
    fn absorb(&mut self, outcome: RunOutcome) {
        self.results.extend(outcome.results);
        self.failures.extend(outcome.failures);
        self.rules_run += outcome.rules_run;
    }

    /// Number of error-level records.
    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.level == Level::Error).count()
    }

    /// Number of warning-level records.
    pub fn warning_count(&self) -> usize {
        self.results.iter().filter(|r| r.level == Level::Warning).count()
    }

    /// Whether any error-level record was reported.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        let mut summary = if self.has_errors() {
            format!(
                "✗ {} error(s), {} warning(s) from {} rule(s)",
                self.error_count(),
                self.warning_count(),
                self.rules_run
            )
        } else if self.results.is_empty() {
            format!("✓ Manifest passed all {} rule(s)", self.rules_run)
        } else {
            format!(
                "✓ Manifest is valid with {} warning(s) from {} rule(s)",
                self.warning_count(),
                self.rules_run
            )
        };
        if !self.failures.is_empty() {
            summary.push_str(&format!("; {} rule(s) failed to run", self.failures.len()));
        }
        summary
    }

    /// Drop the failure list and keep the records.
    pub fn into_results(self) -> Vec<ResultRecord> {
        self.results
    }
}

/// Coordinates loading, execution and merging.
#[derive(Clone)]
pub struct ManifestValidator {
    rules_dir: PathBuf,
    format: String,
    loader: RuleLoader,
    executor: RuleExecutor,
}

impl ManifestValidator {
    /// Create a validator reading common rules from `rules_dir`.
    pub fn new(rules_dir: impl Into<PathBuf>) -> Self {
        Self {
            rules_dir: rules_dir.into(),
            format: BASE_FORMAT.to_string(),
            loader: RuleLoader::default(),
            executor: RuleExecutor::new(),
        }
    }

    /// Create a validator from configuration.
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::new(&config.rules_dir)
            .with_format(&config.format)
            .with_options(config.execution_options())
    }

    /// Resolve `registered` rules through `registry`.
    pub fn with_registry(mut self, registry: Arc<RuleRegistry>) -> Self {
        self.loader = RuleLoader::new(registry);
        self
    }

    /// Require a different format tag.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Set execution options.
    pub fn with_options(mut self, options: ExecutionOptions) -> Self {
        self.executor = RuleExecutor::with_options(options);
        self
    }

    /// The common rule directory.
    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }

    /// The loader used for the common rules.
    pub fn loader(&self) -> &RuleLoader {
        &self.loader
    }

    /// Check the manifest envelope before any rule runs.
    pub fn check_preconditions<'a>(&self, info: &'a ManifestInfo) -> ValidatorResult<&'a Manifest> {
        let manifest = info.content.as_ref().ok_or(ValidatorError::EmptyDocument)?;
        if info.format != self.format {
            return Err(ValidatorError::WrongFormat {
                expected: self.format.clone(),
                found: info.format.clone(),
            });
        }
        Ok(manifest)
    }

    /// Validate a manifest against the common rules and every platform source.
    pub fn validate<S: AsRef<str>>(
        &self,
        info: &ManifestInfo,
        sources: &[SharedSource],
        platforms: &[S],
    ) -> ValidatorResult<ValidationReport> {
        let manifest = self.check_preconditions(info)?;
        let platforms: Vec<String> = platforms.iter().map(|p| p.as_ref().to_string()).collect();
        let start = Instant::now();
        let mut report = ValidationReport::default();

        let common = self.loader.load(&self.rules_dir, &platforms)?;
        debug!("Loaded {} common rule(s) from {}", common.len(), self.rules_dir.display());
        report.absorb(self.executor.run_on(manifest, &common));

        let outcomes: Vec<RunOutcome> = sources
            .par_iter()
            .map(|source| self.run_platform(source.as_ref(), manifest, &platforms))
            .collect();
        for outcome in outcomes {
            report.absorb(outcome);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Validation finished in {}ms: {} record(s) from {} rule(s), {} failure(s)",
            report.duration_ms,
            report.results.len(),
            report.rules_run,
            report.failures.len()
        );
        Ok(report)
    }

    fn run_platform(
        &self,
        source: &dyn PlatformRuleSource,
        manifest: &Manifest,
        platforms: &[String],
    ) -> RunOutcome {
        match source.validation_rules(platforms) {
            Ok(rules) => {
                debug!("Platform '{}' supplied {} rule(s)", source.platform(), rules.len());
                self.executor.run_on(manifest, &rules)
            }
            Err(error) => {
                warn!("{}", error);
                RunOutcome::default()
            }
        }
    }
}

impl Default for ManifestValidator {
    fn default() -> Self {
        Self::new(BUNDLED_RULES_DIR)
    }
}

/// Validate `info` with the bundled common rules and the given platform sources.
///
/// The bundled directory is [`BUNDLED_RULES_DIR`], resolved at compile time.
/// Outside the source checkout it fails with
/// [`ValidatorError::DirectoryRead`]; use [`ManifestValidator::new`] with an
/// explicit directory there.
pub fn validate_manifest<S: AsRef<str>>(
    info: &ManifestInfo,
    sources: &[SharedSource],
    platforms: &[S],
) -> ValidatorResult<Vec<ResultRecord>> {
    ManifestValidator::default()
        .validate(info, sources, platforms)
        .map(ValidationReport::into_results)
}
