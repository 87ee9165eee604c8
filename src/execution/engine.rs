//! Rule execution engine.
//!
//! Runs a list of rules against one manifest and waits for every rule to
//! settle. A rule that errors or panics is recorded as a failure and logged;
//! it never cancels its siblings. There is no timeout: a rule that never
//! returns stalls the run.

use crate::core::error::RuleError;
use crate::core::manifest::{Manifest, ManifestInfo};
use crate::core::result::ResultRecord;
use crate::core::rule::SharedRule;
use crate::execution::sink::{ResultSink, RunOutcome};
use log::{debug, warn};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Execution options.
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Whether to evaluate rules in parallel.
    pub parallel: bool,
    /// Maximum number of worker threads (0 = rayon's global pool).
    pub max_threads: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_threads: 0,
        }
    }
}

impl ExecutionOptions {
    /// Create a new options builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable/disable parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set maximum threads.
    pub fn with_max_threads(mut self, max: usize) -> Self {
        self.max_threads = max;
        self
    }
}

/// Executes rule lists.
#[derive(Clone)]
pub struct RuleExecutor {
    options: ExecutionOptions,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl RuleExecutor {
    /// Create an executor with default options.
    pub fn new() -> Self {
        Self::with_options(ExecutionOptions::default())
    }

    /// Create an executor with the given options.
    ///
    /// A dedicated pool is built when `max_threads` is non-zero; if that
    /// fails the global pool is used instead.
    pub fn with_options(options: ExecutionOptions) -> Self {
        let pool = if options.parallel && options.max_threads > 0 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(options.max_threads)
                .thread_name(|i| format!("rule-worker-{}", i))
                .build()
            {
                Ok(pool) => Some(Arc::new(pool)),
                Err(e) => {
                    warn!("Could not build a {}-thread rule pool, using the global pool: {}", options.max_threads, e);
                    None
                }
            }
        } else {
            None
        };

        Self { options, pool }
    }

    /// The options this executor runs with.
    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Run `rules` against the manifest in `info`.
    ///
    /// Without content every rule is recorded as failed.
    pub fn run(&self, info: &ManifestInfo, rules: &[SharedRule]) -> RunOutcome {
        match &info.content {
            Some(manifest) => self.run_on(manifest, rules),
            None => {
                let sink = ResultSink::new();
                for rule in rules {
                    sink.record_failure(rule.name(), RuleError::failed("manifest has no content"));
                }
                sink.into_outcome(rules.len())
            }
        }
    }

    /// Run `rules` against `manifest`.
    pub fn run_on(&self, manifest: &Manifest, rules: &[SharedRule]) -> RunOutcome {
        let start = Instant::now();
        let sink = ResultSink::new();

        if self.options.parallel {
            let fan_out = || {
                rules
                    .par_iter()
                    .for_each(|rule| execute_rule(rule, manifest, &sink));
            };
            match &self.pool {
                Some(pool) => pool.install(fan_out),
                None => fan_out(),
            }
        } else {
            for rule in rules {
                execute_rule(rule, manifest, &sink);
            }
        }

        let outcome = sink.into_outcome(rules.len());
        debug!(
            "Ran {} rule(s) in {}ms: {} record(s), {} failure(s)",
            outcome.rules_run,
            start.elapsed().as_millis(),
            outcome.results.len(),
            outcome.failures.len()
        );
        outcome
    }
}

impl Default for RuleExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate one rule and settle it into the sink.
fn execute_rule(rule: &SharedRule, manifest: &Manifest, sink: &ResultSink) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(manifest)))
        .unwrap_or_else(|payload| Err(RuleError::Panicked(panic_message(payload.as_ref()))));

    match outcome {
        Ok(records) => sink.extend(records),
        Err(error) => {
            warn!("Rule '{}' failed: {}", rule.name(), error);
            sink.record_failure(rule.name(), error);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run `rules` against `info` with default options, returning only the records.
///
/// Failures are logged by the executor and not returned.
pub fn run_validation_rules(info: &ManifestInfo, rules: &[SharedRule]) -> Vec<ResultRecord> {
    RuleExecutor::new().run(info, rules).results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::result::Level;
    use crate::core::rule::FnRule;

    fn record(platform: &str) -> ResultRecord {
        ResultRecord::new("d", platform, Level::Error, "name", "requiredValue")
    }

    fn sample_rules() -> Vec<SharedRule> {
        vec![
            FnRule::shared("one", |_| Ok(vec![record("web")])),
            FnRule::shared("two", |_| Ok(vec![record("web"), record("web")])),
            FnRule::shared("none", |_| Ok(Vec::new())),
            FnRule::shared("error", |_| Err(RuleError::failed("bad input"))),
            FnRule::shared("panic", |_| panic!("rule exploded")),
        ]
    }

    #[test]
    fn test_collects_records_and_isolates_failures() {
        let info = ManifestInfo::w3c(Manifest::default());
        let outcome = RuleExecutor::new().run(&info, &sample_rules());

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.rules_run, 5);
        assert_eq!(outcome.failures.len(), 2);

        let mut failed: Vec<&str> = outcome.failures.iter().map(|f| f.rule.as_str()).collect();
        failed.sort();
        assert_eq!(failed, vec!["error", "panic"]);

        let panicked = outcome.failures.iter().find(|f| f.rule == "panic").unwrap();
        assert_eq!(panicked.error, RuleError::Panicked("rule exploded".to_string()));
    }

    #[test]
    fn test_sequential_matches_parallel_counts() {
        let info = ManifestInfo::w3c(Manifest::default());
        let executor = RuleExecutor::with_options(ExecutionOptions::new().with_parallel(false));
        let outcome = executor.run(&info, &sample_rules());

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.failures.len(), 2);
    }

    #[test]
    fn test_dedicated_pool() {
        let info = ManifestInfo::w3c(Manifest::default());
        let executor = RuleExecutor::with_options(ExecutionOptions::new().with_max_threads(2));
        assert_eq!(executor.options().max_threads, 2);
        assert_eq!(executor.run(&info, &sample_rules()).results.len(), 3);
    }

    #[test]
    fn test_empty_rule_list() {
        let info = ManifestInfo::w3c(Manifest::default());
        assert!(run_validation_rules(&info, &[]).is_empty());
    }

    #[test]
    fn test_missing_content_fails_every_rule() {
        let info = ManifestInfo::empty("w3c");
        let outcome = RuleExecutor::new().run(&info, &sample_rules());
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.failures.len(), 5);
    }

    #[test]
    fn test_options_builder() {
        let options = ExecutionOptions::new().with_parallel(false).with_max_threads(4);
        assert!(!options.parallel);
        assert_eq!(options.max_threads, 4);
    }
}
