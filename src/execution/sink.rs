//! Accumulator shared by the rules of one run.

use crate::core::error::RuleError;
use crate::core::result::ResultRecord;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// A rule that settled with an error instead of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFailure {
    /// Name of the failing rule.
    pub rule: String,
    /// What went wrong.
    pub error: RuleError,
}

/// Everything one executor run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Records in completion order.
    pub results: Vec<ResultRecord>,
    /// Rules that failed.
    pub failures: Vec<RuleFailure>,
    /// Number of rules invoked.
    pub rules_run: usize,
}

impl RunOutcome {
    /// Append another outcome to this one.
    pub fn merge(&mut self, other: RunOutcome) {
        self.results.extend(other.results);
        self.failures.extend(other.failures);
        self.rules_run += other.rules_run;
    }
}

/// Collects records and failures from concurrently running rules.
///
/// Appends are serialized by the lock; ordering across rules follows
/// completion order.
#[derive(Debug, Default)]
pub struct ResultSink {
    results: Mutex<Vec<ResultRecord>>,
    failures: Mutex<Vec<RuleFailure>>,
}

impl ResultSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append all records produced by one rule.
    pub fn extend(&self, records: Vec<ResultRecord>) {
        if records.is_empty() {
            return;
        }
        self.results.lock().extend(records);
    }

    /// Record a failed rule.
    pub fn record_failure(&self, rule: impl Into<String>, error: RuleError) {
        self.failures.lock().push(RuleFailure {
            rule: rule.into(),
            error,
        });
    }

    /// Number of records collected so far.
    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    /// Whether no records have been collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the sink once all producers have settled.
    pub fn into_outcome(self, rules_run: usize) -> RunOutcome {
        RunOutcome {
            results: self.results.into_inner(),
            failures: self.failures.into_inner(),
            rules_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::result::Level;

    #[test]
    fn test_sink_collects_records_and_failures() {
        let sink = ResultSink::new();
        sink.extend(vec![ResultRecord::new("d", "web", Level::Error, "name", "requiredValue")]);
        sink.extend(Vec::new());
        sink.record_failure("broken", RuleError::failed("boom"));

        assert_eq!(sink.len(), 1);
        let outcome = sink.into_outcome(3);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.failures[0].rule, "broken");
        assert_eq!(outcome.rules_run, 3);
    }

    #[test]
    fn test_outcome_merge() {
        let mut first = RunOutcome {
            rules_run: 1,
            ..RunOutcome::default()
        };
        let second = RunOutcome {
            results: vec![ResultRecord::new("d", "ios", Level::Warning, "icons", "missingImage")],
            failures: Vec::new(),
            rules_run: 2,
        };
        first.merge(second);

        assert_eq!(first.results.len(), 1);
        assert_eq!(first.rules_run, 3);
    }
}
