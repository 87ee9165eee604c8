//! Rule execution.
//!
//! Fans rules out over rayon and collects their records.

pub mod engine;
pub mod sink;

pub use engine::{run_validation_rules, ExecutionOptions, RuleExecutor};
pub use sink::{ResultSink, RuleFailure, RunOutcome};
