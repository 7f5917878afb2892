//! # Audit Execution
//!
//! Group evaluation, per-run aggregation and the engine that drives a full audit.

pub mod aggregator;
pub mod baseline;
pub mod cancel;
pub mod engine;
pub mod error;
pub mod group;

pub use aggregator::{
    AggregateReport, OverallStatus, ResultAggregator, RunResults, COMPLIANT_MESSAGE,
    NON_COMPLIANT_MESSAGE,
};
pub use baseline::baseline_store;
pub use cancel::CancellationToken;
pub use engine::{AuditEngine, AuditRun, AuditTarget};
pub use error::AuditError;
pub use group::{evaluate_group, FailureReason, RuleOutcome};
