//! Per-run result aggregation

use crate::catalog::RuleId;
use crate::execution::group::RuleOutcome;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const COMPLIANT_MESSAGE: &str = "The system complies with the security baseline.";
pub const NON_COMPLIANT_MESSAGE: &str =
    "The system does not comply with the security baseline. Review the failed settings.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Compliant,
    NonCompliant,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallStatus::Compliant => f.write_str("Compliant"),
            OverallStatus::NonCompliant => f.write_str("NonCompliant"),
        }
    }
}

/// The minimal result of a run: a verdict and a fixed message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub overall: OverallStatus,
    pub message: String,
}

impl AggregateReport {
    pub fn from_status(overall: OverallStatus) -> Self {
        let message = match overall {
            OverallStatus::Compliant => COMPLIANT_MESSAGE,
            OverallStatus::NonCompliant => NON_COMPLIANT_MESSAGE,
        };
        Self {
            overall,
            message: message.to_string(),
        }
    }

    pub fn is_compliant(&self) -> bool {
        self.overall == OverallStatus::Compliant
    }
}

/// Per-rule outcomes of a finished run, in evaluation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunResults {
    outcomes: Vec<RuleOutcome>,
}

impl RunResults {
    pub fn get(&self, id: &RuleId) -> Option<&RuleOutcome> {
        self.outcomes.iter().find(|o| &o.rule_id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.passed_count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Collects rule outcomes for a single run
///
/// A fresh aggregator is created for every run so concurrent runs never share state.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    outcomes: Vec<RuleOutcome>,
    index: HashMap<RuleId, usize>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record outcomes; a repeated rule id replaces the earlier outcome
    pub fn record(&mut self, outcomes: impl IntoIterator<Item = RuleOutcome>) {
        for outcome in outcomes {
            match self.index.get(&outcome.rule_id) {
                Some(&slot) => {
                    warn!("Rule '{}' recorded twice; keeping the latest outcome", outcome.rule_id);
                    self.outcomes[slot] = outcome;
                }
                None => {
                    self.index.insert(outcome.rule_id.clone(), self.outcomes.len());
                    self.outcomes.push(outcome);
                }
            }
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Logical AND over every recorded outcome
    pub fn overall(&self) -> OverallStatus {
        if self.outcomes.iter().all(|o| o.passed) {
            OverallStatus::Compliant
        } else {
            OverallStatus::NonCompliant
        }
    }

    pub fn report(&self) -> AggregateReport {
        AggregateReport::from_status(self.overall())
    }

    pub fn into_results(self) -> RunResults {
        RunResults {
            outcomes: self.outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::group::FailureReason;

    fn outcome(id: &str, passed: bool) -> RuleOutcome {
        RuleOutcome {
            rule_id: RuleId::from(id),
            path: r"SOFTWARE\Test".to_string(),
            setting: id.to_string(),
            expected: "== 1".to_string(),
            actual: passed.then(|| "1".to_string()),
            passed,
            failure: (!passed).then_some(FailureReason::ValueMissing),
        }
    }

    #[test]
    fn test_all_passing_is_compliant() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record((0..50).map(|i| outcome(&format!("g.r{}", i), true)));

        assert_eq!(aggregator.overall(), OverallStatus::Compliant);
        assert_eq!(aggregator.report().message, COMPLIANT_MESSAGE);
    }

    #[test]
    fn test_single_failure_anywhere_is_non_compliant() {
        for position in [0, 17, 49] {
            let mut aggregator = ResultAggregator::new();
            aggregator.record((0..50).map(|i| outcome(&format!("g.r{}", i), i != position)));

            let report = aggregator.report();
            assert_eq!(report.overall, OverallStatus::NonCompliant);
            assert_eq!(report.message, NON_COMPLIANT_MESSAGE);
            assert_eq!(aggregator.failed(), 1);
        }
    }

    #[test]
    fn test_repeated_id_last_write_wins() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record([outcome("g.a", false), outcome("g.b", true)]);
        aggregator.record([outcome("g.a", true)]);

        assert_eq!(aggregator.total(), 2);
        assert_eq!(aggregator.overall(), OverallStatus::Compliant);

        let results = aggregator.into_results();
        assert_eq!(results.iter().next().unwrap().rule_id.as_str(), "g.a");
        assert!(results.get(&RuleId::from("g.a")).unwrap().passed);
    }

    #[test]
    fn test_empty_run_is_compliant() {
        let aggregator = ResultAggregator::new();
        assert_eq!(aggregator.overall(), OverallStatus::Compliant);
        assert!(aggregator.into_results().is_empty());
    }

    #[test]
    fn test_run_results_counts() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record([outcome("g.a", true), outcome("g.b", false), outcome("g.c", false)]);
        let results = aggregator.into_results();

        assert_eq!(results.len(), 3);
        assert_eq!(results.passed_count(), 1);
        assert_eq!(results.failed_count(), 2);
        assert_eq!(results.failures().count(), 2);
    }
}
