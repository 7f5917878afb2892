// src/results/error.rs

/// Failures while turning an audit run into a report
#[derive(Debug, thiserror::Error)]
pub enum ResultGenerationError {
    #[error("Outcome for rule '{rule_id}' has no matching catalog rule")]
    UnknownRule { rule_id: String },

    #[error("Rule count {count} does not fit the report format")]
    InvalidRuleCount { count: usize },
}
