// src/catalog/error.rs
//! Catalog authoring errors

/// Defects detected while assembling a rule catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Duplicate rule id '{rule_id}' (groups '{first_group}' and '{second_group}')")]
    DuplicateRuleId {
        rule_id: String,
        first_group: String,
        second_group: String,
    },

    #[error("Duplicate group name '{0}'")]
    DuplicateGroup(String),

    #[error("Group '{0}' has no rules")]
    EmptyGroup(String),

    #[error("Group '{0}' has an empty path")]
    EmptyPath(String),

    #[error("Rule '{rule_id}' has an invalid constraint: {problem}")]
    InvalidConstraint { rule_id: String, problem: String },

    #[error("Unknown group kind '{0}'")]
    UnknownGroupKind(String),
}
