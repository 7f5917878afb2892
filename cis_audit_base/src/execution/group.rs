//! Single-group evaluation
//!
//! A group opens its path once, reads every setting through the same handle and releases
//! the handle before returning. Nothing here returns an error: every failure is folded
//! into the outcome of the affected rule.

use crate::catalog::{Rule, RuleGroup, RuleId};
use crate::constraints::{evaluate_observed, Evaluation, Observed, ValueKind};
use crate::store::{ConfigStore, RootKey, StoreError, StoreKey};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a rule did not pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    PathNotFound,
    AccessDenied,
    ValueMissing,
    TypeMismatch,
    ConstraintNotMet,
    /// Catalog defect: the constraint does not fit the value shape
    UnsupportedConstraint,
    StoreFailure(String),
}

impl FailureReason {
    pub fn from_store_error(error: &StoreError) -> Self {
        match error {
            StoreError::PathNotFound { .. } => FailureReason::PathNotFound,
            StoreError::AccessDenied { .. } => FailureReason::AccessDenied,
            StoreError::ValueMissing { .. } => FailureReason::ValueMissing,
            StoreError::ValueTypeMismatch { .. } => FailureReason::TypeMismatch,
            other => FailureReason::StoreFailure(other.to_string()),
        }
    }

    /// The setting was not found at all (path or value absent)
    pub fn is_absence(&self) -> bool {
        matches!(self, FailureReason::PathNotFound | FailureReason::ValueMissing)
    }

    pub fn is_catalog_defect(&self) -> bool {
        matches!(self, FailureReason::UnsupportedConstraint)
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::PathNotFound => f.write_str("path not found"),
            FailureReason::AccessDenied => f.write_str("access denied"),
            FailureReason::ValueMissing => f.write_str("value missing"),
            FailureReason::TypeMismatch => f.write_str("unexpected value type"),
            FailureReason::ConstraintNotMet => f.write_str("value does not satisfy constraint"),
            FailureReason::UnsupportedConstraint => f.write_str("unsupported constraint"),
            FailureReason::StoreFailure(detail) => write!(f, "store failure: {}", detail),
        }
    }
}

/// Evaluation outcome of one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule_id: RuleId,
    pub path: String,
    pub setting: String,
    /// Display form of the constraint
    pub expected: String,
    pub actual: Option<String>,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
}

impl RuleOutcome {
    fn passed(rule: &Rule, observed: &Observed) -> Self {
        Self {
            rule_id: rule.id.clone(),
            path: rule.path.clone(),
            setting: rule.setting.clone(),
            expected: rule.constraint.to_string(),
            actual: Some(observed.to_string()),
            passed: true,
            failure: None,
        }
    }

    fn failed(rule: &Rule, observed: Option<&Observed>, reason: FailureReason) -> Self {
        Self {
            rule_id: rule.id.clone(),
            path: rule.path.clone(),
            setting: rule.setting.clone(),
            expected: rule.constraint.to_string(),
            actual: observed.map(ToString::to_string),
            passed: false,
            failure: Some(reason),
        }
    }
}

/// Evaluate every rule of `group` against `root`
pub fn evaluate_group(
    store: &dyn ConfigStore,
    root: &RootKey,
    group: &RuleGroup,
) -> Vec<RuleOutcome> {
    debug!(
        "Evaluating group '{}' ({} rules) at {}\\{}",
        group.name(),
        group.rules().len(),
        root,
        group.path()
    );

    let key = match store.open_path(root, group.path()) {
        Ok(key) => key,
        Err(e) => {
            warn!("Group '{}': {}", group.name(), e);
            let reason = FailureReason::from_store_error(&e);
            return group
                .rules()
                .iter()
                .map(|rule| RuleOutcome::failed(rule, None, reason.clone()))
                .collect();
        }
    };

    group
        .rules()
        .iter()
        .map(|rule| evaluate_rule(key.as_ref(), rule))
        .collect()
}

fn evaluate_rule(key: &dyn StoreKey, rule: &Rule) -> RuleOutcome {
    let read = match rule.constraint.value_kind() {
        ValueKind::Integer => key.get_integer(&rule.setting).map(Observed::Integer),
        ValueKind::String => key.get_string(&rule.setting).map(Observed::Text),
    };

    let observed = match read {
        Ok(observed) => observed,
        Err(e) => {
            warn!("Rule '{}': {}", rule.id, e);
            return RuleOutcome::failed(rule, None, FailureReason::from_store_error(&e));
        }
    };

    match evaluate_observed(&observed, &rule.constraint) {
        Evaluation::Satisfied => RuleOutcome::passed(rule, &observed),
        Evaluation::NotSatisfied => {
            debug!(
                "Rule '{}' failed: {} is not {}",
                rule.id, observed, rule.constraint
            );
            RuleOutcome::failed(rule, Some(&observed), FailureReason::ConstraintNotMet)
        }
        Evaluation::ShapeMismatch => {
            RuleOutcome::failed(rule, Some(&observed), FailureReason::UnsupportedConstraint)
        }
    }
}
