//! Constraint evaluation
//!
//! Every function here is fail-closed: anything that cannot be matched evaluates to
//! `false`. Shape mismatches are catalog defects and are logged, never returned as errors.

use crate::constraints::Constraint;
use log::error;
use std::fmt;

/// A value read from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Integer(u64),
    Text(String),
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observed::Integer(v) => write!(f, "{}", v),
            Observed::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Outcome of matching an observed value against a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Satisfied,
    NotSatisfied,
    /// The constraint cannot be applied to this kind of value
    ShapeMismatch,
}

impl Evaluation {
    pub fn passed(self) -> bool {
        matches!(self, Evaluation::Satisfied)
    }

    fn from_bool(passed: bool) -> Self {
        if passed {
            Evaluation::Satisfied
        } else {
            Evaluation::NotSatisfied
        }
    }
}

/// Check an integer against a constraint
pub fn evaluate_integer(actual: u64, constraint: &Constraint) -> bool {
    match constraint {
        Constraint::ExactInteger(expected) => actual == *expected,
        Constraint::IntegerRange { min, max } => {
            *min <= actual && max.map_or(true, |max| actual <= max)
        }
        Constraint::IntegerSet(values) => values.contains(&actual),
        Constraint::ExactString(expected) => {
            error!(
                "Catalog defect: integer {} checked against string constraint \"{}\"",
                actual, expected
            );
            false
        }
    }
}

/// Exact, case-sensitive string comparison
pub fn evaluate_string(actual: &str, expected: &str) -> bool {
    actual == expected
}

/// Check any observed value, reporting shape mismatches separately
pub fn evaluate_observed(observed: &Observed, constraint: &Constraint) -> Evaluation {
    match (observed, constraint) {
        (Observed::Text(actual), Constraint::ExactString(expected)) => {
            Evaluation::from_bool(evaluate_string(actual, expected))
        }
        (Observed::Integer(_), Constraint::ExactString(_)) | (Observed::Text(_), _) => {
            error!(
                "Catalog defect: constraint {} cannot be applied to value {}",
                constraint, observed
            );
            Evaluation::ShapeMismatch
        }
        (Observed::Integer(actual), _) => {
            Evaluation::from_bool(evaluate_integer(*actual, constraint))
        }
    }
}
