//! # Rule Constraints
//!
//! Acceptance specification for an observed registry value. The shape of a constraint is
//! fixed when the rule is authored; evaluation never has to guess what a parameter means.

pub mod evaluate;

pub use evaluate::{evaluate_integer, evaluate_observed, evaluate_string, Evaluation, Observed};

use crate::store::RegistryValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expected value of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Integer equal to the given value
    ExactInteger(u64),
    /// Inclusive integer range; `max: None` means no upper bound
    IntegerRange { min: u64, max: Option<u64> },
    /// Integer contained in the set
    IntegerSet(Vec<u64>),
    /// Case-sensitive string equality
    ExactString(String),
}

/// How the observed value has to be read from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    String,
}

impl Constraint {
    pub fn exact(value: u64) -> Self {
        Constraint::ExactInteger(value)
    }

    /// Inclusive range `min..=max`
    pub fn range(min: u64, max: u64) -> Self {
        Constraint::IntegerRange {
            min,
            max: Some(max),
        }
    }

    /// `min` or greater
    pub fn at_least(min: u64) -> Self {
        Constraint::IntegerRange { min, max: None }
    }

    pub fn one_of(values: &[u64]) -> Self {
        Constraint::IntegerSet(values.to_vec())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Constraint::ExactString(value.into())
    }

    /// Which typed read this constraint needs
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Constraint::ExactString(_) => ValueKind::String,
            _ => ValueKind::Integer,
        }
    }

    /// Authoring problems that would make the constraint unsatisfiable
    pub fn authoring_problem(&self) -> Option<String> {
        match self {
            Constraint::IntegerRange { min, max: Some(max) } if min > max => {
                Some(format!("inverted range [{}, {}]", min, max))
            }
            Constraint::IntegerSet(values) if values.is_empty() => {
                Some("empty value set".to_string())
            }
            _ => None,
        }
    }

    /// A registry value that satisfies this constraint
    ///
    /// Integers that fit in 32 bits are produced as DWORDs, larger ones as QWORDs.
    pub fn satisfying_value(&self) -> Option<RegistryValue> {
        let integer = |v: u64| match u32::try_from(v) {
            Ok(small) => RegistryValue::Dword(small),
            Err(_) => RegistryValue::Qword(v),
        };

        match self {
            Constraint::ExactInteger(v) => Some(integer(*v)),
            Constraint::IntegerRange { min, max } => match max {
                Some(max) if max < min => None,
                _ => Some(integer(*min)),
            },
            Constraint::IntegerSet(values) => values.first().copied().map(integer),
            Constraint::ExactString(s) => Some(RegistryValue::String(s.clone())),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::ExactInteger(v) => write!(f, "== {}", v),
            Constraint::IntegerRange { min, max: Some(max) } => write!(f, "in [{}, {}]", min, max),
            Constraint::IntegerRange { min, max: None } => write!(f, ">= {}", min),
            Constraint::IntegerSet(values) => {
                let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "one of {{{}}}", joined.join(", "))
            }
            Constraint::ExactString(s) => write!(f, "== \"{}\"", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Constraint::exact(1).to_string(), "== 1");
        assert_eq!(Constraint::range(0, 90).to_string(), "in [0, 90]");
        assert_eq!(Constraint::at_least(16384).to_string(), ">= 16384");
        assert_eq!(Constraint::one_of(&[1, 2]).to_string(), "one of {1, 2}");
        assert_eq!(Constraint::text("Block").to_string(), "== \"Block\"");
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(Constraint::exact(0).value_kind(), ValueKind::Integer);
        assert_eq!(Constraint::one_of(&[0]).value_kind(), ValueKind::Integer);
        assert_eq!(Constraint::text("0").value_kind(), ValueKind::String);
    }

    #[test]
    fn test_authoring_problems() {
        assert!(Constraint::range(5, 1).authoring_problem().is_some());
        assert!(Constraint::one_of(&[]).authoring_problem().is_some());
        assert!(Constraint::range(1, 1).authoring_problem().is_none());
        assert!(Constraint::at_least(u64::MAX).authoring_problem().is_none());
    }

    #[test]
    fn test_satisfying_value_satisfies() {
        let constraints = [
            Constraint::exact(2_147_483_640),
            Constraint::range(1, 900),
            Constraint::at_least(196_608),
            Constraint::one_of(&[2, 3]),
            Constraint::exact(u64::from(u32::MAX) + 1),
            Constraint::text("RequireMutualAuthentication=1, RequireIntegrity=1"),
        ];

        for constraint in &constraints {
            let value = constraint.satisfying_value().unwrap();
            let observed = match constraint.value_kind() {
                ValueKind::Integer => Observed::Integer(value.as_integer().unwrap()),
                ValueKind::String => Observed::Text(value.as_string().unwrap()),
            };
            assert_eq!(
                evaluate_observed(&observed, constraint),
                Evaluation::Satisfied,
                "{} not satisfied by {}",
                constraint,
                value
            );
        }
    }

    #[test]
    fn test_satisfying_value_width() {
        assert_eq!(
            Constraint::exact(4).satisfying_value(),
            Some(RegistryValue::Dword(4))
        );
        assert_eq!(
            Constraint::exact(1 << 40).satisfying_value(),
            Some(RegistryValue::Qword(1 << 40))
        );
        assert_eq!(Constraint::range(9, 3).satisfying_value(), None);
    }
}
