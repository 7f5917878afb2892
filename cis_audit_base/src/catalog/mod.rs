//! # Rule Catalog
//!
//! Declarative CIS baseline rules grouped by registry path. Each group is bound to one key
//! and evaluated against either the machine root or the user root; some groups only apply
//! to a specific Windows release.

pub mod error;
mod machine;
mod misc;
mod os_specific;
mod services;
mod user;

pub use error::CatalogError;

use crate::constraints::Constraint;
use crate::os_version::OsVersion;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Rules
// ============================================================================

/// Synthetic rule identifier: `<group>.<setting>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(group: &str, setting: &str) -> Self {
        Self(format!("{}.{}", group, setting))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One auditable `(path, setting, constraint)` fact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub path: String,
    pub setting: String,
    pub constraint: Constraint,
}

// ============================================================================
// Groups
// ============================================================================

/// Which root a group is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Machine,
    User,
}

/// OS gate of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    Always,
    Windows10,
    Windows11,
}

impl Applicability {
    pub fn applies_to(self, os: OsVersion) -> bool {
        match self {
            Applicability::Always => true,
            Applicability::Windows10 => os.major() == 10,
            Applicability::Windows11 => os.major() == 11,
        }
    }
}

/// Category of a group, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    MachinePolicy,
    UserPolicy,
    Service,
    Miscellaneous,
    Windows10Only,
    Windows11Only,
}

impl GroupKind {
    /// All kinds in the order the engine evaluates them
    pub const ALL: [GroupKind; 6] = [
        GroupKind::MachinePolicy,
        GroupKind::UserPolicy,
        GroupKind::Service,
        GroupKind::Miscellaneous,
        GroupKind::Windows10Only,
        GroupKind::Windows11Only,
    ];

    pub fn scope(self) -> Scope {
        match self {
            GroupKind::UserPolicy => Scope::User,
            _ => Scope::Machine,
        }
    }

    pub fn applicability(self) -> Applicability {
        match self {
            GroupKind::Windows10Only => Applicability::Windows10,
            GroupKind::Windows11Only => Applicability::Windows11,
            _ => Applicability::Always,
        }
    }

    pub fn applies_to(self, os: OsVersion) -> bool {
        self.applicability().applies_to(os)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GroupKind::MachinePolicy => "machine_policy",
            GroupKind::UserPolicy => "user_policy",
            GroupKind::Service => "service",
            GroupKind::Miscellaneous => "miscellaneous",
            GroupKind::Windows10Only => "windows10_only",
            GroupKind::Windows11Only => "windows11_only",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        GroupKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| CatalogError::UnknownGroupKind(s.to_string()))
    }
}

/// Named set of rules sharing one registry path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleGroup {
    name: String,
    kind: GroupKind,
    path: String,
    benchmark_refs: Vec<String>,
    rules: Vec<Rule>,
}

impl RuleGroup {
    pub fn new(name: &str, kind: GroupKind, path: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            path: path.to_string(),
            benchmark_refs: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Attach a benchmark recommendation number (metadata only)
    pub fn benchmark(mut self, reference: &str) -> Self {
        self.benchmark_refs.push(reference.to_string());
        self
    }

    /// Add a rule for `setting` under this group's path
    pub fn rule(mut self, setting: &str, constraint: Constraint) -> Self {
        self.rules.push(Rule {
            id: RuleId::new(&self.name, setting),
            path: self.path.clone(),
            setting: setting.to_string(),
            constraint,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn scope(&self) -> Scope {
        self.kind.scope()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn benchmark_refs(&self) -> &[String] {
        &self.benchmark_refs
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Validated, immutable collection of rule groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    groups: Vec<RuleGroup>,
}

impl Catalog {
    /// Build a catalog, rejecting authoring defects
    pub fn new(groups: Vec<RuleGroup>) -> Result<Self, CatalogError> {
        let catalog = Self { groups };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The full CIS baseline for Windows 10/11
    pub fn cis_baseline() -> Result<Self, CatalogError> {
        let mut groups = Vec::new();
        groups.extend(machine::groups());
        groups.extend(user::groups());
        groups.extend(services::groups());
        groups.extend(misc::groups());
        groups.extend(os_specific::windows10_groups());
        groups.extend(os_specific::windows11_groups());
        Self::new(groups)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut group_names = HashSet::new();
        let mut rule_owners: HashMap<&RuleId, &str> = HashMap::new();

        for group in &self.groups {
            if !group_names.insert(group.name()) {
                return Err(CatalogError::DuplicateGroup(group.name().to_string()));
            }
            if group.path().trim_matches('\\').is_empty() {
                return Err(CatalogError::EmptyPath(group.name().to_string()));
            }
            if group.rules().is_empty() {
                return Err(CatalogError::EmptyGroup(group.name().to_string()));
            }

            for rule in group.rules() {
                if let Some(first) = rule_owners.insert(&rule.id, group.name()) {
                    return Err(CatalogError::DuplicateRuleId {
                        rule_id: rule.id.to_string(),
                        first_group: first.to_string(),
                        second_group: group.name().to_string(),
                    });
                }
                if let Some(problem) = rule.constraint.authoring_problem() {
                    return Err(CatalogError::InvalidConstraint {
                        rule_id: rule.id.to_string(),
                        problem,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    /// Groups of one kind, in catalog order
    pub fn groups_of(&self, kind: GroupKind) -> impl Iterator<Item = &RuleGroup> {
        self.groups.iter().filter(move |group| group.kind() == kind)
    }

    pub fn group(&self, name: &str) -> Option<&RuleGroup> {
        self.groups.iter().find(|group| group.name() == name)
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.groups.iter().flat_map(|group| group.rules().iter())
    }

    pub fn find_rule(&self, id: &RuleId) -> Option<&Rule> {
        self.rules().find(|rule| &rule.id == id)
    }

    /// Group that owns the rule `id`
    pub fn group_of(&self, id: &RuleId) -> Option<&RuleGroup> {
        self.groups
            .iter()
            .find(|group| group.rules().iter().any(|rule| &rule.id == id))
    }

    pub fn rule_count(&self) -> usize {
        self.groups.iter().map(|group| group.rules().len()).sum()
    }

    /// Number of rules evaluated for the given OS
    pub fn applicable_rule_count(&self, os: OsVersion) -> usize {
        self.groups
            .iter()
            .filter(|group| group.kind().applies_to(os))
            .map(|group| group.rules().len())
            .sum()
    }
}
