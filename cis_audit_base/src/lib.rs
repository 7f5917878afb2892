//! # CIS Audit - Windows Security Baseline Evaluation
//!
//! Evaluates a declarative catalog of CIS benchmark rules against a registry-like
//! configuration store and reduces the outcomes to a compliant/non-compliant verdict.

pub mod api;
pub mod catalog;
pub mod constraints;
pub mod execution;
pub mod os_version;
pub mod results;
pub mod store;

// Convenience re-exports
pub use api::*;

pub mod prelude {
    pub use crate::api::{
        AuditConfig, AuditReport, Auditor, AuditorError, Backend, ConfigError, OutputFormat,
    };

    pub use crate::catalog::{
        Applicability, Catalog, CatalogError, GroupKind, Rule, RuleGroup, RuleId, Scope,
    };
    pub use crate::constraints::{evaluate_integer, evaluate_string, Constraint};

    pub use crate::execution::{
        baseline_store, evaluate_group, AggregateReport, AuditEngine, AuditError, AuditRun,
        AuditTarget, CancellationToken, FailureReason, OverallStatus, ResultAggregator,
        RuleOutcome, RunResults,
    };
    pub use crate::os_version::{detect_os_version, OsVersion};
    pub use crate::results::{ComplianceFinding, FindingSeverity, ResultGenerator, ScanResult};

    pub use crate::store::{
        ConfigStore, MemoryStore, RegQueryStore, RegistryValue, RootKey, StoreError, StoreKey,
        StoreSnapshot,
    };
}
