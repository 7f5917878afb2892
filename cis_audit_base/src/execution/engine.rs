//! # Audit Engine
//!
//! Walks the catalog in a fixed order (machine policy, user policy, services,
//! miscellaneous, then the release-specific groups) and folds every outcome into a
//! per-run aggregator. A run fails only when one of its roots cannot be used at all.

use crate::catalog::{Catalog, GroupKind, Scope};
use crate::execution::aggregator::{AggregateReport, ResultAggregator, RunResults};
use crate::execution::cancel::CancellationToken;
use crate::execution::error::AuditError;
use crate::execution::group::evaluate_group;
use crate::os_version::OsVersion;
use crate::store::{ConfigStore, RootKey};
use chrono::{DateTime, Utc};
use log::{debug, info};

/// Roots and OS release an audit runs against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTarget {
    pub machine_root: RootKey,
    pub user_root: RootKey,
    pub os_version: OsVersion,
}

impl AuditTarget {
    /// `HKLM` and `HKCU` for the given release
    pub fn new(os_version: OsVersion) -> Self {
        Self {
            machine_root: RootKey::LocalMachine,
            user_root: RootKey::CurrentUser,
            os_version,
        }
    }

    pub fn with_user_root(mut self, root: RootKey) -> Self {
        self.user_root = root;
        self
    }

    pub fn with_machine_root(mut self, root: RootKey) -> Self {
        self.machine_root = root;
        self
    }

    fn root_for(&self, scope: Scope) -> &RootKey {
        match scope {
            Scope::Machine => &self.machine_root,
            Scope::User => &self.user_root,
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct AuditRun {
    pub report: AggregateReport,
    pub results: RunResults,
    pub os_version: OsVersion,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl AuditRun {
    pub fn is_compliant(&self) -> bool {
        self.report.is_compliant()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Evaluates a catalog against configuration stores
#[derive(Debug, Clone)]
pub struct AuditEngine {
    catalog: Catalog,
}

impl AuditEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Engine over the built-in CIS baseline
    pub fn with_baseline() -> Result<Self, AuditError> {
        Ok(Self::new(Catalog::cis_baseline()?))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run a full audit
    ///
    /// `cancel` is checked before each group; a cancelled run yields no report.
    pub fn run(
        &self,
        store: &dyn ConfigStore,
        target: &AuditTarget,
        cancel: &CancellationToken,
    ) -> Result<AuditRun, AuditError> {
        for root in [&target.machine_root, &target.user_root] {
            store
                .probe_root(root)
                .map_err(|source| AuditError::RootUnavailable {
                    root: root.to_string(),
                    source,
                })?;
        }

        let os_version = target.os_version.normalized();
        let started_at = Utc::now();
        info!(
            "Starting audit on {} ({} rules applicable to {})",
            store.store_id(),
            self.catalog.applicable_rule_count(os_version),
            os_version
        );

        let mut aggregator = ResultAggregator::new();

        for kind in GroupKind::ALL {
            if !kind.applies_to(os_version) {
                debug!("Skipping {} groups on {}", kind, os_version);
                continue;
            }

            let root = target.root_for(kind.scope());
            for group in self.catalog.groups_of(kind) {
                if cancel.is_cancelled() {
                    info!("Audit cancelled before group '{}'", group.name());
                    return Err(AuditError::Cancelled);
                }
                aggregator.record(evaluate_group(store, root, group));
            }
        }

        let report = aggregator.report();
        let finished_at = Utc::now();
        info!(
            "Audit finished: {} ({}/{} rules passed)",
            report.overall,
            aggregator.passed(),
            aggregator.total()
        );

        Ok(AuditRun {
            report,
            results: aggregator.into_results(),
            os_version,
            started_at,
            finished_at,
        })
    }
}
