//! # Result Generator
//!
//! Converts a finished audit run into a `ScanResult` with one finding per failed rule.

use crate::catalog::Catalog;
use crate::execution::{AuditRun, FailureReason, RuleOutcome};
use crate::results::{
    BenchmarkInfo, ComplianceFinding, FindingSeverity, HostContext, ResultGenerationError,
    ScanResult, UserContext,
};

/// Builds reports from audit runs
pub struct ResultGenerator<'a> {
    catalog: &'a Catalog,
    include_passing: bool,
}

impl<'a> ResultGenerator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            include_passing: false,
        }
    }

    /// Also emit `Info` findings for passing rules
    pub fn with_passing(mut self, include_passing: bool) -> Self {
        self.include_passing = include_passing;
        self
    }

    /// Report for `run`, using the local host and user context
    pub fn report_for(
        &self,
        run: &AuditRun,
        store_id: &str,
    ) -> Result<ScanResult, ResultGenerationError> {
        self.generate(
            run,
            store_id,
            HostContext::from_system(),
            UserContext::from_environment(),
        )
    }

    pub fn generate(
        &self,
        run: &AuditRun,
        store_id: &str,
        host: HostContext,
        user: UserContext,
    ) -> Result<ScanResult, ResultGenerationError> {
        let mut result = ScanResult::new(
            uuid::Uuid::new_v4().to_string(),
            BenchmarkInfo::new(run.os_version.to_string(), store_id),
            host,
            user,
        )
        .with_timestamps(run.started_at, run.finished_at);

        let mut errors = 0usize;
        for outcome in run.results.iter() {
            if !outcome.passed && Self::is_error(outcome) {
                errors += 1;
            }
            if outcome.passed && !self.include_passing {
                continue;
            }
            result.add_finding(self.outcome_to_finding(outcome)?);
        }

        result.update_rule_counts(
            Self::count(run.results.len())?,
            Self::count(run.results.passed_count())?,
            Self::count(run.results.failed_count())?,
            Self::count(errors)?,
        );
        result.finalize(run.report.overall);

        Ok(result)
    }

    fn outcome_to_finding(
        &self,
        outcome: &RuleOutcome,
    ) -> Result<ComplianceFinding, ResultGenerationError> {
        let group = self
            .catalog
            .group_of(&outcome.rule_id)
            .ok_or_else(|| ResultGenerationError::UnknownRule {
                rule_id: outcome.rule_id.to_string(),
            })?;

        let severity = Self::map_severity(outcome);
        let title = if outcome.passed {
            format!("{} is compliant", outcome.setting)
        } else {
            format!("{} is not compliant", outcome.setting)
        };
        let description = match &outcome.failure {
            Some(reason) => format!(
                "{}\\{}: {} (expected {})",
                outcome.path, outcome.setting, reason, outcome.expected
            ),
            None => format!(
                "{}\\{} satisfies {}",
                outcome.path, outcome.setting, outcome.expected
            ),
        };
        let actual = outcome
            .actual
            .as_ref()
            .map_or(serde_json::Value::Null, |actual| serde_json::json!(actual));

        let mut finding = ComplianceFinding::new(
            outcome.rule_id.to_string(),
            severity,
            title,
            description,
            serde_json::json!(outcome.expected),
            actual,
        )
        .with_field_path(format!("{}\\{}", outcome.path, outcome.setting))
        .with_benchmark_refs(group.benchmark_refs());

        if let Some(remediation) = Self::remediation(outcome) {
            finding = finding.with_remediation(remediation);
        }

        Ok(finding)
    }

    fn map_severity(outcome: &RuleOutcome) -> FindingSeverity {
        match &outcome.failure {
            None => FindingSeverity::Info,
            Some(FailureReason::UnsupportedConstraint) => FindingSeverity::Critical,
            Some(FailureReason::ConstraintNotMet | FailureReason::TypeMismatch) => {
                FindingSeverity::High
            }
            Some(
                FailureReason::PathNotFound
                | FailureReason::ValueMissing
                | FailureReason::AccessDenied
                | FailureReason::StoreFailure(_),
            ) => FindingSeverity::Medium,
        }
    }

    fn is_error(outcome: &RuleOutcome) -> bool {
        matches!(
            outcome.failure,
            Some(
                FailureReason::AccessDenied
                    | FailureReason::StoreFailure(_)
                    | FailureReason::UnsupportedConstraint
            )
        )
    }

    fn remediation(outcome: &RuleOutcome) -> Option<String> {
        let reason = outcome.failure.as_ref()?;
        let text = match reason {
            FailureReason::UnsupportedConstraint => {
                "The rule catalog is inconsistent for this setting; \
                 report it to the baseline maintainers."
                    .to_string()
            }
            FailureReason::AccessDenied | FailureReason::StoreFailure(_) => {
                "Re-run the audit with administrative privileges.".to_string()
            }
            _ => format!(
                "Set {}\\{} so that its value is {} (Group Policy or registry).",
                outcome.path, outcome.setting, outcome.expected
            ),
        };
        Some(text)
    }

    fn count(value: usize) -> Result<u32, ResultGenerationError> {
        u32::try_from(value).map_err(|_| ResultGenerationError::InvalidRuleCount { count: value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{GroupKind, RuleGroup};
    use crate::constraints::Constraint;
    use crate::execution::{AuditEngine, AuditTarget, CancellationToken};
    use crate::os_version::OsVersion;
    use crate::store::{MemoryStore, RegistryValue, RootKey};
    use assert_matches::assert_matches;

    const PATH: &str = r"SOFTWARE\Policies\Microsoft\Windows\System";

    fn small_catalog() -> Catalog {
        Catalog::new(vec![RuleGroup::new("windows_system", GroupKind::MachinePolicy, PATH)
            .benchmark("18.10.76.2.1")
            .rule("EnableSmartScreen", Constraint::exact(1))
            .rule("ShellSmartScreenLevel", Constraint::text("Block"))
            .rule("EnumerateLocalUsers", Constraint::exact(0))])
        .unwrap()
    }

    fn audit(catalog: &Catalog) -> AuditRun {
        let mut store = MemoryStore::with_standard_roots();
        store
            .set_value(&RootKey::LocalMachine, PATH, "EnableSmartScreen", RegistryValue::Dword(1))
            .set_value(
                &RootKey::LocalMachine,
                PATH,
                "ShellSmartScreenLevel",
                RegistryValue::String("Warn".to_string()),
            );

        AuditEngine::new(catalog.clone())
            .run(
                &store,
                &AuditTarget::new(OsVersion::Windows11),
                &CancellationToken::new(),
            )
            .unwrap()
    }

    fn generate(generator: &ResultGenerator<'_>, run: &AuditRun) -> ScanResult {
        generator
            .generate(
                run,
                "memory-store",
                HostContext::new("ws-01".to_string(), "windows x86_64".to_string()),
                UserContext::new("auditor".to_string()),
            )
            .unwrap()
    }

    #[test]
    fn test_findings_for_failures_only() {
        let catalog = small_catalog();
        let run = audit(&catalog);
        let result = generate(&ResultGenerator::new(&catalog), &run);

        assert_eq!(result.results.findings.len(), 2);
        assert_eq!(result.results.check.total_rules, 3);
        assert_eq!(result.results.check.passed_rules, 1);
        assert_eq!(result.results.check.failed_rules, 2);
        assert_eq!(result.results.check.error_rules, 0);
        assert!(!result.results.passed);
        assert_eq!(result.metadata.benchmark.os_version, "Windows 11");
    }

    #[test]
    fn test_severity_mapping() {
        let catalog = small_catalog();
        let run = audit(&catalog);
        let result = generate(&ResultGenerator::new(&catalog), &run);

        let high = result.findings_by_severity(FindingSeverity::High);
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].rule_id, "windows_system.ShellSmartScreenLevel");
        assert_eq!(high[0].actual, serde_json::json!("\"Warn\""));
        assert_eq!(high[0].benchmark_refs, vec!["18.10.76.2.1".to_string()]);

        let medium = result.findings_by_severity(FindingSeverity::Medium);
        assert_eq!(medium.len(), 1);
        assert_eq!(medium[0].actual, serde_json::Value::Null);
        assert!(medium[0].remediation.is_some());
    }

    #[test]
    fn test_include_passing() {
        let catalog = small_catalog();
        let run = audit(&catalog);
        let result = generate(&ResultGenerator::new(&catalog).with_passing(true), &run);

        assert_eq!(result.results.findings.len(), 3);
        let info = result.findings_by_severity(FindingSeverity::Info);
        assert_eq!(info.len(), 1);
        assert!(info[0].remediation.is_none());
    }

    #[test]
    fn test_report_for_local_host() {
        let catalog = small_catalog();
        let run = audit(&catalog);
        let result = ResultGenerator::new(&catalog)
            .report_for(&run, "memory-store")
            .unwrap();

        assert_eq!(result.metadata.benchmark.store_id, "memory-store");
        assert!(!result.metadata.host.hostname.is_empty());
        assert_eq!(result.results.check.total_rules, 3);
    }

    #[test]
    fn test_unknown_rule_rejected() {
        let catalog = small_catalog();
        let run = audit(&catalog);
        let other = Catalog::new(vec![RuleGroup::new("other", GroupKind::Service, r"SYSTEM\X")
            .rule("Start", Constraint::exact(4))])
        .unwrap();

        let result = ResultGenerator::new(&other).generate(
            &run,
            "memory-store",
            HostContext::new("ws-01".to_string(), "windows".to_string()),
            UserContext::new("auditor".to_string()),
        );
        assert_matches!(result, Err(ResultGenerationError::UnknownRule { .. }));
    }
}
