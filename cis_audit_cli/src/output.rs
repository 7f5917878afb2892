//! Human-readable rendering of audit reports and the rule catalog

use cis_audit_base::catalog::{Catalog, GroupKind};
use cis_audit_base::os_version::OsVersion;
use cis_audit_base::AuditReport;
use std::fmt::Write;

/// Text summary of a report; passing rules are listed when `include_passing` is set
pub fn render_report(report: &AuditReport, include_passing: bool) -> String {
    let run = &report.run;
    let check = &report.scan.results.check;
    let mut out = String::new();

    let _ = writeln!(out, "CIS Audit - {}", run.os_version);
    let _ = writeln!(out, "Store: {}", report.scan.metadata.benchmark.store_id);
    let _ = writeln!(
        out,
        "Rules: {} evaluated, {} passed, {} failed ({:.1}% passing)",
        check.total_rules, check.passed_rules, check.failed_rules, check.pass_percentage
    );

    if run.results.failed_count() > 0 {
        let _ = writeln!(out, "\nFailures:");
        for outcome in run.results.failures() {
            let _ = writeln!(out, "  FAIL  {}", outcome.rule_id);
            let _ = writeln!(out, "        {}\\{}", outcome.path, outcome.setting);
            let reason = outcome
                .failure
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "        expected {}, found {} ({})",
                outcome.expected,
                outcome.actual.as_deref().unwrap_or("nothing"),
                reason
            );
        }
    }

    if include_passing && run.results.passed_count() > 0 {
        let _ = writeln!(out, "\nPassed:");
        for outcome in run.results.iter().filter(|o| o.passed) {
            let _ = writeln!(out, "  PASS  {}", outcome.rule_id);
        }
    }

    let _ = writeln!(out, "\nResult: {}", run.report.overall);
    let _ = write!(out, "{}", run.report.message);
    out
}

/// Catalog listing, optionally restricted to one kind and one release
pub fn render_catalog(catalog: &Catalog, kind: Option<GroupKind>, os: Option<OsVersion>) -> String {
    let mut out = String::new();
    let mut rules = 0;

    for group in catalog.groups() {
        if kind.is_some_and(|k| k != group.kind()) {
            continue;
        }
        if os.is_some_and(|os| !group.kind().applies_to(os)) {
            continue;
        }

        let _ = writeln!(
            out,
            "[{}] {}  ({})  {}",
            group.kind(),
            group.name(),
            group.path(),
            group.benchmark_refs().join(", ")
        );
        for rule in group.rules() {
            let _ = writeln!(out, "    {:<40} {}", rule.setting, rule.constraint);
            rules += 1;
        }
    }

    let _ = write!(out, "{} rules", rules);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cis_audit_base::execution::{baseline_store, AuditTarget, CancellationToken};
    use cis_audit_base::store::MemoryStore;
    use cis_audit_base::{AuditConfig, Auditor};

    fn auditor() -> Auditor {
        Auditor::new(AuditConfig::default().with_os_version("11")).unwrap()
    }

    #[test]
    fn test_render_non_compliant() {
        let store = MemoryStore::with_standard_roots();
        let report = auditor()
            .audit_store(&store, &CancellationToken::new())
            .unwrap();

        let text = render_report(&report, false);
        assert!(text.starts_with("CIS Audit - Windows 11"));
        assert!(text.contains("FAIL  credui.EnumerateAdministrators"));
        assert!(text.contains("path not found"));
        assert!(text.contains("Result: NonCompliant"));
        assert!(!text.contains("Passed:"));
    }

    #[test]
    fn test_render_compliant_with_passing() {
        let auditor = auditor();
        let store = baseline_store(
            auditor.engine().catalog(),
            &AuditTarget::new(OsVersion::Windows11),
        );
        let report = auditor
            .audit_store(&store, &CancellationToken::new())
            .unwrap();

        let text = render_report(&report, true);
        assert!(!text.contains("Failures:"));
        assert!(text.contains("PASS  credui.EnumerateAdministrators"));
        assert!(text.contains("Result: Compliant"));
    }

    #[test]
    fn test_render_catalog_filters() {
        let catalog = Catalog::cis_baseline().unwrap();

        let user_only = render_catalog(&catalog, Some(GroupKind::UserPolicy), None);
        assert!(user_only.contains("[user_policy] user_screen_saver"));
        assert!(!user_only.contains("[machine_policy]"));

        let win10 = render_catalog(&catalog, None, Some(OsVersion::Windows10));
        assert!(win10.contains("win10_"));
        assert!(!win10.contains("win11_dns_over_https"));
    }
}
