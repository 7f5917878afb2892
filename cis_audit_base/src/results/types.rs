//! # Scan Result Types
//!
//! Serializable audit report for SIEM ingestion and archival. One `ScanResult` describes
//! one audit run against one host.

use crate::execution::OverallStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const BENCHMARK_NAME: &str = "CIS Microsoft Windows Desktop Benchmark";

/// Complete result of one audit run
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResult {
    /// Unique identifier for this run
    pub scan_id: String,

    pub metadata: ScanMetadata,

    pub results: ComplianceResults,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub benchmark: BenchmarkInfo,

    /// Host the audit ran on
    pub host: HostContext,

    /// Account that ran the audit
    pub user_context: UserContext,

    pub timestamp: TimestampInfo,
}

/// What was audited
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkInfo {
    pub name: String,

    /// Release the release-specific groups were selected for
    pub os_version: String,

    /// Identifier of the store the values were read from
    pub store_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HostContext {
    pub hostname: String,
    pub os_info: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserContext {
    pub username: String,
    pub process_info: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimestampInfo {
    /// RFC3339
    pub scan_start: DateTime<Utc>,
    pub scan_end: DateTime<Utc>,
    pub duration_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComplianceResults {
    pub check: ComplianceCheck,

    /// One entry per failed rule, plus passing rules when requested
    pub findings: Vec<ComplianceFinding>,

    pub passed: bool,
}

/// Rule counts of the run
#[derive(Debug, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub total_rules: u32,
    pub passed_rules: u32,
    pub failed_rules: u32,
    /// Failed rules whose value could not be read or evaluated at all
    pub error_rules: u32,
    /// 0-100
    pub pass_percentage: f32,
    pub status: OverallStatus,
}

/// Individual rule finding
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ComplianceFinding {
    pub finding_id: String,
    pub rule_id: String,
    pub severity: FindingSeverity,
    pub title: String,
    pub description: String,
    pub expected: serde_json::Value,
    pub actual: serde_json::Value,
    pub remediation: Option<String>,
    /// `<path>\<setting>`
    pub field_path: Option<String>,
    pub benchmark_refs: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    /// Catalog defect
    Critical,
    /// Setting present with a non-compliant value
    High,
    /// Setting absent or unreadable
    Medium,
    /// Passing rule, reported on request
    Info,
}

impl ScanResult {
    pub fn new(
        scan_id: String,
        benchmark: BenchmarkInfo,
        host: HostContext,
        user_context: UserContext,
    ) -> Self {
        let now = Utc::now();

        Self {
            scan_id,
            metadata: ScanMetadata {
                benchmark,
                host,
                user_context,
                timestamp: TimestampInfo {
                    scan_start: now,
                    scan_end: now,
                    duration_ms: 0,
                },
            },
            results: ComplianceResults {
                check: ComplianceCheck {
                    total_rules: 0,
                    passed_rules: 0,
                    failed_rules: 0,
                    error_rules: 0,
                    pass_percentage: 0.0,
                    status: OverallStatus::NonCompliant,
                },
                findings: Vec::new(),
                passed: false,
            },
        }
    }

    /// Set run timestamps
    pub fn with_timestamps(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let timestamp = &mut self.metadata.timestamp;
        timestamp.scan_start = start;
        timestamp.scan_end = end;
        timestamp.duration_ms = u64::try_from((end - start).num_milliseconds()).unwrap_or(0);
        self
    }

    /// Compute the pass percentage and take the verdict of the run
    pub fn finalize(&mut self, status: OverallStatus) {
        let check = &mut self.results.check;

        if check.total_rules > 0 {
            check.pass_percentage = (check.passed_rules as f32 / check.total_rules as f32) * 100.0;
        }

        check.status = status;
        self.results.passed = status == OverallStatus::Compliant;
    }

    pub fn add_finding(&mut self, finding: ComplianceFinding) {
        self.results.findings.push(finding);
    }

    pub fn update_rule_counts(&mut self, total: u32, passed: u32, failed: u32, errors: u32) {
        let check = &mut self.results.check;
        check.total_rules = total;
        check.passed_rules = passed;
        check.failed_rules = failed;
        check.error_rules = errors;
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.metadata.timestamp.duration_ms as f64 / 1000.0
    }

    pub fn findings_by_severity(&self, severity: FindingSeverity) -> Vec<&ComplianceFinding> {
        self.results
            .findings
            .iter()
            .filter(|f| f.severity == severity)
            .collect()
    }
}

impl BenchmarkInfo {
    pub fn new(os_version: impl Into<String>, store_id: impl Into<String>) -> Self {
        Self {
            name: BENCHMARK_NAME.to_string(),
            os_version: os_version.into(),
            store_id: store_id.into(),
        }
    }
}

impl HostContext {
    pub fn from_system() -> Self {
        Self {
            hostname: hostname::get()
                .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
                .to_string_lossy()
                .to_string(),
            os_info: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }

    pub fn new(hostname: String, os_info: String) -> Self {
        Self { hostname, os_info }
    }
}

impl UserContext {
    pub fn from_environment() -> Self {
        let username = std::env::var("USERNAME")
            .or_else(|_| std::env::var("USER"))
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            username,
            process_info: Some(format!("pid:{}", std::process::id())),
        }
    }

    pub fn new(username: String) -> Self {
        Self {
            username,
            process_info: None,
        }
    }
}

impl ComplianceFinding {
    pub fn new(
        rule_id: String,
        severity: FindingSeverity,
        title: String,
        description: String,
        expected: serde_json::Value,
        actual: serde_json::Value,
    ) -> Self {
        Self {
            finding_id: uuid::Uuid::new_v4().to_string(),
            rule_id,
            severity,
            title,
            description,
            expected,
            actual,
            remediation: None,
            field_path: None,
            benchmark_refs: Vec::new(),
        }
    }

    pub fn with_remediation(mut self, remediation: String) -> Self {
        self.remediation = Some(remediation);
        self
    }

    pub fn with_field_path(mut self, field_path: String) -> Self {
        self.field_path = Some(field_path);
        self
    }

    pub fn with_benchmark_refs(mut self, refs: &[String]) -> Self {
        self.benchmark_refs = refs.to_vec();
        self
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::from_system()
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::from_environment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> ScanResult {
        ScanResult::new(
            "scan-1".to_string(),
            BenchmarkInfo::new("Windows 11", "memory-store"),
            HostContext::new("ws-01".to_string(), "windows x86_64".to_string()),
            UserContext::new("auditor".to_string()),
        )
    }

    #[test]
    fn test_finalize_computes_percentage() {
        let mut result = sample();
        result.update_rule_counts(4, 3, 1, 0);
        result.finalize(OverallStatus::NonCompliant);

        assert_eq!(result.results.check.pass_percentage, 75.0);
        assert!(!result.results.passed);
    }

    #[test]
    fn test_empty_run_is_not_divided() {
        let mut result = sample();
        result.finalize(OverallStatus::Compliant);

        assert_eq!(result.results.check.pass_percentage, 0.0);
        assert!(result.results.passed);
    }

    #[test]
    fn test_timestamps() {
        let start = Utc::now();
        let result = sample().with_timestamps(start, start + Duration::milliseconds(1500));

        assert_eq!(result.metadata.timestamp.duration_ms, 1500);
        assert_eq!(result.duration_seconds(), 1.5);

        let inverted = sample().with_timestamps(start, start - Duration::seconds(1));
        assert_eq!(inverted.metadata.timestamp.duration_ms, 0);
    }

    #[test]
    fn test_json_round_trip() {
        let mut result = sample();
        result.add_finding(ComplianceFinding::new(
            "credui.EnumerateAdministrators".to_string(),
            FindingSeverity::High,
            "title".to_string(),
            "description".to_string(),
            serde_json::json!("== 0"),
            serde_json::json!("1"),
        ));

        let json = result.to_json().unwrap();
        assert!(json.contains("\"severity\": \"high\""));
        assert!(json.contains("\"status\": \"non_compliant\""));

        let parsed = ScanResult::from_json(&json).unwrap();
        assert_eq!(parsed.results.findings.len(), 1);
        assert_eq!(parsed.findings_by_severity(FindingSeverity::High).len(), 1);
    }
}
