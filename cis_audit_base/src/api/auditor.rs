//! # Auditor
//!
//! High-level entry point: opens the configured store, resolves the audit target, runs the
//! engine and builds the detailed report.

use crate::api::config::{AuditConfig, Backend};
use crate::api::errors::{AuditorError, ConfigError};
use crate::execution::{AuditEngine, AuditRun, AuditTarget, CancellationToken};
use crate::os_version::detect_os_version;
use crate::results::{ResultGenerator, ScanResult};
use crate::store::{ConfigStore, MemoryStore, RegQueryStore};
use log::info;

/// Verdict plus detailed report of one audit
#[derive(Debug)]
pub struct AuditReport {
    pub run: AuditRun,
    pub scan: ScanResult,
}

impl AuditReport {
    pub fn is_compliant(&self) -> bool {
        self.run.is_compliant()
    }
}

#[derive(Debug)]
pub struct Auditor {
    config: AuditConfig,
    engine: AuditEngine,
}

impl Auditor {
    /// Auditor over the built-in baseline
    pub fn new(config: AuditConfig) -> Result<Self, AuditorError> {
        let engine = AuditEngine::with_baseline()?;
        Self::with_engine(config, engine)
    }

    pub fn with_engine(config: AuditConfig, engine: AuditEngine) -> Result<Self, AuditorError> {
        config.validate()?;
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn engine(&self) -> &AuditEngine {
        &self.engine
    }

    /// Open the store selected by the configuration
    pub fn open_store(&self) -> Result<Box<dyn ConfigStore>, AuditorError> {
        match self.config.backend {
            Backend::Registry => Ok(Box::new(RegQueryStore::new(self.config.command_timeout()))),
            Backend::Fixture => {
                let path = self.config.fixture_path.as_ref().ok_or_else(|| {
                    ConfigError::invalid("fixture_path", "required when backend is fixture")
                })?;
                Ok(Box::new(MemoryStore::load_json(path)?))
            }
        }
    }

    /// Resolve roots and OS release, detecting the release when not configured
    pub fn target(&self, store: &dyn ConfigStore) -> Result<AuditTarget, AuditorError> {
        let os_version = match self.config.os_version_override()? {
            Some(version) => version,
            None => {
                detect_os_version(store).map_err(|source| AuditorError::OsDetection { source })?
            }
        };

        Ok(AuditTarget::new(os_version).with_user_root(self.config.user_root_key()?))
    }

    /// Audit the configured store
    pub fn audit(&self, cancel: &CancellationToken) -> Result<AuditReport, AuditorError> {
        let store = self.open_store()?;
        self.audit_store(store.as_ref(), cancel)
    }

    /// Audit an explicit store
    pub fn audit_store(
        &self,
        store: &dyn ConfigStore,
        cancel: &CancellationToken,
    ) -> Result<AuditReport, AuditorError> {
        let target = self.target(store)?;
        info!(
            "Auditing {} for {} (user root {})",
            store.store_id(),
            target.os_version,
            target.user_root
        );

        let run = self.engine.run(store, &target, cancel)?;
        let scan = ResultGenerator::new(self.engine.catalog())
            .with_passing(self.config.include_passing)
            .report_for(&run, store.store_id())?;

        Ok(AuditReport { run, scan })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::OutputFormat;
    use crate::execution::{baseline_store, AuditError, OverallStatus};
    use crate::os_version::OsVersion;
    use assert_matches::assert_matches;

    fn config() -> AuditConfig {
        AuditConfig {
            backend: Backend::Registry,
            fixture_path: None,
            command_timeout_ms: 1000,
            user_root: None,
            os_version: None,
            output: OutputFormat::Text,
            include_passing: false,
        }
    }

    fn golden_fixture(os: OsVersion) -> tempfile::NamedTempFile {
        let engine = AuditEngine::with_baseline().unwrap();
        let store = baseline_store(engine.catalog(), &AuditTarget::new(os));

        let file = tempfile::NamedTempFile::new().unwrap();
        store.save_json(file.path()).unwrap();
        file
    }

    #[test]
    fn test_fixture_audit_detects_os() {
        let fixture = golden_fixture(OsVersion::Windows11);
        let auditor = Auditor::new(config().with_fixture(fixture.path())).unwrap();

        let report = auditor.audit(&CancellationToken::new()).unwrap();
        assert!(report.is_compliant());
        assert_eq!(report.run.os_version, OsVersion::Windows11);
        assert!(report.scan.results.passed);
        assert!(report.scan.results.findings.is_empty());
        assert!(report.scan.metadata.benchmark.store_id.starts_with("snapshot:"));
    }

    #[test]
    fn test_os_override_takes_precedence() {
        // Fixture reports Windows 11; the configured release wins
        let fixture = golden_fixture(OsVersion::Windows11);
        let store = MemoryStore::load_json(fixture.path()).unwrap();

        let auditor = Auditor::new(config().with_os_version("10")).unwrap();
        let report = auditor.audit_store(&store, &CancellationToken::new()).unwrap();

        assert_eq!(report.run.os_version, OsVersion::Windows10);
        assert_eq!(report.run.report.overall, OverallStatus::Compliant);
    }

    #[test]
    fn test_detection_failure_is_reported() {
        let store = MemoryStore::with_standard_roots();
        let auditor = Auditor::new(config()).unwrap();

        assert_matches!(
            auditor.audit_store(&store, &CancellationToken::new()),
            Err(AuditorError::OsDetection { .. })
        );
    }

    #[test]
    fn test_missing_user_hive() {
        let store = MemoryStore::with_standard_roots();
        let auditor = Auditor::new(
            config()
                .with_os_version("11")
                .with_user_root(r"HKU\S-1-5-21-9"),
        )
        .unwrap();

        let result = auditor.audit_store(&store, &CancellationToken::new());
        assert_matches!(
            result,
            Err(AuditorError::Audit(AuditError::RootUnavailable { .. }))
        );
    }

    #[test]
    fn test_include_passing_reports_every_rule() {
        let fixture = golden_fixture(OsVersion::Windows10);
        let auditor =
            Auditor::new(config().with_fixture(fixture.path()).with_passing(true)).unwrap();

        let report = auditor.audit(&CancellationToken::new()).unwrap();
        assert_eq!(report.scan.results.findings.len(), report.run.results.len());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Auditor::new(config().with_backend(Backend::Fixture));
        assert_matches!(result, Err(AuditorError::Config(_)));
    }
}
