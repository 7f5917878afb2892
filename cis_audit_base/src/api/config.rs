//! # Audit Configuration
//!
//! Defaults come from `CIS_AUDIT_*` environment variables; a TOML file overrides them and
//! builder methods (used by the CLI) override both.

use crate::api::errors::ConfigError;
use crate::os_version::OsVersion;
use crate::store::RootKey;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 10_000;

/// Where registry values are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Live registry through `reg query`
    Registry,
    /// JSON snapshot file
    Fixture,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "registry" => Ok(Backend::Registry),
            "fixture" => Ok(Backend::Fixture),
            other => Err(ConfigError::invalid(
                "backend",
                format!("'{}' (expected registry or fixture)", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ConfigError::invalid(
                "output",
                format!("'{}' (expected text or json)", other),
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    pub backend: Backend,

    /// Snapshot file for the fixture backend
    pub fixture_path: Option<PathBuf>,

    /// Timeout for each `reg query` invocation
    pub command_timeout_ms: u64,

    /// User root (`HKCU` or `HKU\<sid>`); defaults to `HKCU`
    pub user_root: Option<String>,

    /// Skip detection and use this release
    pub os_version: Option<String>,

    pub output: OutputFormat,

    /// Report passing rules as informational findings
    pub include_passing: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            backend: env::var("CIS_AUDIT_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Backend::Registry),
            fixture_path: env::var("CIS_AUDIT_FIXTURE").ok().map(PathBuf::from),
            command_timeout_ms: env::var("CIS_AUDIT_COMMAND_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_COMMAND_TIMEOUT_MS),
            user_root: env::var("CIS_AUDIT_USER_ROOT").ok(),
            os_version: env::var("CIS_AUDIT_OS_VERSION").ok(),
            output: env::var("CIS_AUDIT_OUTPUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(OutputFormat::Text),
            include_passing: env::var("CIS_AUDIT_INCLUDE_PASSING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

impl AuditConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a TOML file; fields it omits keep their environment defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Read from a snapshot file instead of the live registry
    pub fn with_fixture(mut self, path: impl Into<PathBuf>) -> Self {
        self.backend = Backend::Fixture;
        self.fixture_path = Some(path.into());
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_user_root(mut self, root: impl Into<String>) -> Self {
        self.user_root = Some(root.into());
        self
    }

    pub fn with_os_version(mut self, version: impl Into<String>) -> Self {
        self.os_version = Some(version.into());
        self
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    pub fn with_passing(mut self, include_passing: bool) -> Self {
        self.include_passing = include_passing;
        self
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn user_root_key(&self) -> Result<RootKey, ConfigError> {
        match &self.user_root {
            None => Ok(RootKey::CurrentUser),
            Some(raw) => match raw.parse::<RootKey>() {
                Ok(RootKey::LocalMachine) => Err(ConfigError::invalid(
                    "user_root",
                    "the machine root cannot hold per-user settings",
                )),
                Ok(root) => Ok(root),
                Err(e) => Err(ConfigError::invalid("user_root", e.to_string())),
            },
        }
    }

    pub fn os_version_override(&self) -> Result<Option<OsVersion>, ConfigError> {
        self.os_version
            .as_deref()
            .map(|raw| {
                raw.parse::<OsVersion>()
                    .map_err(|e| ConfigError::invalid("os_version", e))
            })
            .transpose()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == Backend::Fixture && self.fixture_path.is_none() {
            return Err(ConfigError::invalid(
                "fixture_path",
                "required when backend is fixture",
            ));
        }
        if self.command_timeout_ms == 0 {
            return Err(ConfigError::invalid("command_timeout_ms", "must be positive"));
        }
        self.user_root_key()?;
        self.os_version_override()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn base() -> AuditConfig {
        AuditConfig {
            backend: Backend::Registry,
            fixture_path: None,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            user_root: None,
            os_version: None,
            output: OutputFormat::Text,
            include_passing: false,
        }
    }

    #[test]
    fn test_builder() {
        let config = base()
            .with_fixture("golden.json")
            .with_command_timeout(Duration::from_secs(3))
            .with_user_root(r"HKU\S-1-5-21-7")
            .with_os_version("11")
            .with_output(OutputFormat::Json)
            .with_passing(true);

        assert_eq!(config.backend, Backend::Fixture);
        assert_eq!(config.fixture_path, Some(PathBuf::from("golden.json")));
        assert_eq!(config.command_timeout(), Duration::from_secs(3));
        assert_eq!(
            config.user_root_key().unwrap(),
            RootKey::Users("S-1-5-21-7".to_string())
        );
        assert_eq!(config.os_version_override().unwrap(), Some(OsVersion::Windows11));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml() {
        let config = AuditConfig::from_toml_str(
            r#"
            backend = "fixture"
            fixture_path = "fixtures/golden.json"
            command_timeout_ms = 2500
            user_root = "HKCU"
            os_version = "win10"
            output = "json"
            include_passing = true
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, Backend::Fixture);
        assert_eq!(config.command_timeout_ms, 2500);
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.os_version_override().unwrap(), Some(OsVersion::Windows10));
        assert!(config.include_passing);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert_matches!(
            AuditConfig::from_toml_str("backend = \"registry\"\nretries = 3\n"),
            Err(ConfigError::Parse(_))
        );
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "output = \"json\"\ncommand_timeout_ms = 500").unwrap();

        let config = AuditConfig::load(file.path()).unwrap();
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.command_timeout_ms, 500);

        assert_matches!(
            AuditConfig::load("/nonexistent/cis-audit.toml"),
            Err(ConfigError::Io { .. })
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let config = base().with_fixture("snap.json").with_os_version("10");
        let text = config.to_toml_string().unwrap();
        assert_eq!(AuditConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_validation() {
        let fixture_without_path = base().with_backend(Backend::Fixture);
        assert_matches!(
            fixture_without_path.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "fixture_path"
        );

        let zero_timeout = base().with_command_timeout(Duration::ZERO);
        assert!(zero_timeout.validate().is_err());

        let machine_user_root = base().with_user_root("HKLM");
        assert!(machine_user_root.validate().is_err());

        let bad_os = base().with_os_version("vista");
        assert!(bad_os.validate().is_err());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Fixture".parse::<Backend>().unwrap(), Backend::Fixture);
        assert!("wmi".parse::<Backend>().is_err());
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::Text.to_string(), "text");
    }
}
