//! # OS Version Gating
//!
//! Windows major release used to select the release-specific rule groups.

use crate::store::{ConfigStore, RootKey, StoreError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key holding the release information of the running system
pub const CURRENT_VERSION_PATH: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion";

/// First build number shipped as Windows 11
pub const WINDOWS11_FIRST_BUILD: u32 = 22_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsVersion {
    Windows10,
    Windows11,
    /// Any other major version; no release-specific groups apply
    Other(u32),
}

impl OsVersion {
    pub fn from_major(major: u32) -> Self {
        match major {
            10 => OsVersion::Windows10,
            11 => OsVersion::Windows11,
            other => OsVersion::Other(other),
        }
    }

    /// Windows 11 still reports major version 10; the build number tells them apart.
    pub fn from_build(major: u32, build: u32) -> Self {
        match major {
            10 if build >= WINDOWS11_FIRST_BUILD => OsVersion::Windows11,
            other => Self::from_major(other),
        }
    }

    pub fn major(self) -> u32 {
        match self {
            OsVersion::Windows10 => 10,
            OsVersion::Windows11 => 11,
            OsVersion::Other(major) => major,
        }
    }

    /// `Other(10)` and `Other(11)` folded into the named releases
    pub fn normalized(self) -> Self {
        Self::from_major(self.major())
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsVersion::Windows10 => f.write_str("Windows 10"),
            OsVersion::Windows11 => f.write_str("Windows 11"),
            OsVersion::Other(major) => write!(f, "Windows (major {})", major),
        }
    }
}

impl FromStr for OsVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_', '-'], "");
        let digits = normalized
            .strip_prefix("windows")
            .or_else(|| normalized.strip_prefix("win"))
            .unwrap_or(&normalized);

        digits
            .parse::<u32>()
            .map(Self::from_major)
            .map_err(|_| format!("Invalid OS version '{}'", s))
    }
}

/// Read the release of the system behind `store`
pub fn detect_os_version(store: &dyn ConfigStore) -> Result<OsVersion, StoreError> {
    let key = store.open_path(&RootKey::LocalMachine, CURRENT_VERSION_PATH)?;

    let major = key.get_integer("CurrentMajorVersionNumber")?;
    let major = u32::try_from(major).unwrap_or(u32::MAX);

    // CurrentBuildNumber is REG_SZ; missing or garbled builds count as pre-Windows 11
    let build = key
        .get_string("CurrentBuildNumber")
        .ok()
        .and_then(|build| build.trim().parse::<u32>().ok())
        .unwrap_or(0);

    let version = OsVersion::from_build(major, build);
    debug!(
        "Detected {} (major {}, build {}) from {}",
        version,
        major,
        build,
        store.store_id()
    );
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, RegistryValue};
    use assert_matches::assert_matches;

    fn store_with(major: u32, build: &str) -> MemoryStore {
        let mut store = MemoryStore::with_standard_roots();
        store
            .set_value(
                &RootKey::LocalMachine,
                CURRENT_VERSION_PATH,
                "CurrentMajorVersionNumber",
                RegistryValue::Dword(major),
            )
            .set_value(
                &RootKey::LocalMachine,
                CURRENT_VERSION_PATH,
                "CurrentBuildNumber",
                RegistryValue::String(build.to_string()),
            );
        store
    }

    #[test]
    fn test_from_major() {
        assert_eq!(OsVersion::from_major(10), OsVersion::Windows10);
        assert_eq!(OsVersion::from_major(11), OsVersion::Windows11);
        assert_eq!(OsVersion::from_major(6), OsVersion::Other(6));
    }

    #[test]
    fn test_from_build() {
        assert_eq!(OsVersion::from_build(10, 19045), OsVersion::Windows10);
        assert_eq!(OsVersion::from_build(10, 22000), OsVersion::Windows11);
        assert_eq!(OsVersion::from_build(10, 26100), OsVersion::Windows11);
        assert_eq!(OsVersion::from_build(6, 9600), OsVersion::Other(6));
    }

    #[test]
    fn test_normalized() {
        assert_eq!(OsVersion::Other(10).normalized(), OsVersion::Windows10);
        assert_eq!(OsVersion::Other(11).normalized(), OsVersion::Windows11);
        assert_eq!(OsVersion::Other(6).normalized(), OsVersion::Other(6));
        assert_eq!(OsVersion::Windows11.normalized(), OsVersion::Windows11);

        let parsed: OsVersion = serde_json::from_str(r#"{"other":10}"#).unwrap();
        assert_eq!(parsed.normalized(), OsVersion::Windows10);
    }

    #[test]
    fn test_parse() {
        assert_eq!("10".parse::<OsVersion>().unwrap(), OsVersion::Windows10);
        assert_eq!("win11".parse::<OsVersion>().unwrap(), OsVersion::Windows11);
        assert_eq!("Windows 10".parse::<OsVersion>().unwrap(), OsVersion::Windows10);
        assert_eq!("8".parse::<OsVersion>().unwrap(), OsVersion::Other(8));
        assert!("vista".parse::<OsVersion>().is_err());
    }

    #[test]
    fn test_detect() {
        assert_eq!(
            detect_os_version(&store_with(10, "19045")).unwrap(),
            OsVersion::Windows10
        );
        assert_eq!(
            detect_os_version(&store_with(10, "22631")).unwrap(),
            OsVersion::Windows11
        );
        assert_eq!(
            detect_os_version(&store_with(10, "unknown")).unwrap(),
            OsVersion::Windows10
        );
    }

    #[test]
    fn test_detect_missing_key() {
        let store = MemoryStore::with_standard_roots();
        assert_matches!(
            detect_os_version(&store),
            Err(StoreError::PathNotFound { .. })
        );
    }
}
