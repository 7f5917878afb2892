//! # Configuration Store Access
//!
//! Abstraction over the hierarchical key-value store the audit reads from (the Windows
//! registry). Keys are opened relative to a root, read through typed accessors and
//! released when the handle is dropped.

pub mod command_executor;
pub mod error;
pub mod memory;
pub mod reg_query;

pub use command_executor::{CommandError, CommandOutput, SystemCommandExecutor};
pub use error::StoreError;
pub use memory::{MemoryStore, StoreSnapshot};
pub use reg_query::RegQueryStore;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Roots and values
// ============================================================================

/// Root of a registry hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RootKey {
    /// Machine-wide settings (`HKEY_LOCAL_MACHINE`)
    LocalMachine,
    /// Settings of the interactive user (`HKEY_CURRENT_USER`)
    CurrentUser,
    /// A loaded user hive addressed by SID (`HKEY_USERS\<sid>`)
    Users(String),
}

impl RootKey {
    /// Short form accepted by `reg.exe`
    pub fn short_name(&self) -> String {
        match self {
            RootKey::LocalMachine => "HKLM".to_string(),
            RootKey::CurrentUser => "HKCU".to_string(),
            RootKey::Users(sid) => format!("HKU\\{}", sid),
        }
    }

    /// Full name as printed by `reg.exe`
    pub fn long_name(&self) -> String {
        match self {
            RootKey::LocalMachine => "HKEY_LOCAL_MACHINE".to_string(),
            RootKey::CurrentUser => "HKEY_CURRENT_USER".to_string(),
            RootKey::Users(sid) => format!("HKEY_USERS\\{}", sid),
        }
    }

    /// Whether this root holds per-user settings
    pub fn is_user_scope(&self) -> bool {
        !matches!(self, RootKey::LocalMachine)
    }
}

impl fmt::Display for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

impl FromStr for RootKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches('\\');
        let (head, tail) = match trimmed.split_once('\\') {
            Some((head, tail)) => (head, Some(tail)),
            None => (trimmed, None),
        };

        match (head.to_ascii_uppercase().as_str(), tail) {
            ("HKLM" | "HKEY_LOCAL_MACHINE", None) => Ok(RootKey::LocalMachine),
            ("HKCU" | "HKEY_CURRENT_USER", None) => Ok(RootKey::CurrentUser),
            ("HKU" | "HKEY_USERS", Some(sid)) if !sid.is_empty() && !sid.contains('\\') => {
                Ok(RootKey::Users(sid.to_string()))
            }
            _ => Err(StoreError::InvalidRoot(s.to_string())),
        }
    }
}

/// Typed registry value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryValue {
    Dword(u32),
    Qword(u64),
    String(String),
    ExpandString(String),
    MultiString(Vec<String>),
    Binary(Vec<u8>),
}

impl RegistryValue {
    /// Registry type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            RegistryValue::Dword(_) => "REG_DWORD",
            RegistryValue::Qword(_) => "REG_QWORD",
            RegistryValue::String(_) => "REG_SZ",
            RegistryValue::ExpandString(_) => "REG_EXPAND_SZ",
            RegistryValue::MultiString(_) => "REG_MULTI_SZ",
            RegistryValue::Binary(_) => "REG_BINARY",
        }
    }

    /// Integer view: DWORD and QWORD values only
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            RegistryValue::Dword(v) => Some(u64::from(*v)),
            RegistryValue::Qword(v) => Some(*v),
            _ => None,
        }
    }

    /// String view: multi-strings are joined with newlines
    pub fn as_string(&self) -> Option<String> {
        match self {
            RegistryValue::String(s) | RegistryValue::ExpandString(s) => Some(s.clone()),
            RegistryValue::MultiString(parts) => Some(parts.join("\n")),
            _ => None,
        }
    }
}

impl fmt::Display for RegistryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryValue::Dword(v) => write!(f, "{}", v),
            RegistryValue::Qword(v) => write!(f, "{}", v),
            RegistryValue::String(s) | RegistryValue::ExpandString(s) => write!(f, "\"{}\"", s),
            RegistryValue::MultiString(parts) => write!(f, "{:?}", parts),
            RegistryValue::Binary(bytes) => {
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// Store traits
// ============================================================================

/// An open key. Dropping the handle closes it.
pub trait StoreKey {
    /// Path of the key relative to its root
    fn path(&self) -> &str;

    /// Read a DWORD/QWORD value
    fn get_integer(&self, name: &str) -> Result<u64, StoreError>;

    /// Read a string value
    fn get_string(&self, name: &str) -> Result<String, StoreError>;

    /// Names of the values held by this key
    fn value_names(&self) -> Vec<String>;
}

/// Hierarchical configuration store the audit reads from
pub trait ConfigStore: Send + Sync {
    /// Identifier used in log output
    fn store_id(&self) -> &str;

    /// Verify a root can be used at all
    fn probe_root(&self, root: &RootKey) -> Result<(), StoreError>;

    /// Open `path` under `root`
    fn open_path<'a>(
        &'a self,
        root: &RootKey,
        path: &str,
    ) -> Result<Box<dyn StoreKey + 'a>, StoreError>;

    /// Names of the direct children of `path`
    fn enumerate_children(&self, root: &RootKey, path: &str) -> Result<Vec<String>, StoreError>;
}

/// Canonical lookup form of a key path: trimmed separators, lowercase
pub(crate) fn normalize_path(path: &str) -> String {
    path.split('\\')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("\\")
        .to_lowercase()
}
