//! In-memory configuration store
//!
//! Backs unit tests and offline audits of exported registry snapshots. Key paths and value
//! names are matched case-insensitively, mirroring registry semantics.

use crate::store::{normalize_path, ConfigStore, RegistryValue, RootKey, StoreError, StoreKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Serializable registry snapshot: root -> key path -> value name -> value
///
/// ```json
/// {
///   "HKLM": {
///     "SOFTWARE\\Policies\\Microsoft\\Windows\\System": { "EnableSmartScreen": { "dword": 1 } }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreSnapshot {
    pub roots: BTreeMap<String, BTreeMap<String, BTreeMap<String, RegistryValue>>>,
}

impl StoreSnapshot {
    /// Parse a snapshot from JSON text
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Snapshot {
            reason: format!("Invalid snapshot JSON: {}", e),
        })
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::Snapshot {
            reason: format!("Snapshot serialization failed: {}", e),
        })
    }

    /// Number of values across all roots
    pub fn value_count(&self) -> usize {
        self.roots
            .values()
            .flat_map(|keys| keys.values())
            .map(|values| values.len())
            .sum()
    }
}

#[derive(Debug, Clone)]
struct KeyEntry {
    display_path: String,
    /// lowercase name -> (original name, value)
    values: BTreeMap<String, (String, RegistryValue)>,
}

impl KeyEntry {
    fn new(display_path: &str) -> Self {
        Self {
            display_path: display_path.trim_matches('\\').to_string(),
            values: BTreeMap::new(),
        }
    }
}

/// Configuration store held entirely in memory
#[derive(Debug)]
pub struct MemoryStore {
    id: String,
    roots: HashMap<RootKey, HashMap<String, KeyEntry>>,
    open_handles: Arc<AtomicUsize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a store with no roots. Every root must be added before it can be probed.
    pub fn new() -> Self {
        Self {
            id: "memory-store".to_string(),
            roots: HashMap::new(),
            open_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a store with empty machine and current-user roots
    pub fn with_standard_roots() -> Self {
        let mut store = Self::new();
        store.add_root(RootKey::LocalMachine);
        store.add_root(RootKey::CurrentUser);
        store
    }

    /// Set store identifier used in logs
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Declare a root as present (possibly empty)
    pub fn add_root(&mut self, root: RootKey) {
        self.roots.entry(root).or_default();
    }

    /// Create a key and all of its ancestors
    pub fn create_key(&mut self, root: &RootKey, path: &str) {
        let keys = self.roots.entry(root.clone()).or_default();

        let segments: Vec<&str> = path.split('\\').filter(|s| !s.is_empty()).collect();
        for depth in 1..=segments.len() {
            let display = segments[..depth].join("\\");
            keys.entry(normalize_path(&display))
                .or_insert_with(|| KeyEntry::new(&display));
        }
    }

    /// Set a value, creating the key if needed
    pub fn set_value(
        &mut self,
        root: &RootKey,
        path: &str,
        name: &str,
        value: RegistryValue,
    ) -> &mut Self {
        self.create_key(root, path);
        if let Some(entry) = self
            .roots
            .get_mut(root)
            .and_then(|keys| keys.get_mut(&normalize_path(path)))
        {
            entry
                .values
                .insert(name.to_lowercase(), (name.to_string(), value));
        }
        self
    }

    /// Remove a value; returns the previous value if any
    pub fn remove_value(
        &mut self,
        root: &RootKey,
        path: &str,
        name: &str,
    ) -> Option<RegistryValue> {
        self.roots
            .get_mut(root)
            .and_then(|keys| keys.get_mut(&normalize_path(path)))
            .and_then(|entry| entry.values.remove(&name.to_lowercase()))
            .map(|(_, value)| value)
    }

    /// Number of key handles currently open
    pub fn open_handle_count(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    /// Build a store from a snapshot
    pub fn from_snapshot(snapshot: &StoreSnapshot) -> Result<Self, StoreError> {
        let mut store = Self::new();

        for (root_name, keys) in &snapshot.roots {
            let root: RootKey = root_name.parse()?;
            store.add_root(root.clone());

            for (path, values) in keys {
                store.create_key(&root, path);
                for (name, value) in values {
                    store.set_value(&root, path, name, value.clone());
                }
            }
        }

        Ok(store)
    }

    /// Export the store as a snapshot. Keys without values are kept so they still open.
    pub fn to_snapshot(&self) -> StoreSnapshot {
        let mut snapshot = StoreSnapshot::default();

        for (root, keys) in &self.roots {
            let root_entry = snapshot.roots.entry(root.short_name()).or_default();
            for entry in keys.values() {
                let values = root_entry.entry(entry.display_path.clone()).or_default();
                for (name, value) in entry.values.values() {
                    values.insert(name.clone(), value.clone());
                }
            }
        }

        snapshot
    }

    /// Load a JSON snapshot file
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| StoreError::Snapshot {
            reason: format!("Cannot read '{}': {}", path.display(), e),
        })?;
        let snapshot = StoreSnapshot::from_json(&contents)?;
        let store = Self::from_snapshot(&snapshot)?;
        Ok(store.with_id(format!("snapshot:{}", path.display())))
    }

    /// Write the store to a JSON snapshot file
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let json = self.to_snapshot().to_json()?;
        std::fs::write(path, json).map_err(|e| StoreError::Snapshot {
            reason: format!("Cannot write '{}': {}", path.display(), e),
        })
    }

    fn root_keys(&self, root: &RootKey) -> Result<&HashMap<String, KeyEntry>, StoreError> {
        self.roots
            .get(root)
            .ok_or_else(|| StoreError::RootUnavailable {
                root: root.short_name(),
                reason: "root not present in store".to_string(),
            })
    }
}

impl ConfigStore for MemoryStore {
    fn store_id(&self) -> &str {
        &self.id
    }

    fn probe_root(&self, root: &RootKey) -> Result<(), StoreError> {
        self.root_keys(root).map(|_| ())
    }

    fn open_path<'a>(
        &'a self,
        root: &RootKey,
        path: &str,
    ) -> Result<Box<dyn StoreKey + 'a>, StoreError> {
        let entry = self
            .root_keys(root)?
            .get(&normalize_path(path))
            .ok_or_else(|| StoreError::PathNotFound {
                root: root.short_name(),
                path: path.to_string(),
            })?;

        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryKey {
            entry,
            open_handles: Arc::clone(&self.open_handles),
        }))
    }

    fn enumerate_children(&self, root: &RootKey, path: &str) -> Result<Vec<String>, StoreError> {
        let keys = self.root_keys(root)?;
        let parent = normalize_path(path);

        if !parent.is_empty() && !keys.contains_key(&parent) {
            return Err(StoreError::PathNotFound {
                root: root.short_name(),
                path: path.to_string(),
            });
        }

        let prefix = if parent.is_empty() {
            String::new()
        } else {
            format!("{}\\", parent)
        };

        let mut children: Vec<String> = keys
            .iter()
            .filter(|(normalized, _)| {
                normalized
                    .strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('\\'))
            })
            .filter_map(|(_, entry)| entry.display_path.rsplit('\\').next().map(String::from))
            .collect();
        children.sort();
        Ok(children)
    }
}

/// Open key in a [`MemoryStore`]
struct MemoryKey<'a> {
    entry: &'a KeyEntry,
    open_handles: Arc<AtomicUsize>,
}

impl MemoryKey<'_> {
    fn lookup(&self, name: &str) -> Result<&RegistryValue, StoreError> {
        self.entry
            .values
            .get(&name.to_lowercase())
            .map(|(_, value)| value)
            .ok_or_else(|| StoreError::ValueMissing {
                path: self.entry.display_path.clone(),
                name: name.to_string(),
            })
    }

    fn mismatch(&self, name: &str, expected: &str, value: &RegistryValue) -> StoreError {
        StoreError::ValueTypeMismatch {
            path: self.entry.display_path.clone(),
            name: name.to_string(),
            expected: expected.to_string(),
            actual: value.type_name().to_string(),
        }
    }
}

impl StoreKey for MemoryKey<'_> {
    fn path(&self) -> &str {
        &self.entry.display_path
    }

    fn get_integer(&self, name: &str) -> Result<u64, StoreError> {
        let value = self.lookup(name)?;
        value
            .as_integer()
            .ok_or_else(|| self.mismatch(name, "REG_DWORD or REG_QWORD", value))
    }

    fn get_string(&self, name: &str) -> Result<String, StoreError> {
        let value = self.lookup(name)?;
        value
            .as_string()
            .ok_or_else(|| self.mismatch(name, "REG_SZ, REG_EXPAND_SZ or REG_MULTI_SZ", value))
    }

    fn value_names(&self) -> Vec<String> {
        self.entry
            .values
            .values()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Drop for MemoryKey<'_> {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const CREDUI: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Policies\CredUI";

    fn sample_store() -> MemoryStore {
        let mut store = MemoryStore::with_standard_roots();
        store.set_value(
            &RootKey::LocalMachine,
            CREDUI,
            "EnumerateAdministrators",
            RegistryValue::Dword(0),
        );
        store.set_value(
            &RootKey::LocalMachine,
            r"SOFTWARE\Policies\Microsoft\Windows\System",
            "ShellSmartScreenLevel",
            RegistryValue::String("Block".to_string()),
        );
        store
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let store = sample_store();
        let key = store
            .open_path(
                &RootKey::LocalMachine,
                r"software\microsoft\windows\currentversion\policies\credui",
            )
            .unwrap();
        assert_eq!(key.get_integer("enumerateadministrators").unwrap(), 0);
        assert_eq!(key.path(), CREDUI);
    }

    #[test]
    fn test_missing_path_and_value() {
        let store = sample_store();
        let missing = store.open_path(&RootKey::LocalMachine, r"SOFTWARE\Nowhere");
        assert_matches!(missing.err(), Some(StoreError::PathNotFound { .. }));

        let key = store.open_path(&RootKey::LocalMachine, CREDUI).unwrap();
        assert_matches!(key.get_integer("Other"), Err(StoreError::ValueMissing { .. }));
    }

    #[test]
    fn test_type_mismatch() {
        let store = sample_store();
        let key = store
            .open_path(
                &RootKey::LocalMachine,
                r"SOFTWARE\Policies\Microsoft\Windows\System",
            )
            .unwrap();
        assert_matches!(
            key.get_integer("ShellSmartScreenLevel"),
            Err(StoreError::ValueTypeMismatch { .. })
        );
        assert_eq!(key.get_string("ShellSmartScreenLevel").unwrap(), "Block");
    }

    #[test]
    fn test_missing_root() {
        let store = MemoryStore::new();
        assert_matches!(
            store.probe_root(&RootKey::LocalMachine),
            Err(StoreError::RootUnavailable { .. })
        );
        assert_matches!(
            store.open_path(&RootKey::CurrentUser, "Software").err(),
            Some(StoreError::RootUnavailable { .. })
        );
    }

    #[test]
    fn test_handles_released_on_drop() {
        let store = sample_store();
        {
            let _first = store.open_path(&RootKey::LocalMachine, CREDUI).unwrap();
            let _second = store.open_path(&RootKey::LocalMachine, CREDUI).unwrap();
            assert_eq!(store.open_handle_count(), 2);
        }
        assert_eq!(store.open_handle_count(), 0);
    }

    #[test]
    fn test_enumerate_children() {
        let store = sample_store();
        let children = store
            .enumerate_children(
                &RootKey::LocalMachine,
                r"SOFTWARE\Microsoft\Windows\CurrentVersion\Policies",
            )
            .unwrap();
        assert_eq!(children, vec!["CredUI".to_string()]);

        let top = store.enumerate_children(&RootKey::LocalMachine, "").unwrap();
        assert_eq!(top, vec!["SOFTWARE".to_string()]);
    }

    #[test]
    fn test_snapshot_file_round_trip() {
        let store = sample_store();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("snapshot.json");

        store.save_json(&file).unwrap();
        let loaded = MemoryStore::load_json(&file).unwrap();

        assert!(loaded.probe_root(&RootKey::CurrentUser).is_ok());
        let key = loaded.open_path(&RootKey::LocalMachine, CREDUI).unwrap();
        assert_eq!(key.get_integer("EnumerateAdministrators").unwrap(), 0);
        assert!(loaded.store_id().starts_with("snapshot:"));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = r#"{
            "HKLM": { "SYSTEM\\CurrentControlSet\\Services\\sshd": { "Start": { "dword": 4 } } },
            "HKU\\S-1-5-21-42": {}
        }"#;
        let snapshot = StoreSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.value_count(), 1);

        let store = MemoryStore::from_snapshot(&snapshot).unwrap();
        assert!(store
            .probe_root(&RootKey::Users("S-1-5-21-42".to_string()))
            .is_ok());
        assert_matches!(
            store.probe_root(&RootKey::CurrentUser),
            Err(StoreError::RootUnavailable { .. })
        );
    }

    #[test]
    fn test_invalid_snapshot_root() {
        let json = r#"{ "HKCR": {} }"#;
        let snapshot = StoreSnapshot::from_json(json).unwrap();
        assert_matches!(
            MemoryStore::from_snapshot(&snapshot),
            Err(StoreError::InvalidRoot(_))
        );
    }
}
