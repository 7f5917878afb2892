//! Live registry backend driven by `reg.exe`
//!
//! Each opened key costs one `reg query` invocation; the values of that key are captured
//! in a snapshot handle so subsequent reads do not touch the system again.

use crate::store::command_executor::{CommandOutput, SystemCommandExecutor};
use crate::store::{ConfigStore, RegistryValue, RootKey, StoreError, StoreKey};
use log::{debug, trace};
use std::collections::BTreeMap;
use std::time::Duration;

const REG_PROGRAM: &str = "reg";

/// Registry store that shells out to `reg query`
#[derive(Debug, Clone)]
pub struct RegQueryStore {
    id: String,
    executor: SystemCommandExecutor,
}

impl RegQueryStore {
    pub fn new(timeout: Duration) -> Self {
        Self::with_executor(SystemCommandExecutor::for_registry_queries(timeout))
    }

    /// Use a preconfigured executor; it must whitelist `reg`
    pub fn with_executor(executor: SystemCommandExecutor) -> Self {
        Self {
            id: "reg-query".to_string(),
            executor,
        }
    }

    fn full_path(root: &RootKey, path: &str) -> String {
        let path = path.trim_matches('\\');
        if path.is_empty() {
            root.short_name()
        } else {
            format!("{}\\{}", root.short_name(), path)
        }
    }

    fn query(&self, root: &RootKey, path: &str) -> Result<CommandOutput, StoreError> {
        let target = Self::full_path(root, path);
        trace!("reg query {}", target);
        Ok(self.executor.execute(REG_PROGRAM, &["query", &target], None)?)
    }
}

impl ConfigStore for RegQueryStore {
    fn store_id(&self) -> &str {
        &self.id
    }

    fn probe_root(&self, root: &RootKey) -> Result<(), StoreError> {
        let output = self.query(root, "")?;
        root_from_output(root, &output)
    }

    fn open_path<'a>(
        &'a self,
        root: &RootKey,
        path: &str,
    ) -> Result<Box<dyn StoreKey + 'a>, StoreError> {
        let output = self.query(root, path)?;
        let key = key_from_output(root, path, &output)?;
        debug!(
            "Opened {}\\{} ({} values, {}ms)",
            root,
            path,
            key.values.len(),
            output.duration.as_millis()
        );
        Ok(Box::new(key))
    }

    fn enumerate_children(&self, root: &RootKey, path: &str) -> Result<Vec<String>, StoreError> {
        let output = self.query(root, path)?;
        if !output.succeeded() {
            return Err(failure(root, path, &output));
        }
        Ok(parse_reg_query_output(&output.stdout, &format_long_path(root, path)).subkeys)
    }
}

// ============================================================================
// Exit status mapping
// ============================================================================

fn root_from_output(root: &RootKey, output: &CommandOutput) -> Result<(), StoreError> {
    if output.succeeded() {
        Ok(())
    } else {
        Err(StoreError::RootUnavailable {
            root: root.short_name(),
            reason: output.stderr.trim().to_string(),
        })
    }
}

fn key_from_output(
    root: &RootKey,
    path: &str,
    output: &CommandOutput,
) -> Result<SnapshotKey, StoreError> {
    if !output.succeeded() {
        return Err(failure(root, path, output));
    }
    let parsed = parse_reg_query_output(&output.stdout, &format_long_path(root, path));
    Ok(SnapshotKey::new(path, parsed.values))
}

/// Error for a failed `reg query` of `path`
///
/// `reg.exe` exits with 1 for every failure, so access denial is recognised from the
/// English message only. On localized systems a denied key reports as not found.
fn failure(root: &RootKey, path: &str, output: &CommandOutput) -> StoreError {
    if output.stderr.to_lowercase().contains("access is denied") {
        StoreError::AccessDenied {
            root: root.short_name(),
            path: path.to_string(),
        }
    } else {
        StoreError::PathNotFound {
            root: root.short_name(),
            path: path.to_string(),
        }
    }
}

fn format_long_path(root: &RootKey, path: &str) -> String {
    let path = path.trim_matches('\\');
    if path.is_empty() {
        root.long_name()
    } else {
        format!("{}\\{}", root.long_name(), path)
    }
}

// ============================================================================
// Snapshot handle
// ============================================================================

/// Values of one key captured at open time
struct SnapshotKey {
    path: String,
    values: BTreeMap<String, (String, RegistryValue)>,
}

impl SnapshotKey {
    fn new(path: &str, values: Vec<(String, RegistryValue)>) -> Self {
        Self {
            path: path.trim_matches('\\').to_string(),
            values: values
                .into_iter()
                .map(|(name, value)| (name.to_lowercase(), (name, value)))
                .collect(),
        }
    }

    fn lookup(&self, name: &str) -> Result<&RegistryValue, StoreError> {
        self.values
            .get(&name.to_lowercase())
            .map(|(_, value)| value)
            .ok_or_else(|| StoreError::ValueMissing {
                path: self.path.clone(),
                name: name.to_string(),
            })
    }
}

impl StoreKey for SnapshotKey {
    fn path(&self) -> &str {
        &self.path
    }

    fn get_integer(&self, name: &str) -> Result<u64, StoreError> {
        let value = self.lookup(name)?;
        value
            .as_integer()
            .ok_or_else(|| StoreError::ValueTypeMismatch {
                path: self.path.clone(),
                name: name.to_string(),
                expected: "REG_DWORD or REG_QWORD".to_string(),
                actual: value.type_name().to_string(),
            })
    }

    fn get_string(&self, name: &str) -> Result<String, StoreError> {
        let value = self.lookup(name)?;
        value
            .as_string()
            .ok_or_else(|| StoreError::ValueTypeMismatch {
                path: self.path.clone(),
                name: name.to_string(),
                expected: "REG_SZ, REG_EXPAND_SZ or REG_MULTI_SZ".to_string(),
                actual: value.type_name().to_string(),
            })
    }

    fn value_names(&self) -> Vec<String> {
        self.values.values().map(|(name, _)| name.clone()).collect()
    }
}

impl Drop for SnapshotKey {
    fn drop(&mut self) {
        trace!("Closed key {}", self.path);
    }
}

// ============================================================================
// Output parsing
// ============================================================================

/// Values and subkeys listed by one `reg query` call
#[derive(Debug, Default)]
pub(crate) struct ParsedKey {
    pub values: Vec<(String, RegistryValue)>,
    pub subkeys: Vec<String>,
}

/// Parse `reg query` output for `key` (long root form, e.g. `HKEY_LOCAL_MACHINE\SOFTWARE`)
pub(crate) fn parse_reg_query_output(output: &str, key: &str) -> ParsedKey {
    let mut parsed = ParsedKey::default();
    let key = key.trim_end_matches('\\');
    let mut in_target = false;

    for raw in output.lines() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if !line.starts_with(char::is_whitespace) {
            // Key header: either the queried key or one of its subkeys
            if line.eq_ignore_ascii_case(key) {
                in_target = true;
            } else {
                in_target = false;
                if let Some(child) = line.rsplit('\\').next() {
                    parsed.subkeys.push(child.to_string());
                }
            }
            continue;
        }

        if !in_target {
            continue;
        }

        let mut parts = line.trim_start().splitn(3, "    ");
        let (Some(name), Some(reg_type)) = (parts.next(), parts.next()) else {
            continue;
        };
        let data = parts.next().unwrap_or("");

        match parse_value(reg_type.trim(), data) {
            Some(value) => parsed.values.push((name.to_string(), value)),
            None => debug!("Skipping value '{}' of unsupported type {}", name, reg_type),
        }
    }

    parsed
}

fn parse_value(reg_type: &str, data: &str) -> Option<RegistryValue> {
    match reg_type {
        "REG_DWORD" => u32::from_str_radix(data.trim().trim_start_matches("0x"), 16)
            .ok()
            .map(RegistryValue::Dword),
        "REG_QWORD" => u64::from_str_radix(data.trim().trim_start_matches("0x"), 16)
            .ok()
            .map(RegistryValue::Qword),
        "REG_SZ" => Some(RegistryValue::String(data.to_string())),
        "REG_EXPAND_SZ" => Some(RegistryValue::ExpandString(data.to_string())),
        "REG_MULTI_SZ" => Some(RegistryValue::MultiString(
            data.split("\\0")
                .filter(|part| !part.is_empty())
                .map(String::from)
                .collect(),
        )),
        "REG_BINARY" => {
            let hex = data.trim();
            if hex.len() % 2 != 0 || !hex.is_ascii() {
                return None;
            }
            (0..hex.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
                .collect::<Option<Vec<u8>>>()
                .map(RegistryValue::Binary)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM_KEY: &str = r"HKEY_LOCAL_MACHINE\SOFTWARE\Policies\Microsoft\Windows\System";

    fn sample_output() -> String {
        [
            "",
            SYSTEM_KEY,
            "    EnableSmartScreen    REG_DWORD    0x1",
            "    ShellSmartScreenLevel    REG_SZ    Block",
            "    Big Value    REG_QWORD    0x100000000",
            "    Paths    REG_MULTI_SZ    System\\CurrentControlSet\\Control\\ProductOptions\\0Software\\Microsoft",
            "    Blob    REG_BINARY    01FF",
            "    Empty    REG_SZ    ",
            "    Nothing    REG_NONE    ",
            "",
            r"HKEY_LOCAL_MACHINE\SOFTWARE\Policies\Microsoft\Windows\System\Child",
            "",
        ]
        .join("\r\n")
    }

    #[test]
    fn test_parse_values() {
        let parsed = parse_reg_query_output(&sample_output(), SYSTEM_KEY);
        let values: BTreeMap<_, _> = parsed.values.into_iter().collect();

        assert_eq!(values["EnableSmartScreen"], RegistryValue::Dword(1));
        assert_eq!(
            values["ShellSmartScreenLevel"],
            RegistryValue::String("Block".to_string())
        );
        assert_eq!(values["Big Value"], RegistryValue::Qword(1 << 32));
        assert_eq!(
            values["Paths"],
            RegistryValue::MultiString(vec![
                r"System\CurrentControlSet\Control\ProductOptions".to_string(),
                r"Software\Microsoft".to_string(),
            ])
        );
        assert_eq!(values["Blob"], RegistryValue::Binary(vec![0x01, 0xff]));
        assert_eq!(values["Empty"], RegistryValue::String(String::new()));
        assert!(!values.contains_key("Nothing"));
    }

    #[test]
    fn test_parse_subkeys() {
        let parsed = parse_reg_query_output(&sample_output(), SYSTEM_KEY);
        assert_eq!(parsed.subkeys, vec!["Child".to_string()]);
    }

    #[test]
    fn test_snapshot_key_reads() {
        let parsed = parse_reg_query_output(&sample_output(), SYSTEM_KEY);
        let key = SnapshotKey::new(r"SOFTWARE\Policies\Microsoft\Windows\System", parsed.values);

        assert_eq!(key.get_integer("enablesmartscreen").unwrap(), 1);
        assert_eq!(key.get_string("Paths").unwrap().lines().count(), 2);
        assert!(matches!(
            key.get_string("Blob"),
            Err(StoreError::ValueTypeMismatch { .. })
        ));
        assert!(matches!(
            key.get_integer("Missing"),
            Err(StoreError::ValueMissing { .. })
        ));
    }

    fn output(exit_code: i32, stdout: &str, stderr: &str) -> CommandOutput {
        CommandOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code,
            duration: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_key_from_output_ignores_header_case() {
        let stdout = [
            "",
            r"HKEY_LOCAL_MACHINE\SOFTWARE\POLICIES\MICROSOFT\WINDOWS\SYSTEM",
            "    EnableSmartScreen    REG_DWORD    0x1",
            "",
        ]
        .join("\r\n");

        let key = key_from_output(
            &RootKey::LocalMachine,
            r"SOFTWARE\Policies\Microsoft\Windows\System",
            &output(0, &stdout, ""),
        )
        .unwrap();
        assert_eq!(key.get_integer("EnableSmartScreen").unwrap(), 1);
        assert_eq!(key.path(), r"SOFTWARE\Policies\Microsoft\Windows\System");
    }

    #[test]
    fn test_non_zero_exit_is_path_not_found() {
        let result = key_from_output(
            &RootKey::LocalMachine,
            r"SOFTWARE\Nowhere",
            &output(
                1,
                "",
                "ERROR: The system was unable to find the specified registry key or value.",
            ),
        );
        assert!(matches!(
            result,
            Err(StoreError::PathNotFound { ref path, .. }) if path == r"SOFTWARE\Nowhere"
        ));
    }

    #[test]
    fn test_access_denied_message() {
        let result = key_from_output(
            &RootKey::LocalMachine,
            r"SECURITY\Policy",
            &output(1, "", "ERROR: Access is denied."),
        );
        assert!(matches!(result, Err(StoreError::AccessDenied { .. })));

        // Only the English message is recognised
        let localized = key_from_output(
            &RootKey::LocalMachine,
            r"SECURITY\Policy",
            &output(1, "", "FEHLER: Zugriff verweigert"),
        );
        assert!(matches!(localized, Err(StoreError::PathNotFound { .. })));
    }

    #[test]
    fn test_root_probe_mapping() {
        let root = RootKey::Users("S-1-5-21-404".to_string());
        assert!(root_from_output(&root, &output(0, r"HKEY_USERS\S-1-5-21-404", "")).is_ok());

        let failed = root_from_output(
            &root,
            &output(
                1,
                "",
                "ERROR: The system was unable to find the specified registry key or value.\r\n",
            ),
        );
        assert!(matches!(
            failed,
            Err(StoreError::RootUnavailable { ref root, ref reason })
                if root == r"HKU\S-1-5-21-404" && reason.starts_with("ERROR:")
        ));
    }

    #[test]
    fn test_full_path_formatting() {
        assert_eq!(
            RegQueryStore::full_path(&RootKey::LocalMachine, r"\SOFTWARE\Policies\"),
            r"HKLM\SOFTWARE\Policies"
        );
        assert_eq!(RegQueryStore::full_path(&RootKey::CurrentUser, ""), "HKCU");
        assert_eq!(
            format_long_path(&RootKey::Users("S-1-5-18".to_string()), "Software"),
            r"HKEY_USERS\S-1-5-18\Software"
        );
    }
}
