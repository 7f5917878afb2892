//! Golden store generation
//!
//! Produces a store in which every rule of the catalog is satisfied. Used for fixtures
//! and as a reference export of the baseline.

use crate::catalog::{Catalog, Scope};
use crate::execution::engine::AuditTarget;
use crate::os_version::{OsVersion, CURRENT_VERSION_PATH};
use crate::store::{MemoryStore, RegistryValue, RootKey};
use log::warn;

/// Store holding a satisfying value for every rule, under the roots of `target`
///
/// The release information of `target.os_version` is recorded as well, so the store can
/// be audited with OS detection enabled.
pub fn baseline_store(catalog: &Catalog, target: &AuditTarget) -> MemoryStore {
    let mut store = MemoryStore::new().with_id("baseline");
    store.add_root(target.machine_root.clone());
    store.add_root(target.user_root.clone());

    for group in catalog.groups() {
        let root = match group.scope() {
            Scope::Machine => &target.machine_root,
            Scope::User => &target.user_root,
        };

        for rule in group.rules() {
            match rule.constraint.satisfying_value() {
                Some(value) => {
                    store.set_value(root, &rule.path, &rule.setting, value);
                }
                None => warn!("Rule '{}' has no satisfying value", rule.id),
            }
        }
    }

    record_os_version(&mut store, &target.machine_root, target.os_version);
    store
}

fn record_os_version(store: &mut MemoryStore, root: &RootKey, os: OsVersion) {
    let (major, build) = match os.normalized() {
        OsVersion::Windows10 => (10, "19045"),
        OsVersion::Windows11 => (10, "22631"),
        OsVersion::Other(major) => (major, "0"),
    };

    store
        .set_value(
            root,
            CURRENT_VERSION_PATH,
            "CurrentMajorVersionNumber",
            RegistryValue::Dword(major),
        )
        .set_value(
            root,
            CURRENT_VERSION_PATH,
            "CurrentBuildNumber",
            RegistryValue::String(build.to_string()),
        );
}
