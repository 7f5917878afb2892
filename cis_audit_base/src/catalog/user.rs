//! Per-user policy groups, evaluated against the user root
//!
//! Paths are relative to the user hive so the same group works for `HKCU` and
//! `HKU\<sid>`.

use crate::catalog::{GroupKind, RuleGroup};
use crate::constraints::Constraint;

fn group(name: &str, path: &str) -> RuleGroup {
    RuleGroup::new(name, GroupKind::UserPolicy, path)
}

pub(crate) fn groups() -> Vec<RuleGroup> {
    vec![
        group(
            "user_attachments",
            r"Software\Microsoft\Windows\CurrentVersion\Policies\Attachments",
        )
        .benchmark("19.7.5.1")
        .benchmark("19.7.5.2")
        .rule("SaveZoneInformation", Constraint::exact(2))
        .rule("ScanWithAntiVirus", Constraint::exact(3)),
        group(
            "user_explorer_sharing",
            r"Software\Microsoft\Windows\CurrentVersion\Policies\Explorer",
        )
        .benchmark("19.7.28.1")
        .rule("NoInplaceSharing", Constraint::exact(1)),
        group(
            "user_cloud_content",
            r"Software\Policies\Microsoft\Windows\CloudContent",
        )
        .benchmark("19.7.8.1")
        .benchmark("19.7.8.5")
        .rule("ConfigureWindowsSpotlight", Constraint::exact(2))
        .rule("DisableThirdPartySuggestions", Constraint::exact(1))
        .rule("DisableTailoredExperiencesWithDiagnosticData", Constraint::exact(1))
        .rule("DisableWindowsSpotlightFeatures", Constraint::exact(1))
        .rule("DisableSpotlightCollectionOnDesktop", Constraint::exact(1)),
        // Screen saver policy values are stored as REG_SZ
        group(
            "user_screen_saver",
            r"Software\Policies\Microsoft\Windows\Control Panel\Desktop",
        )
        .benchmark("19.1.3.1")
        .benchmark("19.1.3.2")
        .rule("ScreenSaveActive", Constraint::text("1"))
        .rule("ScreenSaverIsSecure", Constraint::text("1")),
        group(
            "user_push_notifications",
            r"Software\Policies\Microsoft\Windows\CurrentVersion\PushNotifications",
        )
        .benchmark("19.5.1.1")
        .rule("NoToastApplicationNotificationOnLockScreen", Constraint::exact(1)),
        group("user_installer", r"Software\Policies\Microsoft\Windows\Installer")
            .benchmark("19.7.42.1")
            .rule("AlwaysInstallElevated", Constraint::exact(0)),
    ]
}
