//! Miscellaneous security options outside the policy hives

use crate::catalog::{GroupKind, RuleGroup};
use crate::constraints::Constraint;

const CONTROL: &str = r"SYSTEM\CurrentControlSet\Control";

const WINREG_EXACT_PATHS: [&str; 3] = [
    r"System\CurrentControlSet\Control\ProductOptions",
    r"System\CurrentControlSet\Control\Server Applications",
    r"Software\Microsoft\Windows NT\CurrentVersion",
];

const WINREG_PATHS: [&str; 11] = [
    r"System\CurrentControlSet\Control\Print\Printers",
    r"System\CurrentControlSet\Services\Eventlog",
    r"Software\Microsoft\OLAP Server",
    r"Software\Microsoft\Windows NT\CurrentVersion\Print",
    r"Software\Microsoft\Windows NT\CurrentVersion\Windows",
    r"System\CurrentControlSet\Control\ContentIndex",
    r"System\CurrentControlSet\Control\Terminal Server",
    r"System\CurrentControlSet\Control\Terminal Server\UserConfig",
    r"System\CurrentControlSet\Control\Terminal Server\DefaultUserConfiguration",
    r"Software\Microsoft\Windows NT\CurrentVersion\Perflib",
    r"System\CurrentControlSet\Services\SysmonLog",
];

fn group(name: &str, path: impl AsRef<str>) -> RuleGroup {
    RuleGroup::new(name, GroupKind::Miscellaneous, path.as_ref())
}

pub(crate) fn groups() -> Vec<RuleGroup> {
    vec![
        group(
            "wifi_hotspot",
            r"SOFTWARE\Microsoft\WcmSvc\wifinetworkmanager\config",
        )
        .benchmark("18.6.23.2.1")
        .rule("AutoConnectAllowedOEM", Constraint::exact(0)),
        group(
            "winlogon",
            r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\Winlogon",
        )
        .benchmark("2.3.4.1")
        .benchmark("2.3.7.7")
        .benchmark("18.5.1")
        .rule("AllocateDASD", Constraint::text("0"))
        .rule("AutoAdminLogon", Constraint::text("0"))
        .rule("PasswordExpiryWarning", Constraint::range(5, 14))
        .rule("ScRemoveOption", Constraint::text("1")),
        group("lsa", format!(r"{}\Lsa", CONTROL))
            .benchmark("2.3.1.2")
            .benchmark("2.3.10.2")
            .benchmark("2.3.11.7")
            .rule("LimitBlankPasswordUse", Constraint::exact(1))
            .rule("SCENoApplyLegacyAuditPolicy", Constraint::exact(1))
            .rule("CrashOnAuditFail", Constraint::exact(0))
            .rule("RestrictAnonymousSAM", Constraint::exact(1))
            .rule("RestrictAnonymous", Constraint::exact(1))
            .rule("DisableDomainCreds", Constraint::exact(1))
            .rule("EveryoneIncludesAnonymous", Constraint::exact(0))
            .rule("ForceGuest", Constraint::exact(0))
            .rule("UseMachineId", Constraint::exact(1))
            .rule("NoLMHash", Constraint::exact(1))
            .rule("LmCompatibilityLevel", Constraint::exact(5))
            .rule("RestrictRemoteSAM", Constraint::text("O:BAG:BAD:(A;;RC;;;BA)")),
        group("msv1_0", format!(r"{}\Lsa\MSV1_0", CONTROL))
            .benchmark("2.3.11.2")
            .benchmark("2.3.11.9")
            .rule("AllowNullSessionFallback", Constraint::exact(0))
            .rule("NTLMMinClientSec", Constraint::exact(537_395_200))
            .rule("NTLMMinServerSec", Constraint::exact(537_395_200)),
        group("pku2u", format!(r"{}\Lsa\pku2u", CONTROL))
            .benchmark("2.3.11.3")
            .rule("AllowOnlineID", Constraint::exact(0)),
        group("sam", format!(r"{}\SAM", CONTROL))
            .benchmark("1.1.6")
            .rule("RelaxMinimumPasswordLengthLimits", Constraint::exact(1)),
        group(
            "winreg_exact_paths",
            format!(r"{}\SecurePipeServers\Winreg\AllowedExactPaths", CONTROL),
        )
        .benchmark("2.3.10.7")
        .rule("Machine", Constraint::text(WINREG_EXACT_PATHS.join("\n"))),
        group(
            "winreg_paths",
            format!(r"{}\SecurePipeServers\Winreg\AllowedPaths", CONTROL),
        )
        .benchmark("2.3.10.8")
        .rule("Machine", Constraint::text(WINREG_PATHS.join("\n"))),
        group(
            "wdigest",
            format!(r"{}\SecurityProviders\WDigest", CONTROL),
        )
        .benchmark("18.4.8")
        .rule("UseLogonCredential", Constraint::exact(0)),
        group("session_manager", format!(r"{}\Session Manager", CONTROL))
            .benchmark("2.3.15.2")
            .benchmark("18.5.8")
            .rule("ProtectionMode", Constraint::exact(1))
            .rule("SafeDllSearchMode", Constraint::exact(1)),
        group(
            "session_manager_kernel",
            format!(r"{}\Session Manager\Kernel", CONTROL),
        )
        .benchmark("2.3.15.1")
        .rule("ObCaseInsensitive", Constraint::exact(1)),
    ]
}
