//! Groups that only apply to one Windows release

use crate::catalog::{GroupKind, RuleGroup};
use crate::constraints::Constraint;

fn windows10(name: &str, path: &str) -> RuleGroup {
    RuleGroup::new(name, GroupKind::Windows10Only, path)
}

pub(crate) fn windows10_groups() -> Vec<RuleGroup> {
    vec![
        windows10("win10_print_rpc_privacy", r"SYSTEM\CurrentControlSet\Control\Print")
            .benchmark("18.4.2")
            .rule("RpcAuthnLevelPrivacyEnabled", Constraint::exact(1)),
        windows10("win10_netbios", r"SOFTWARE\Policies\Microsoft\Windows NT\DNSClient")
            .benchmark("18.6.4.2")
            .rule("EnableNetbios", Constraint::one_of(&[0, 2])),
        windows10(
            "win10_printer_redirection",
            r"SOFTWARE\Policies\Microsoft\Windows NT\Printers",
        )
        .benchmark("18.7.2")
        .benchmark("18.7.3")
        .rule("RedirectionguardPolicy", Constraint::exact(1))
        .rule("CopyFilesPolicy", Constraint::exact(1)),
        windows10(
            "win10_printer_rpc",
            r"SOFTWARE\Policies\Microsoft\Windows NT\Printers\RPC",
        )
        .benchmark("18.7.4")
        .benchmark("18.7.9")
        .rule("RpcUseNamedPipeProtocol", Constraint::exact(0))
        .rule("RpcAuthentication", Constraint::exact(0))
        .rule("RpcProtocols", Constraint::exact(5))
        .rule("ForceKerberosForRpc", Constraint::exact(1))
        .rule("RpcTcpPort", Constraint::exact(0)),
        windows10("win10_custom_ssp", r"SOFTWARE\Policies\Microsoft\Windows\System")
            .benchmark("18.9.26.1")
            .rule("AllowCustomSSPsAPs", Constraint::exact(0)),
        windows10("win10_app_installer", r"SOFTWARE\Policies\Microsoft\Windows\AppInstaller")
            .benchmark("18.10.17.1")
            .benchmark("18.10.17.4")
            .rule("EnableAppInstaller", Constraint::exact(0))
            .rule("EnableExperimentalFeatures", Constraint::exact(0))
            .rule("EnableHashOverride", Constraint::exact(0))
            .rule("EnableMSAppInstallerProtocol", Constraint::exact(0)),
        windows10(
            "win10_ie_notifications",
            r"SOFTWARE\Policies\Microsoft\Internet Explorer\Main",
        )
        .benchmark("18.10.29.1")
        .rule("NotifyDisableIEOptions", Constraint::exact(0)),
        windows10(
            "win10_asr_vulnerable_drivers",
            r"SOFTWARE\Policies\Microsoft\Windows Defender\Windows Defender Exploit Guard\ASR\Rules",
        )
        .benchmark("18.10.43.6.1.2")
        .rule("56a863a9-875e-4185-98a7-b882c64b5ce5", Constraint::text("1")),
        windows10(
            "win10_mpr_notifications",
            r"SOFTWARE\Microsoft\Windows\CurrentVersion\Policies\System",
        )
        .benchmark("18.9.27.3")
        .rule("EnableMPR", Constraint::exact(0)),
    ]
}

pub(crate) fn windows11_groups() -> Vec<RuleGroup> {
    vec![RuleGroup::new(
        "win11_dns_over_https",
        GroupKind::Windows11Only,
        r"SOFTWARE\Policies\Microsoft\Windows NT\DNSClient",
    )
    .benchmark("18.6.4.1")
    .rule("DoHPolicy", Constraint::one_of(&[2, 3]))]
}
