//! Service configuration groups
//!
//! Services that must be disabled (`Start == 4`) plus the parameter keys of network
//! and logging services.

use crate::catalog::{GroupKind, RuleGroup};
use crate::constraints::Constraint;

const SERVICES: &str = r"SYSTEM\CurrentControlSet\Services";

/// Start value of a disabled service
const SERVICE_DISABLED: u64 = 4;

/// `(service key, benchmark reference)`
const DISABLED_SERVICES: [(&str, &str); 22] = [
    ("Browser", "5.2"),
    ("IISADMIN", "5.4"),
    ("irmon", "5.5"),
    ("LxssManager", "5.7"),
    ("FTPSVC", "5.8"),
    ("sshd", "5.10"),
    ("RpcLocator", "5.24"),
    ("RemoteAccess", "5.26"),
    ("simptcp", "5.29"),
    ("sacsvr", "5.31"),
    ("SSDPSRV", "5.32"),
    ("upnphost", "5.33"),
    ("WMSvc", "5.34"),
    ("WMPNetworkSvc", "5.37"),
    ("icssvc", "5.38"),
    ("W3SVC", "5.41"),
    ("XboxGipSvc", "5.42"),
    ("XblAuthManager", "5.43"),
    ("XblGameSave", "5.44"),
    ("XboxNetApiSvc", "5.45"),
    ("SharedAccess", "5.6"),
    ("mrxsmb10", "18.4.3"),
];

fn group(name: &str, service_path: &str) -> RuleGroup {
    RuleGroup::new(
        name,
        GroupKind::Service,
        &format!(r"{}\{}", SERVICES, service_path),
    )
}

fn disabled_service(service: &str, reference: &str) -> RuleGroup {
    group(&format!("service_{}", service.to_lowercase()), service)
        .benchmark(reference)
        .rule("Start", Constraint::exact(SERVICE_DISABLED))
}

pub(crate) fn groups() -> Vec<RuleGroup> {
    let mut groups: Vec<RuleGroup> = DISABLED_SERVICES
        .iter()
        .map(|(service, reference)| disabled_service(service, reference))
        .collect();

    groups.extend([
        group("eventlog_security_warning", r"Eventlog\Security")
            .benchmark("18.5.13")
            .rule("WarningLevel", Constraint::range(0, 90)),
        group("ldap_client", "LDAP")
            .benchmark("2.3.11.8")
            .rule("LDAPClientIntegrity", Constraint::one_of(&[1, 2])),
        group("netbt", r"NetBT\Parameters")
            .benchmark("18.4.6")
            .benchmark("18.5.6")
            .rule("NodeType", Constraint::exact(2))
            .rule("NoNameReleaseOnDemand", Constraint::exact(1)),
        group("netlogon", r"Netlogon\Parameters")
            .benchmark("2.3.6.1")
            .benchmark("2.3.6.6")
            .rule("RequireSignOrSeal", Constraint::exact(1))
            .rule("SealSecureChannel", Constraint::exact(1))
            .rule("SignSecureChannel", Constraint::exact(1))
            .rule("DisablePasswordChange", Constraint::exact(0))
            .rule("MaximumPasswordAge", Constraint::range(1, 30))
            .rule("RequireStrongKey", Constraint::exact(1)),
        group("tcpip", r"Tcpip\Parameters")
            .benchmark("18.5.2")
            .benchmark("18.5.4")
            .rule("DisableIPSourceRouting", Constraint::exact(2))
            .rule("EnableICMPRedirect", Constraint::exact(0)),
        group("tcpip6", r"Tcpip6\Parameters")
            .benchmark("18.5.3")
            .rule("DisableIPSourceRouting", Constraint::exact(2)),
    ]);

    groups
}
