//! Machine-wide policy groups (HKLM)
//!
//! Benchmark references follow the CIS Microsoft Windows 11 Enterprise numbering.

use crate::catalog::{GroupKind, RuleGroup};
use crate::constraints::Constraint;

const CURRENT_VERSION_POLICIES: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Policies";
const WINDOWS_POLICIES: &str = r"SOFTWARE\Policies\Microsoft\Windows";
const WINDOWS_NT_POLICIES: &str = r"SOFTWARE\Policies\Microsoft\Windows NT";
const DEFENDER_POLICIES: &str = r"SOFTWARE\Policies\Microsoft\Windows Defender";
const FIREWALL_POLICIES: &str = r"SOFTWARE\Policies\Microsoft\WindowsFirewall";

fn group(name: &str, path: impl AsRef<str>) -> RuleGroup {
    RuleGroup::new(name, GroupKind::MachinePolicy, path.as_ref())
}

pub(crate) fn groups() -> Vec<RuleGroup> {
    let mut groups = vec![
        credential_ui(),
        explorer_restrictions(),
        user_account_control(),
        interactive_logon(),
        process_creation_audit(),
        kerberos(),
        credssp(),
    ];
    groups.extend(defender());
    groups.extend(network_client());
    groups.extend(printing());
    groups.extend(remote_access());
    groups.extend(privacy_and_telemetry());
    groups.extend(event_logs());
    groups.extend(smb());
    groups.extend(scripting());
    groups.extend(updates());
    groups.extend(firewall());
    groups.extend(system_hardening());
    groups
}

// ============================================================================
// Credentials and UAC
// ============================================================================

/// 18.10.15.2
fn credential_ui() -> RuleGroup {
    group("credui", format!(r"{}\CredUI", CURRENT_VERSION_POLICIES))
        .benchmark("18.10.15.2")
        .rule("EnumerateAdministrators", Constraint::exact(0))
}

/// 18.10.8.x, 18.10.29.x autoplay and shell protocol restrictions
fn explorer_restrictions() -> RuleGroup {
    group("explorer_policies", format!(r"{}\Explorer", CURRENT_VERSION_POLICIES))
        .benchmark("18.10.8.2")
        .benchmark("18.10.8.3")
        .benchmark("18.9.20.1.5")
        .rule("NoAutorun", Constraint::exact(1))
        .rule("NoDriveTypeAutoRun", Constraint::exact(255))
        .rule("NoWebServices", Constraint::exact(1))
        .rule("NoInternetOpenWith", Constraint::exact(1))
        .rule("NoPublishingWizard", Constraint::exact(1))
}

/// 2.3.17.x User Account Control
fn user_account_control() -> RuleGroup {
    group("uac", format!(r"{}\System", CURRENT_VERSION_POLICIES))
        .benchmark("2.3.17.1")
        .benchmark("2.3.17.8")
        .rule("FilterAdministratorToken", Constraint::exact(1))
        .rule("ConsentPromptBehaviorAdmin", Constraint::one_of(&[1, 2]))
        .rule("ConsentPromptBehaviorUser", Constraint::exact(0))
        .rule("EnableInstallerDetection", Constraint::exact(1))
        .rule("EnableSecureUIAPaths", Constraint::exact(1))
        .rule("EnableLUA", Constraint::exact(1))
        .rule("PromptOnSecureDesktop", Constraint::exact(1))
        .rule("EnableVirtualization", Constraint::exact(1))
}

/// 2.3.7.x Interactive logon
fn interactive_logon() -> RuleGroup {
    group("interactive_logon", format!(r"{}\System", CURRENT_VERSION_POLICIES))
        .benchmark("2.3.7.1")
        .benchmark("2.3.7.4")
        .rule("DontDisplayLastUserName", Constraint::exact(1))
        .rule("DisableCAD", Constraint::exact(0))
        .rule("InactivityTimeoutSecs", Constraint::range(1, 900))
        .rule("MaxDevicePasswordFailedAttempts", Constraint::range(1, 10))
        .rule("LocalAccountTokenFilterPolicy", Constraint::exact(0))
        .rule("DisableAutomaticRestartSignOn", Constraint::exact(1))
        .rule("MSAOptional", Constraint::exact(1))
        .rule("NoConnectedUser", Constraint::exact(3))
}

/// 18.9.3.1
fn process_creation_audit() -> RuleGroup {
    group("process_creation_audit", format!(r"{}\System\Audit", CURRENT_VERSION_POLICIES))
        .benchmark("18.9.3.1")
        .rule("ProcessCreationIncludeCmdLine_Enabled", Constraint::exact(1))
}

/// 2.3.11.4
fn kerberos() -> RuleGroup {
    group(
        "kerberos",
        format!(r"{}\System\Kerberos\Parameters", CURRENT_VERSION_POLICIES),
    )
    .benchmark("2.3.11.4")
    .rule("SupportedEncryptionTypes", Constraint::exact(2_147_483_640))
}

/// 18.9.4.1 encryption oracle remediation
fn credssp() -> RuleGroup {
    group("credssp", format!(r"{}\System\CredSSP\Parameters", CURRENT_VERSION_POLICIES))
        .benchmark("18.9.4.1")
        .rule("AllowEncryptionOracle", Constraint::exact(0))
}

// ============================================================================
// Microsoft Defender
// ============================================================================

/// Attack surface reduction rules that must be in block mode
const ASR_RULES: [&str; 12] = [
    "26190899-1602-49e8-8b27-eb1d0a1ce869",
    "3b576869-a4ec-4529-8536-b80a7769e899",
    "5beb7efe-fd9a-4556-801d-275e5ffc04cc",
    "75668c1f-73b5-4cf0-bb93-3ecf5cb7cc84",
    "7674ba52-37eb-4a4f-a9a1-f0f9a1619a2c",
    "92e97fa1-2edf-4476-bdd6-9dd0b4dddc7b",
    "9e6c4e1f-7d60-472f-ba1a-a39ef669e4b2",
    "b2b3f03d-6a65-4f7b-a9c7-1c7ef74a9ba4",
    "be9ba2d9-53ea-4cdc-84e5-9b1eeee46550",
    "d3e037e1-3eb8-44c8-a917-57927947596d",
    "d4f940ab-401b-4efc-aadc-ad5f3c50688a",
    "e6db77e5-3df2-4cf1-b95a-636979351e5b",
];

fn defender() -> Vec<RuleGroup> {
    let asr_rules = ASR_RULES.iter().fold(
        group(
            "defender_asr_rules",
            format!(r"{}\Windows Defender Exploit Guard\ASR\Rules", DEFENDER_POLICIES),
        )
        .benchmark("18.10.43.6.1.2"),
        |rules, guid| rules.rule(guid, Constraint::text("1")),
    );

    vec![
        group("defender", DEFENDER_POLICIES)
            .benchmark("18.10.43.16")
            .benchmark("18.10.43.17")
            .rule("PUAProtection", Constraint::exact(1))
            .rule("DisableAntiSpyware", Constraint::exact(0)),
        group(
            "defender_realtime",
            format!(r"{}\Real-Time Protection", DEFENDER_POLICIES),
        )
        .benchmark("18.10.43.10.1")
        .rule("DisableBehaviorMonitoring", Constraint::exact(0))
        .rule("DisableIOAVProtection", Constraint::exact(0))
        .rule("DisableRealtimeMonitoring", Constraint::exact(0))
        .rule("DisableScriptScanning", Constraint::exact(0)),
        group("defender_scan", format!(r"{}\Scan", DEFENDER_POLICIES))
            .benchmark("18.10.43.13.1")
            .rule("DisableRemovableDriveScanning", Constraint::exact(0))
            .rule("DisableEmailScanning", Constraint::exact(0))
            .rule("DisablePackedExeScanning", Constraint::exact(0)),
        group("defender_spynet", format!(r"{}\Spynet", DEFENDER_POLICIES))
            .benchmark("18.10.43.5.1")
            .rule("LocalSettingOverrideSpynetReporting", Constraint::exact(0)),
        group("defender_mpengine", format!(r"{}\MpEngine", DEFENDER_POLICIES))
            .benchmark("18.10.43.7.1")
            .rule("EnableFileHashComputation", Constraint::exact(1)),
        group(
            "defender_asr",
            format!(r"{}\Windows Defender Exploit Guard\ASR", DEFENDER_POLICIES),
        )
        .benchmark("18.10.43.6.1.1")
        .rule("ExploitGuard_ASR_Rules", Constraint::exact(1)),
        asr_rules,
        group(
            "defender_network_protection",
            format!(
                r"{}\Windows Defender Exploit Guard\Network Protection",
                DEFENDER_POLICIES
            ),
        )
        .benchmark("18.10.43.6.3.1")
        .rule("EnableNetworkProtection", Constraint::exact(1)),
        group(
            "defender_app_browser",
            r"SOFTWARE\Policies\Microsoft\Windows Defender Security Center\App and Browser protection",
        )
        .benchmark("18.10.93.2.1")
        .rule("DisallowExploitProtectionOverride", Constraint::exact(1)),
    ]
}

// ============================================================================
// Network client
// ============================================================================

fn network_client() -> Vec<RuleGroup> {
    vec![
        group("dns_client", format!(r"{}\DNSClient", WINDOWS_NT_POLICIES))
            .benchmark("18.6.4.4")
            .rule("EnableMulticast", Constraint::exact(0)),
        group(
            "lanman_workstation_policy",
            format!(r"{}\LanmanWorkstation", WINDOWS_POLICIES),
        )
        .benchmark("18.6.8.1")
        .rule("AllowInsecureGuestAuth", Constraint::exact(0)),
        group(
            "network_connections",
            format!(r"{}\Network Connections", WINDOWS_POLICIES),
        )
        .benchmark("18.6.11.2")
        .benchmark("18.6.11.3")
        .rule("NC_AllowNetBridge_NLA", Constraint::exact(0))
        .rule("NC_ShowSharedAccessUI", Constraint::exact(0))
        .rule("NC_StdDomainUserSetLocation", Constraint::exact(1)),
        group(
            "hardened_paths",
            format!(r"{}\NetworkProvider\HardenedPaths", WINDOWS_POLICIES),
        )
        .benchmark("18.6.14.1")
        .rule(
            r"\\*\NETLOGON",
            Constraint::text("RequireMutualAuthentication=1, RequireIntegrity=1"),
        )
        .rule(
            r"\\*\SYSVOL",
            Constraint::text("RequireMutualAuthentication=1, RequireIntegrity=1"),
        ),
        group(
            "connection_manager",
            format!(r"{}\WcmSvc\GroupPolicy", WINDOWS_POLICIES),
        )
        .benchmark("18.6.21.1")
        .benchmark("18.6.21.2")
        .rule("fMinimizeConnections", Constraint::exact(3))
        .rule("fBlockNonDomain", Constraint::exact(1)),
        group("connect", format!(r"{}\Connect", WINDOWS_POLICIES))
            .benchmark("18.10.14.1")
            .rule("RequirePinForPairing", Constraint::one_of(&[1, 2])),
    ]
}

// ============================================================================
// Printing
// ============================================================================

fn printing() -> Vec<RuleGroup> {
    vec![
        group("printers", format!(r"{}\Printers", WINDOWS_NT_POLICIES))
            .benchmark("18.7.1")
            .benchmark("18.9.20.1.2")
            .rule("DisableWebPnPDownload", Constraint::exact(1))
            .rule("DisableHTTPPrinting", Constraint::exact(1))
            .rule("RegisterSpoolerRemoteRpcEndPoint", Constraint::exact(2)),
        group(
            "point_and_print",
            format!(r"{}\Printers\PointAndPrint", WINDOWS_NT_POLICIES),
        )
        .benchmark("18.7.10")
        .benchmark("18.7.11")
        .rule("RestrictDriverInstallationToAdministrators", Constraint::exact(1))
        .rule("NoWarningNoElevationOnInstall", Constraint::exact(0))
        .rule("UpdatePromptSettings", Constraint::exact(0)),
    ]
}

// ============================================================================
// Remote access
// ============================================================================

fn remote_access() -> Vec<RuleGroup> {
    vec![
        group("rpc", format!(r"{}\Rpc", WINDOWS_NT_POLICIES))
            .benchmark("18.9.36.1")
            .benchmark("18.9.36.2")
            .rule("EnableAuthEpResolution", Constraint::exact(1))
            .rule("RestrictRemoteClients", Constraint::exact(1)),
        group(
            "terminal_services",
            format!(r"{}\Terminal Services", WINDOWS_NT_POLICIES),
        )
        .benchmark("18.10.57.2.2")
        .benchmark("18.10.57.3.9.1")
        .rule("DisablePasswordSaving", Constraint::exact(1))
        .rule("fDisableCdm", Constraint::exact(1))
        .rule("fDisableCcm", Constraint::exact(1))
        .rule("fDisableLPT", Constraint::exact(1))
        .rule("fDisablePNPRedir", Constraint::exact(1))
        .rule("fPromptForPassword", Constraint::exact(1))
        .rule("fEncryptRPCTraffic", Constraint::exact(1))
        .rule("SecurityLayer", Constraint::exact(2))
        .rule("UserAuthentication", Constraint::exact(1))
        .rule("MinEncryptionLevel", Constraint::exact(3))
        .rule("MaxIdleTime", Constraint::range(1, 900_000))
        .rule("MaxDisconnectionTime", Constraint::exact(60_000))
        .rule("DeleteTempDirsOnExit", Constraint::exact(1))
        .rule("fAllowUnsolicited", Constraint::exact(0))
        .rule("fAllowToGetHelp", Constraint::exact(0)),
        group(
            "winrm_client",
            format!(r"{}\WinRM\Client", WINDOWS_POLICIES),
        )
        .benchmark("18.10.88.1.1")
        .rule("AllowBasic", Constraint::exact(0))
        .rule("AllowUnencryptedTraffic", Constraint::exact(0))
        .rule("AllowDigest", Constraint::exact(0)),
        group(
            "winrm_service",
            format!(r"{}\WinRM\Service", WINDOWS_POLICIES),
        )
        .benchmark("18.10.88.2.1")
        .rule("AllowBasic", Constraint::exact(0))
        .rule("AllowAutoConfig", Constraint::exact(0))
        .rule("AllowUnencryptedTraffic", Constraint::exact(0))
        .rule("DisableRunAs", Constraint::exact(1)),
        group(
            "winrs",
            format!(r"{}\WinRM\Service\WinRS", WINDOWS_POLICIES),
        )
        .benchmark("18.10.89.1")
        .rule("AllowRemoteShellAccess", Constraint::exact(0)),
    ]
}

// ============================================================================
// Privacy and telemetry
// ============================================================================

fn privacy_and_telemetry() -> Vec<RuleGroup> {
    vec![
        group("app_privacy", format!(r"{}\AppPrivacy", WINDOWS_POLICIES))
            .benchmark("18.10.6.1")
            .rule("LetAppsActivateWithVoiceAboveLock", Constraint::exact(2)),
        group("cloud_content", format!(r"{}\CloudContent", WINDOWS_POLICIES))
            .benchmark("18.10.12.1")
            .benchmark("18.10.12.3")
            .rule("DisableConsumerAccountStateContent", Constraint::exact(1))
            .rule("DisableCloudOptimizedContent", Constraint::exact(1))
            .rule("DisableWindowsConsumerFeatures", Constraint::exact(1)),
        group("data_collection", format!(r"{}\DataCollection", WINDOWS_POLICIES))
            .benchmark("18.10.16.1")
            .benchmark("18.10.16.8")
            .rule("AllowTelemetry", Constraint::one_of(&[0, 1]))
            .rule("DisableEnterpriseAuthProxy", Constraint::exact(1))
            .rule("DisableOneSettingsDownloads", Constraint::exact(1))
            .rule("DoNotShowFeedbackNotifications", Constraint::exact(1))
            .rule("EnableOneSettingsAuditing", Constraint::exact(1))
            .rule("LimitDiagnosticLogCollection", Constraint::exact(1))
            .rule("LimitDumpCollection", Constraint::exact(1)),
        group(
            "delivery_optimization",
            format!(r"{}\DeliveryOptimization", WINDOWS_POLICIES),
        )
        .benchmark("18.10.17.1")
        .rule("DODownloadMode", Constraint::one_of(&[0, 1, 2, 99, 100])),
        group("game_dvr", format!(r"{}\GameDVR", WINDOWS_POLICIES))
            .benchmark("18.10.78.1")
            .rule("AllowGameDVR", Constraint::exact(0)),
        group("onedrive", format!(r"{}\OneDrive", WINDOWS_POLICIES))
            .benchmark("18.10.50.1")
            .rule("DisableFileSyncNGSC", Constraint::exact(1)),
        group("personalization", format!(r"{}\Personalization", WINDOWS_POLICIES))
            .benchmark("18.1.1.1")
            .benchmark("18.1.1.2")
            .rule("NoLockScreenCamera", Constraint::exact(1))
            .rule("NoLockScreenSlideshow", Constraint::exact(1)),
        group(
            "input_personalization",
            r"SOFTWARE\Policies\Microsoft\InputPersonalization",
        )
        .benchmark("18.1.2.2")
        .rule("AllowInputPersonalization", Constraint::exact(0)),
        group("windows_search", format!(r"{}\Windows Search", WINDOWS_POLICIES))
            .benchmark("18.10.59.2")
            .benchmark("18.10.59.3")
            .rule("AllowCloudSearch", Constraint::exact(0))
            .rule("AllowCortana", Constraint::exact(0))
            .rule("AllowCortanaAboveLock", Constraint::exact(0))
            .rule("AllowIndexingEncryptedStoresOrItems", Constraint::exact(0))
            .rule("AllowSearchToUseLocation", Constraint::exact(0)),
        group("feeds", format!(r"{}\Windows Feeds", WINDOWS_POLICIES))
            .benchmark("18.10.58.1")
            .rule("EnableFeeds", Constraint::exact(0)),
        group("messaging", format!(r"{}\Messaging", WINDOWS_POLICIES))
            .benchmark("18.10.47.1")
            .rule("AllowMessageSync", Constraint::exact(0)),
        group(
            "ink_workspace",
            r"SOFTWARE\Policies\Microsoft\WindowsInkWorkspace",
        )
        .benchmark("18.10.80.2")
        .rule("AllowWindowsInkWorkspace", Constraint::one_of(&[0, 1])),
    ]
}

// ============================================================================
// Event logs
// ============================================================================

fn event_logs() -> Vec<RuleGroup> {
    [
        ("eventlog_application", "Application", 32_768, "18.10.26.1"),
        ("eventlog_security", "Security", 196_608, "18.10.26.2"),
        ("eventlog_setup", "Setup", 32_768, "18.10.26.3"),
        ("eventlog_system", "System", 32_768, "18.10.26.4"),
    ]
    .into_iter()
    .map(|(name, channel, min_size, reference)| {
        group(name, format!(r"{}\EventLog\{}", WINDOWS_POLICIES, channel))
            .benchmark(reference)
            .rule("Retention", Constraint::text("0"))
            .rule("MaxSize", Constraint::at_least(min_size))
    })
    .collect()
}

// ============================================================================
// SMB
// ============================================================================

fn smb() -> Vec<RuleGroup> {
    vec![
        group(
            "lanman_workstation",
            r"SYSTEM\CurrentControlSet\Services\LanmanWorkstation\Parameters",
        )
        .benchmark("2.3.8.1")
        .benchmark("2.3.8.3")
        .rule("RequireSecuritySignature", Constraint::exact(1))
        .rule("EnableSecuritySignature", Constraint::exact(1))
        .rule("EnablePlainTextPassword", Constraint::exact(0)),
        group(
            "lanman_server",
            r"SYSTEM\CurrentControlSet\Services\LanManServer\Parameters",
        )
        .benchmark("2.3.9.1")
        .benchmark("2.3.10.9")
        .rule("AutoDisconnect", Constraint::range(0, 15))
        .rule("RequireSecuritySignature", Constraint::exact(1))
        .rule("EnableSecuritySignature", Constraint::exact(1))
        .rule("EnableForcedLogoff", Constraint::exact(1))
        .rule("SMBServerNameHardeningLevel", Constraint::one_of(&[1, 2]))
        .rule("RestrictNullSessAccess", Constraint::exact(1))
        .rule("NullSessionPipes", Constraint::text(""))
        .rule("NullSessionShares", Constraint::text("")),
    ]
}

// ============================================================================
// PowerShell and installer
// ============================================================================

fn scripting() -> Vec<RuleGroup> {
    vec![
        group(
            "powershell_script_block_logging",
            format!(r"{}\PowerShell\ScriptBlockLogging", WINDOWS_POLICIES),
        )
        .benchmark("18.10.87.1")
        .rule("EnableScriptBlockLogging", Constraint::exact(1)),
        group(
            "powershell_transcription",
            format!(r"{}\PowerShell\Transcription", WINDOWS_POLICIES),
        )
        .benchmark("18.10.87.2")
        .rule("EnableTranscripting", Constraint::exact(1)),
        group("windows_installer", format!(r"{}\Installer", WINDOWS_POLICIES))
            .benchmark("18.10.81.1")
            .benchmark("18.10.81.2")
            .rule("EnableUserControl", Constraint::exact(0))
            .rule("AlwaysInstallElevated", Constraint::exact(0)),
        group("appx", format!(r"{}\Appx", WINDOWS_POLICIES))
            .benchmark("18.10.3.1")
            .rule("BlockNonAdminUserInstall", Constraint::exact(1)),
        group("windows_store", r"SOFTWARE\Policies\Microsoft\WindowsStore")
            .benchmark("18.10.66.2")
            .benchmark("18.10.66.4")
            .rule("AutoDownload", Constraint::exact(4))
            .rule("DisableOSUpgrade", Constraint::exact(1)),
        group("sandbox", format!(r"{}\Sandbox", WINDOWS_POLICIES))
            .benchmark("18.10.91.1")
            .benchmark("18.10.91.2")
            .rule("AllowClipboardRedirection", Constraint::exact(0))
            .rule("AllowNetworking", Constraint::exact(0)),
    ]
}

// ============================================================================
// Windows Update
// ============================================================================

fn updates() -> Vec<RuleGroup> {
    vec![
        group("preview_builds", format!(r"{}\PreviewBuilds", WINDOWS_POLICIES))
            .benchmark("18.10.16.7")
            .rule("AllowBuildPreview", Constraint::exact(0)),
        group("windows_update", format!(r"{}\WindowsUpdate", WINDOWS_POLICIES))
            .benchmark("18.10.92.4.1")
            .benchmark("18.10.92.4.3")
            .rule("ManagePreviewBuildsPolicyValue", Constraint::exact(1))
            .rule("DeferFeatureUpdates", Constraint::exact(1))
            .rule("DeferFeatureUpdatesPeriodInDays", Constraint::at_least(180))
            .rule("DeferQualityUpdates", Constraint::exact(1))
            .rule("DeferQualityUpdatesPeriodInDays", Constraint::exact(0))
            .rule("SetDisablePauseUXAccess", Constraint::exact(1)),
        group(
            "windows_update_au",
            format!(r"{}\WindowsUpdate\AU", WINDOWS_POLICIES),
        )
        .benchmark("18.10.92.2.1")
        .benchmark("18.10.92.2.2")
        .rule("NoAutoUpdate", Constraint::exact(0))
        .rule("ScheduledInstallDay", Constraint::exact(0))
        .rule("NoAutoRebootWithLoggedOnUsers", Constraint::exact(0)),
    ]
}

// ============================================================================
// Windows Firewall
// ============================================================================

fn firewall() -> Vec<RuleGroup> {
    let profiles = [
        ("domain", "DomainProfile", "domainfw.log", "9.1"),
        ("private", "PrivateProfile", "privatefw.log", "9.2"),
        ("public", "PublicProfile", "publicfw.log", "9.3"),
    ];

    profiles
        .into_iter()
        .flat_map(|(name, key, log_file, section)| {
            let mut base = group(
                &format!("firewall_{}", name),
                format!(r"{}\{}", FIREWALL_POLICIES, key),
            )
            .benchmark(&format!("{}.1", section))
            .rule("EnableFirewall", Constraint::exact(1))
            .rule("DefaultInboundAction", Constraint::exact(1))
            .rule("DefaultOutboundAction", Constraint::exact(0))
            .rule("DisableNotifications", Constraint::exact(1));

            if name == "public" {
                base = base
                    .rule("AllowLocalPolicyMerge", Constraint::exact(0))
                    .rule("AllowLocalIPsecPolicyMerge", Constraint::exact(0));
            }

            let logging = group(
                &format!("firewall_{}_logging", name),
                format!(r"{}\{}\Logging", FIREWALL_POLICIES, key),
            )
            .benchmark(&format!("{}.5", section))
            .rule(
                "LogFilePath",
                Constraint::text(format!(
                    r"%SystemRoot%\System32\logfiles\firewall\{}",
                    log_file
                )),
            )
            .rule("LogFileSize", Constraint::at_least(16_384))
            .rule("LogDroppedPackets", Constraint::exact(1))
            .rule("LogSuccessfulConnections", Constraint::exact(1));

            [base, logging]
        })
        .collect()
}

// ============================================================================
// System hardening
// ============================================================================

fn system_hardening() -> Vec<RuleGroup> {
    vec![
        group("windows_system", format!(r"{}\System", WINDOWS_POLICIES))
            .benchmark("18.9.27.1")
            .benchmark("18.10.76.2.1")
            .rule("EnableSmartScreen", Constraint::exact(1))
            .rule("ShellSmartScreenLevel", Constraint::text("Block"))
            .rule("BlockUserFromShowingAccountDetailsOnSignin", Constraint::exact(1))
            .rule("DontDisplayNetworkSelectionUI", Constraint::exact(1))
            .rule("DontEnumerateConnectedUsers", Constraint::exact(1))
            .rule("EnumerateLocalUsers", Constraint::exact(0))
            .rule("DisableLockScreenAppNotifications", Constraint::exact(1))
            .rule("AllowDomainPINLogon", Constraint::exact(0))
            .rule("EnableCdp", Constraint::exact(0))
            .rule("AllowCrossDeviceClipboard", Constraint::exact(0))
            .rule("UploadUserActivities", Constraint::exact(0)),
        group("windows_explorer", format!(r"{}\Explorer", WINDOWS_POLICIES))
            .benchmark("18.10.29.2")
            .benchmark("18.10.29.3")
            .rule("NoAutoplayfornonVolume", Constraint::exact(1))
            .rule("NoDataExecutionPrevention", Constraint::exact(0))
            .rule("NoHeapTerminationOnCorruption", Constraint::exact(0)),
        group(
            "group_policy_processing",
            format!(
                r"{}\Group Policy\{{35378EAC-683F-11D2-A89A-00C04FBBCFA2}}",
                WINDOWS_POLICIES
            ),
        )
        .benchmark("18.9.19.2")
        .benchmark("18.9.19.3")
        .rule("NoBackgroundPolicy", Constraint::exact(0))
        .rule("NoGPOListChanges", Constraint::exact(0)),
        group("early_launch", r"SYSTEM\CurrentControlSet\Policies\EarlyLaunch")
            .benchmark("18.9.13.1")
            .rule("DriverLoadPolicy", Constraint::one_of(&[1, 3, 8])),
        group(
            "kernel_dma_protection",
            format!(r"{}\Kernel DMA Protection", WINDOWS_POLICIES),
        )
        .benchmark("18.9.24.1")
        .rule("DeviceEnumerationPolicy", Constraint::exact(0)),
        group(
            "biometrics",
            r"SOFTWARE\Policies\Microsoft\Biometrics\FacialFeatures",
        )
        .benchmark("18.10.9.1.1")
        .rule("EnhancedAntiSpoofing", Constraint::exact(1)),
        group("device_metadata", format!(r"{}\Device Metadata", WINDOWS_POLICIES))
            .benchmark("18.9.7.2")
            .rule("PreventDeviceMetadataFromNetwork", Constraint::exact(1)),
        group(
            "credentials_delegation",
            format!(r"{}\CredentialsDelegation", WINDOWS_POLICIES),
        )
        .benchmark("18.9.4.2")
        .rule("AllowProtectedCreds", Constraint::exact(1)),
        group("device_guard", format!(r"{}\DeviceGuard", WINDOWS_POLICIES))
            .benchmark("18.9.5.1")
            .benchmark("18.9.5.7")
            .rule("EnableVirtualizationBasedSecurity", Constraint::exact(1))
            .rule("RequirePlatformSecurityFeatures", Constraint::one_of(&[1, 3]))
            .rule("HypervisorEnforcedCodeIntegrity", Constraint::exact(1))
            .rule("HVCIMATRequired", Constraint::exact(1))
            .rule("LsaCfgFlags", Constraint::exact(1))
            .rule("ConfigureSystemGuardLaunch", Constraint::exact(1)),
        group(
            "microsoft_account",
            r"SOFTWARE\Policies\Microsoft\MicrosoftAccount",
        )
        .benchmark("18.10.42.1")
        .rule("DisableUserAuth", Constraint::exact(1)),
    ]
}
