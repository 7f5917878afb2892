//! # CIS Audit CLI
//!
//! Exit status: 0 when the system is compliant, 1 when it is not, 2 on any error.

mod output;

use cis_audit_base::catalog::{Catalog, GroupKind};
use cis_audit_base::execution::{baseline_store, AuditTarget, CancellationToken};
use cis_audit_base::os_version::OsVersion;
use cis_audit_base::store::RootKey;
use cis_audit_base::{AuditConfig, Auditor, OutputFormat};
use clap::{ArgAction, Args, Parser, Subcommand};
use log::{debug, error, info};
use std::path::PathBuf;
use std::time::Duration;

const EXIT_COMPLIANT: i32 = 0;
const EXIT_NON_COMPLIANT: i32 = 1;
const EXIT_ERROR: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "cis-audit",
    version,
    about = "Audit Windows registry settings against the CIS baseline"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate the baseline against the registry or a snapshot
    Audit(AuditArgs),
    /// Write a snapshot that satisfies every rule
    Baseline(BaselineArgs),
    /// List the rule catalog
    Rules(RulesArgs),
}

#[derive(Debug, Args)]
struct AuditArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read from a JSON snapshot instead of the live registry
    #[arg(short, long)]
    fixture: Option<PathBuf>,

    /// Skip detection and audit as this release (10, 11, ...)
    #[arg(long)]
    os_version: Option<String>,

    /// User root, `HKCU` or `HKU\<sid>`
    #[arg(long)]
    user_root: Option<String>,

    /// Timeout for each registry query, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Emit the JSON report
    #[arg(long)]
    json: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Include passing rules in the report
    #[arg(long)]
    include_passing: bool,
}

#[derive(Debug, Args)]
struct BaselineArgs {
    /// Snapshot file to write
    #[arg(short, long)]
    output: PathBuf,

    #[arg(long, default_value = "11")]
    os_version: String,

    #[arg(long, default_value = "HKCU")]
    user_root: String,
}

#[derive(Debug, Args)]
struct RulesArgs {
    /// Only groups of this kind (machine_policy, user_policy, ...)
    #[arg(short, long)]
    kind: Option<String>,

    /// Only groups evaluated on this release
    #[arg(long)]
    os_version: Option<String>,

    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };
    std::process::exit(code);
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // RUST_LOG still wins when set
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env).try_init();
}

fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    match cli.command {
        Command::Audit(args) => run_audit(&args),
        Command::Baseline(args) => run_baseline(&args),
        Command::Rules(args) => run_rules(&args),
    }
}

// ============================================================================
// audit
// ============================================================================

/// Environment defaults, then the config file, then flags
fn build_config(args: &AuditArgs) -> Result<AuditConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            AuditConfig::load(path)?
        }
        None => AuditConfig::default(),
    };

    if let Some(fixture) = &args.fixture {
        config = config.with_fixture(fixture);
    }
    if let Some(version) = &args.os_version {
        config = config.with_os_version(version);
    }
    if let Some(root) = &args.user_root {
        config = config.with_user_root(root);
    }
    if let Some(timeout) = args.timeout_ms {
        config = config.with_command_timeout(Duration::from_millis(timeout));
    }
    if args.json {
        config = config.with_output(OutputFormat::Json);
    }
    if args.include_passing {
        config = config.with_passing(true);
    }

    Ok(config)
}

fn run_audit(args: &AuditArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = build_config(args)?;
    let auditor = Auditor::new(config)?;

    let report = match auditor.audit(&CancellationToken::new()) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e.user_message());
            return Ok(EXIT_ERROR);
        }
    };

    let rendered = match auditor.config().output {
        OutputFormat::Json => report.scan.to_json()?,
        OutputFormat::Text => output::render_report(&report, auditor.config().include_passing),
    };

    match &args.report {
        Some(path) => {
            std::fs::write(path, format!("{}\n", rendered))?;
            info!("Report written to {}", path.display());
            println!("{}", report.run.report.message);
        }
        None => println!("{}", rendered),
    }

    Ok(if report.is_compliant() {
        EXIT_COMPLIANT
    } else {
        EXIT_NON_COMPLIANT
    })
}

// ============================================================================
// baseline
// ============================================================================

fn run_baseline(args: &BaselineArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let os_version: OsVersion = args.os_version.parse()?;
    let user_root: RootKey = args.user_root.parse()?;
    let catalog = Catalog::cis_baseline()?;

    let target = AuditTarget::new(os_version).with_user_root(user_root);
    let store = baseline_store(&catalog, &target);
    store.save_json(&args.output)?;

    println!(
        "Wrote {} baseline ({} rules) to {}",
        os_version,
        catalog.rule_count(),
        args.output.display()
    );
    Ok(EXIT_COMPLIANT)
}

// ============================================================================
// rules
// ============================================================================

fn run_rules(args: &RulesArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let catalog = Catalog::cis_baseline()?;
    let kind = args
        .kind
        .as_deref()
        .map(str::parse::<GroupKind>)
        .transpose()?;
    let os_version = args
        .os_version
        .as_deref()
        .map(str::parse::<OsVersion>)
        .transpose()?;

    if args.json {
        let groups: Vec<_> = catalog
            .groups()
            .iter()
            .filter(|g| kind.map_or(true, |k| g.kind() == k))
            .filter(|g| os_version.map_or(true, |os| g.kind().applies_to(os)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        println!("{}", output::render_catalog(&catalog, kind, os_version));
    }

    Ok(EXIT_COMPLIANT)
}
