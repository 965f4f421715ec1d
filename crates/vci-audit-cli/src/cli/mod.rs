//! CLI argument parsing and the audit run.

pub mod args;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vci_audit::files::{read_directory_log, read_previous, write_json};
use vci_audit::{
    AbsentFieldPolicy, AuditConfig, AuditLogBuilder, DirectoryLog, DirectorySnapshotter,
    OpensslProbe, TlsPolicy, TlsProbe, DEFAULT_CONCURRENCY, DEFAULT_DIRECTORY_URL,
};

use crate::config::Config;
use crate::output::{default_log_path, print_summary, IssuerProgress, LogKind};

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load()?;
    let plan = RunPlan::resolve(&cli, &config);

    let (snapshot, directory_log) = match &cli.inlog {
        Some(path) => {
            let snapshot = read_directory_log(path)
                .with_context(|| format!("Could not load directory log {}", path.display()))?;
            info!(path = %path.display(), issuers = snapshot.issuer_info.len(), "auditing existing directory log");
            (snapshot, None)
        }
        None => {
            let snapshot = take_snapshot(&plan, !cli.verbose).await?;
            write_json(&plan.outlog, &snapshot)
                .with_context(|| format!("Could not write {}", plan.outlog.display()))?;
            (snapshot, Some(plan.outlog.as_path()))
        }
    };

    let previous = cli.previous.as_deref().and_then(read_previous);
    if cli.previous.is_some() && previous.is_none() {
        warn!("continuing without a previous directory log");
    }

    let report = AuditLogBuilder::new(&snapshot)
        .previous(previous.as_ref())
        .test_mode(plan.audit.test_mode)
        .build();
    write_json(&plan.auditlog, &report)
        .with_context(|| format!("Could not write {}", plan.auditlog.display()))?;

    print_summary(&report, directory_log, &plan.auditlog);
    Ok(())
}

/// `WARN` by default, `DEBUG` with `--verbose`; `RUST_LOG` overrides both
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn take_snapshot(plan: &RunPlan, show_progress: bool) -> Result<DirectoryLog> {
    let tls: Option<Arc<dyn TlsProbe>> = if plan.probe_tls {
        Some(Arc::new(OpensslProbe::new().timeout(plan.tls_timeout)))
    } else {
        None
    };

    let progress = IssuerProgress::new(show_progress);
    let result = DirectorySnapshotter::new(plan.audit.clone(), tls)
        .snapshot_with_progress(|p| progress.update(&p))
        .await;
    progress.finish();

    result.with_context(|| format!("Could not audit directory {}", plan.audit.directory))
}

/// Settings for one run, merged from flags, the config file and defaults
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Engine configuration
    pub audit: AuditConfig,
    /// Directory log destination
    pub outlog: PathBuf,
    /// Audit report destination
    pub auditlog: PathBuf,
    /// Whether to run the TLS probe
    pub probe_tls: bool,
    /// TLS handshake time budget
    pub tls_timeout: Duration,
}

impl RunPlan {
    /// Flags win over the config file, which wins over built-in defaults.
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        let directory = cli
            .directory
            .clone()
            .or_else(|| config.directory.clone())
            .unwrap_or_else(|| DEFAULT_DIRECTORY_URL.to_string());

        let absent_fields = if cli.strict_tls || config.strict_tls {
            AbsentFieldPolicy::Flag
        } else {
            AbsentFieldPolicy::Skip
        };

        let mut audit = AuditConfig::new(directory)
            .concurrency(
                cli.concurrency
                    .or(config.concurrency)
                    .unwrap_or(DEFAULT_CONCURRENCY),
            )
            .test_mode(cli.test)
            .tls_policy(TlsPolicy::new().absent_fields(absent_fields));
        if let Some(origin) = &config.origin {
            audit = audit.origin(origin.clone());
        }

        let log_dir = config.log_dir();
        let outlog = cli
            .outlog
            .clone()
            .unwrap_or_else(|| default_log_path(&log_dir, LogKind::Directory, audit.run_time));
        let auditlog = cli
            .auditlog
            .clone()
            .unwrap_or_else(|| default_log_path(&log_dir, LogKind::Audit, audit.run_time));

        Self {
            audit,
            outlog,
            auditlog,
            probe_tls: !cli.no_tls,
            tls_timeout: Duration::from_secs(cli.tls_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vci-auditor").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let plan = RunPlan::resolve(&parse(&[]), &Config::default());
        assert_eq!(plan.audit.directory, DEFAULT_DIRECTORY_URL);
        assert_eq!(plan.audit.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(plan.audit.tls_policy.absent_fields, AbsentFieldPolicy::Skip);
        assert!(plan.probe_tls);
        assert_eq!(plan.tls_timeout, Duration::from_secs(2));

        let stamp = plan.audit.run_time.format("%Y-%m-%d-%H%M%S").to_string();
        assert_eq!(
            plan.outlog,
            PathBuf::from(format!("logs/directory_log_{stamp}.json"))
        );
        assert_eq!(
            plan.auditlog,
            PathBuf::from(format!("logs/audit_log_{stamp}.json"))
        );
    }

    #[test]
    fn test_config_file_values() {
        let config = Config {
            directory: Some("https://config.example/issuers.json".into()),
            log_dir: Some(PathBuf::from("/srv/audit")),
            concurrency: Some(3),
            strict_tls: true,
            origin: Some("https://verifier.example".into()),
        };
        let plan = RunPlan::resolve(&parse(&["--no-tls"]), &config);
        assert_eq!(plan.audit.directory, "https://config.example/issuers.json");
        assert_eq!(plan.audit.concurrency, 3);
        assert_eq!(plan.audit.origin, "https://verifier.example");
        assert_eq!(plan.audit.tls_policy.absent_fields, AbsentFieldPolicy::Flag);
        assert!(plan.outlog.starts_with("/srv/audit"));
        assert!(!plan.probe_tls);
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            directory: Some("https://config.example/issuers.json".into()),
            concurrency: Some(3),
            ..Config::default()
        };
        let plan = RunPlan::resolve(
            &parse(&[
                "-d",
                "https://flag.example/issuers.json",
                "--concurrency",
                "12",
                "-o",
                "snap.json",
                "-a",
                "report.json",
                "-t",
            ]),
            &config,
        );
        assert_eq!(plan.audit.directory, "https://flag.example/issuers.json");
        assert_eq!(plan.audit.concurrency, 12);
        assert!(plan.audit.test_mode);
        assert_eq!(plan.outlog, PathBuf::from("snap.json"));
        assert_eq!(plan.auditlog, PathBuf::from("report.json"));
    }
}
