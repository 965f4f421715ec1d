//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

/// Audit a directory of verifiable credential issuers
///
/// Fetches the directory, probes each issuer's key set, CORS header, TLS
/// endpoint and revocation lists, and writes a directory log plus an audit
/// report. Pass --previous to compare against an earlier directory log.
#[derive(Parser, Debug)]
#[command(name = "vci-auditor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory URL to audit (defaults to the VCI issuers directory)
    #[arg(short, long, env = "VCI_DIRECTORY")]
    pub directory: Option<String>,

    /// Audit an existing directory log instead of fetching the directory
    #[arg(short, long, value_name = "FILE")]
    pub inlog: Option<PathBuf>,

    /// Where to write the directory log
    #[arg(short, long, value_name = "FILE")]
    pub outlog: Option<PathBuf>,

    /// Previous directory log to compare against
    #[arg(short, long, value_name = "FILE")]
    pub previous: Option<PathBuf>,

    /// Where to write the audit report
    #[arg(short, long, value_name = "FILE")]
    pub auditlog: Option<PathBuf>,

    /// Test mode: treat `audit-<n>` fixture folders as the same issuer
    #[arg(short, long)]
    pub test: bool,

    /// Increase verbosity
    #[arg(short, long)]
    pub verbose: bool,

    /// Issuers probed at the same time
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Time budget for each TLS handshake
    #[arg(long, value_name = "SECONDS", default_value = "2")]
    pub tls_timeout: u64,

    /// Report TLS parameters that could not be observed
    #[arg(long)]
    pub strict_tls: bool,

    /// Skip the TLS probe
    #[arg(long)]
    pub no_tls: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "vci-auditor",
            "-d",
            "https://directory.example/issuers.json",
            "-o",
            "out.json",
            "-p",
            "prev.json",
            "-a",
            "audit.json",
            "-t",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.directory.as_deref(), Some("https://directory.example/issuers.json"));
        assert_eq!(cli.outlog, Some(PathBuf::from("out.json")));
        assert_eq!(cli.previous, Some(PathBuf::from("prev.json")));
        assert_eq!(cli.auditlog, Some(PathBuf::from("audit.json")));
        assert!(cli.test);
        assert!(cli.verbose);
        assert!(cli.inlog.is_none());
        assert_eq!(cli.tls_timeout, 2);
    }

    #[test]
    fn test_long_flags() {
        let cli = Cli::try_parse_from([
            "vci-auditor",
            "--inlog",
            "logs/directory_log.json",
            "--concurrency",
            "16",
            "--tls-timeout",
            "5",
            "--strict-tls",
            "--no-tls",
        ])
        .unwrap();
        assert_eq!(cli.inlog, Some(PathBuf::from("logs/directory_log.json")));
        assert_eq!(cli.concurrency, Some(16));
        assert_eq!(cli.tls_timeout, 5);
        assert!(cli.strict_tls);
        assert!(cli.no_tls);
    }
}
