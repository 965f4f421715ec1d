//! Output: default file names, progress display and the run summary.

use chrono::{DateTime, Utc};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use vci_audit::{AuditLog, SnapshotProgress};

/// The two files an audit run writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Snapshot of every issuer
    Directory,
    /// Report derived from a snapshot
    Audit,
}

impl LogKind {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Directory => "directory_log",
            Self::Audit => "audit_log",
        }
    }
}

/// `<dir>/<kind>_YYYY-MM-DD-HHMMSS.json` for a run started at `time`
pub fn default_log_path(dir: &Path, kind: LogKind, time: DateTime<Utc>) -> PathBuf {
    dir.join(format!(
        "{}_{}.json",
        kind.prefix(),
        time.format("%Y-%m-%d-%H%M%S")
    ))
}

/// Per-issuer progress bar for a snapshot.
///
/// The length is unknown until the directory is fetched, so it is set from
/// the first progress update.
pub struct IssuerProgress {
    bar: ProgressBar,
}

impl IssuerProgress {
    /// Create a progress bar; hidden when `enabled` is false
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .expect("Invalid template")
                .progress_chars("=>-"),
        );
        Self { bar }
    }

    /// Record one finished issuer
    pub fn update(&self, progress: &SnapshotProgress<'_>) {
        self.bar.set_length(progress.total as u64);
        self.bar.set_position(progress.completed as u64);
        self.bar.set_message(progress.info.issuer.name.clone());
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Print the human-readable summary of a report
pub fn print_summary(report: &AuditLog, directory_log: Option<&Path>, audit_log: &Path) {
    println!("{} {}", "Directory:".bold(), report.directory.cyan());
    println!(
        "  {} {}",
        "Audited:".bold(),
        report.audit_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  {} {}", "Issuers:".bold(), report.issuer_count);

    let failing = report.issuers_with_errors.len();
    let failing_label = failing.to_string();
    println!(
        "  {} {}",
        "With errors:".bold(),
        if failing == 0 {
            failing_label.green()
        } else {
            failing_label.red()
        }
    );
    println!("  {} {}", "With CRLs:".bold(), report.issuer_with_crl_count);

    print_list("Duplicated kids:", &report.duplicated_kids);
    print_list("Duplicated issuers:", &report.duplicated_iss);
    print_list("Duplicated names:", &report.duplicated_names);

    if let Some(previous) = report.previous_audit_time {
        println!();
        println!(
            "{} {}",
            "Compared with:".bold(),
            previous.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!(
            "  {} {}",
            "New issuers:".bold(),
            report.new_issuer_count.unwrap_or_default()
        );
        println!(
            "  {} {}",
            "Deleted issuers:".bold(),
            report.deleted_issuer_count.unwrap_or_default()
        );
        for removed in report.removed_kids.iter().flatten() {
            println!(
                "  {} {} {}",
                "Removed kids:".yellow(),
                removed.iss,
                removed.kids.join(", ")
            );
        }
    }

    for info in &report.issuers_with_errors {
        println!();
        println!("{} {}", info.issuer.name.bold(), info.issuer.iss.dimmed());
        for error in &info.errors {
            println!("  {} {}", "x".red(), error);
        }
    }

    println!();
    if let Some(path) = directory_log {
        println!("{} {}", "Directory log:".dimmed(), path.display());
    }
    println!("{} {}", "Audit log:".dimmed(), audit_log.display());
}

fn print_list(label: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    println!("  {} {}", label.yellow().bold(), values.join(", "));
}
