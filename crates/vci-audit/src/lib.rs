//! # vci-audit
//!
//! Audit engine for a directory of verifiable credential issuers.
//!
//! Every issuer listed in the directory is visited and the outcome is
//! recorded as evidence: what keys it publishes, whether its key endpoint
//! allows cross-origin reads, how its TLS endpoint is configured, and which
//! revocation lists it serves. Nothing an issuer does can stop the audit;
//! failures land in that issuer's `errors` list.
//!
//! ## Data Flow
//!
//! ```text
//! Phase 1: Directory
//!   DirectoryClient::fetch_directory() -> IssuerDirectory
//!
//! Phase 2: Issuers (bounded concurrency, directory order kept)
//!   IssuerProbe::probe() for each issuer
//!     key set + CORS -> TLS handshake + compliance -> CRLs
//!   -> DirectoryLog
//!
//! Phase 3: Report (pure, no network)
//!   AuditLogBuilder with optional previous DirectoryLog
//!   -> duplicates, error and CRL counts, issuer churn, removed kids
//!   -> AuditLog
//! ```

pub mod config;
pub mod diff;
pub mod files;
pub mod probe;
pub mod report;
pub mod snapshot;

pub use config::{AuditConfig, DEFAULT_CONCURRENCY, DEFAULT_DIRECTORY_URL};
pub use diff::{find_duplicates, Comparison, DiffEngine, Duplicates, UrlNormalization};
pub use probe::IssuerProbe;
pub use report::AuditLogBuilder;
pub use snapshot::{DirectorySnapshotter, SnapshotProgress};

pub use vci_audit_client::{DirectoryClient, DEFAULT_ORIGIN, DEFAULT_TIMEOUT};
pub use vci_audit_core::*;
pub use vci_audit_tls::{
    AbsentFieldPolicy, ComplianceEvaluator, OpensslProbe, TlsPolicy, TlsProbe, TlsProbeError,
    DEFAULT_TLS_TIMEOUT,
};

use std::sync::Arc;

/// Snapshot a directory and report on it.
///
/// Runs all three phases. `previous`, when given, adds the comparison
/// fields to the report.
///
/// # Errors
///
/// Returns `AuditError` if the directory document cannot be fetched or
/// parsed. Per-issuer failures are recorded in the snapshot instead.
pub async fn audit_directory(
    config: AuditConfig,
    tls: Option<Arc<dyn TlsProbe>>,
    previous: Option<&DirectoryLog>,
) -> Result<(DirectoryLog, AuditLog)> {
    let test_mode = config.test_mode;
    let snapshot = DirectorySnapshotter::new(config, tls).snapshot().await?;
    let report = AuditLogBuilder::new(&snapshot)
        .previous(previous)
        .test_mode(test_mode)
        .build();
    Ok((snapshot, report))
}
