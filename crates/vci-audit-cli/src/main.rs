//! vci-auditor - issuer directory auditor
//!
//! Snapshots a directory of verifiable credential issuers and reports on it.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    vci_audit_cli::run().await
}
