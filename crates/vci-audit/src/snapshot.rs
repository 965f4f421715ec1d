//! Directory snapshots: probe every listed issuer and record what was seen.

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::info;
use vci_audit_client::DirectoryClient;
use vci_audit_core::{DirectoryLog, IssuerLogInfo, Result};
use vci_audit_tls::{ComplianceEvaluator, TlsProbe};

use crate::config::AuditConfig;
use crate::probe::IssuerProbe;

/// Progress of a running snapshot
#[derive(Debug, Clone, Copy)]
pub struct SnapshotProgress<'a> {
    /// Issuers finished so far
    pub completed: usize,
    /// Issuers listed in the directory
    pub total: usize,
    /// The issuer that just finished
    pub info: &'a IssuerLogInfo,
}

/// Takes a [`DirectoryLog`] of a directory
pub struct DirectorySnapshotter {
    config: AuditConfig,
    client: DirectoryClient,
    probe: IssuerProbe,
}

impl DirectorySnapshotter {
    /// Create a snapshotter. Pass `None` for `tls` to skip TLS probing.
    #[must_use]
    pub fn new(config: AuditConfig, tls: Option<Arc<dyn TlsProbe>>) -> Self {
        let client = DirectoryClient::builder()
            .timeout(config.http_timeout)
            .origin(config.origin.clone())
            .build();
        let evaluator = ComplianceEvaluator::new(config.tls_policy);
        let probe = IssuerProbe::new(client.clone(), tls, evaluator);

        Self {
            config,
            client,
            probe,
        }
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Take a snapshot
    pub async fn snapshot(&self) -> Result<DirectoryLog> {
        self.snapshot_with_progress(|_| {}).await
    }

    /// Take a snapshot, calling `on_issuer` as each issuer finishes.
    ///
    /// Fails only if the directory itself cannot be fetched or parsed.
    /// Issuers are probed up to `concurrency` at a time and reported in
    /// completion order; the log keeps directory order.
    pub async fn snapshot_with_progress<F>(&self, mut on_issuer: F) -> Result<DirectoryLog>
    where
        F: FnMut(SnapshotProgress<'_>),
    {
        let directory = self.client.fetch_directory(&self.config.directory).await?;
        let total = directory.participating_issuers.len();
        info!(directory = %self.config.directory, issuers = total, "directory fetched");

        let mut probes = stream::iter(directory.participating_issuers.into_iter().enumerate())
            .map(|(index, issuer)| async move { (index, self.probe.probe(issuer).await) })
            .buffer_unordered(self.config.concurrency.max(1));

        let mut slots: Vec<Option<IssuerLogInfo>> = vec![None; total];
        let mut completed = 0;
        while let Some((index, info)) = probes.next().await {
            completed += 1;
            on_issuer(SnapshotProgress {
                completed,
                total,
                info: &info,
            });
            slots[index] = Some(info);
        }

        let issuer_info = slots.into_iter().flatten().collect();

        Ok(DirectoryLog {
            directory: self.config.directory.clone(),
            time: self.config.run_time,
            issuer_info,
        })
    }
}
