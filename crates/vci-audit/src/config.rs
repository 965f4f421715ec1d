//! Audit run configuration.

use chrono::{DateTime, SubsecRound, Utc};
use std::time::Duration;
use vci_audit_client::{DEFAULT_ORIGIN, DEFAULT_TIMEOUT};
use vci_audit_tls::TlsPolicy;

/// The VCI issuers directory
pub const DEFAULT_DIRECTORY_URL: &str =
    "https://raw.githubusercontent.com/the-commons-project/vci-directory/main/vci-issuers.json";

/// Issuers probed at the same time
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Everything an audit run needs to know up front.
///
/// The run time is fixed here rather than read from the clock while probing,
/// so a snapshot and the files named after it agree on one timestamp.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Directory document URL
    pub directory: String,

    /// Timestamp of the run (UTC, whole seconds)
    pub run_time: DateTime<Utc>,

    /// Timeout for directory, key set and CRL requests
    pub http_timeout: Duration,

    /// Origin sent to key endpoints to test CORS
    pub origin: String,

    /// Maximum issuers probed concurrently (1 = one at a time)
    pub concurrency: usize,

    /// Compare `audit-<n>` fixture URLs as the same issuer
    pub test_mode: bool,

    /// TLS compliance thresholds
    pub tls_policy: TlsPolicy,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DIRECTORY_URL)
    }
}

impl AuditConfig {
    /// Create a configuration for a directory, stamped with the current time
    #[must_use]
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            run_time: Utc::now().trunc_subsecs(0),
            http_timeout: DEFAULT_TIMEOUT,
            origin: DEFAULT_ORIGIN.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            test_mode: false,
            tls_policy: TlsPolicy::default(),
        }
    }

    /// Set the run time (sub-second precision is dropped)
    #[must_use]
    pub fn run_time(mut self, time: DateTime<Utc>) -> Self {
        self.run_time = time.trunc_subsecs(0);
        self
    }

    /// Set the HTTP timeout
    #[must_use]
    pub const fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Set the CORS probe origin
    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set the concurrency limit; 0 is treated as 1
    #[must_use]
    pub const fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = if limit == 0 { 1 } else { limit };
        self
    }

    /// Enable or disable test mode
    #[must_use]
    pub const fn test_mode(mut self, enabled: bool) -> Self {
        self.test_mode = enabled;
        self
    }

    /// Set the TLS policy
    #[must_use]
    pub const fn tls_policy(mut self, policy: TlsPolicy) -> Self {
        self.tls_policy = policy;
        self
    }
}
