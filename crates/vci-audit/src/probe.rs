//! Per-issuer probing: key set, CORS, TLS posture and revocation lists.

use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;
use vci_audit_client::DirectoryClient;
use vci_audit_core::{Crl, IssuerError, IssuerKey, IssuerLogInfo, TrustedIssuer};
use vci_audit_tls::{ComplianceEvaluator, TlsProbe, TlsProbeError, DEFAULT_TLS_PORT};

/// Probes one issuer at a time; every step records its own failures and
/// never stops the steps after it.
#[derive(Clone)]
pub struct IssuerProbe {
    client: DirectoryClient,
    tls: Option<Arc<dyn TlsProbe>>,
    evaluator: ComplianceEvaluator,
}

impl IssuerProbe {
    /// Create a probe. Without a TLS probe the TLS step is skipped entirely.
    #[must_use]
    pub fn new(
        client: DirectoryClient,
        tls: Option<Arc<dyn TlsProbe>>,
        evaluator: ComplianceEvaluator,
    ) -> Self {
        Self {
            client,
            tls,
            evaluator,
        }
    }

    /// Probe an issuer
    pub async fn probe(&self, issuer: TrustedIssuer) -> IssuerLogInfo {
        let mut info = IssuerLogInfo::new(issuer);

        self.check_key_set(&mut info).await;
        self.check_tls(&mut info).await;
        self.fetch_crls(&mut info).await;

        if info.has_errors() {
            debug!(iss = %info.issuer.iss, errors = info.errors.len(), "issuer has errors");
        }
        info
    }

    async fn check_key_set(&self, info: &mut IssuerLogInfo) {
        let response = match self.client.fetch_key_set(&info.issuer.iss).await {
            Ok(response) => response,
            Err(e) => {
                warn!(iss = %info.issuer.iss, error = %e, "key set unavailable");
                info.errors.push(e);
                return;
            }
        };

        if let Some(cors) = response.check_cors(self.client.origin()) {
            info.errors.push(cors);
        }

        match response.key_set() {
            Ok((key_set, rejected)) => {
                info.keys = key_set.keys;
                info.errors.extend(rejected);
            }
            Err(e) => info.errors.push(e),
        }
    }

    async fn check_tls(&self, info: &mut IssuerLogInfo) {
        let Some(tls) = &self.tls else {
            return;
        };

        let url = match Url::parse(&info.issuer.iss) {
            Ok(url) => url,
            Err(e) => {
                info.errors.push(IssuerError::Parse {
                    url: info.issuer.iss.clone(),
                    reason: e.to_string(),
                });
                return;
            }
        };
        let host = url.host_str().unwrap_or(&info.issuer.iss).to_string();

        match tls.observe(&url).await {
            Ok(details) => {
                info.errors
                    .extend(self.evaluator.evaluate(&details).into_iter().map(IssuerError::from));
                info.tls_details = Some(details);
            }
            Err(TlsProbeError::Timeout(after)) => info.errors.push(IssuerError::Timeout {
                target: format!("{host}:{DEFAULT_TLS_PORT}"),
                after,
            }),
            Err(e) => {
                debug!(host = %host, error = %e, "TLS probe unavailable");
                info.errors.push(IssuerError::TlsProbeUnavailable {
                    host,
                    reason: e.to_string(),
                });
            }
        }
    }

    async fn fetch_crls(&self, info: &mut IssuerLogInfo) {
        let iss = info.issuer.iss.as_str();
        let fetches = info
            .keys
            .iter()
            .filter(|key| key.has_crl())
            .map(|key: &IssuerKey| self.client.fetch_crl(iss, &key.kid));

        let results: Vec<Result<Crl, IssuerError>> = join_all(fetches).await;
        for result in results {
            match result {
                Ok(crl) => info.crls.push(crl),
                Err(e) => info.errors.push(e),
            }
        }
    }
}
