use async_trait::async_trait;
use url::Url;

use crate::error::TlsResult;
use crate::parser::parse_tls_details;
use vci_audit_core::TlsDetails;

/// Source of TLS handshake transcripts for issuer endpoints
#[async_trait]
pub trait TlsProbe: Send + Sync {
    /// Run a handshake against the issuer's default TLS endpoint and return
    /// the diagnostic transcript
    async fn handshake(&self, issuer: &Url) -> TlsResult<String>;

    /// Run a handshake and parse what it reported
    async fn observe(&self, issuer: &Url) -> TlsResult<TlsDetails> {
        let transcript = self.handshake(issuer).await?;
        Ok(parse_tls_details(&transcript))
    }
}
