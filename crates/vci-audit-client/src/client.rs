//! Directory, key set and revocation list fetching.

use reqwest::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use vci_audit_core::{AuditError, Crl, IssuerDirectory, IssuerError, KeySet, RawKeySet, Result};

use crate::well_known::{crl_url, jwks_url};

/// Default timeout for every request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Origin sent to key endpoints to exercise their CORS policy
pub const DEFAULT_ORIGIN: &str = "https://example.org";

/// Client for a directory and the issuers it lists
#[derive(Clone)]
pub struct DirectoryClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    timeout: Duration,
    origin: String,
}

/// Raw key endpoint response, kept so CORS and body problems are both reported
#[derive(Debug, Clone)]
pub struct KeySetResponse {
    /// URL that was fetched
    pub url: String,
    /// `access-control-allow-origin` header, if present
    pub allow_origin: Option<String>,
    /// Response body
    pub body: String,
}

impl KeySetResponse {
    /// Check the CORS header against the origin that was requested.
    ///
    /// `*` or an exact match of the origin pass.
    #[must_use]
    pub fn check_cors(&self, origin: &str) -> Option<IssuerError> {
        match self.allow_origin.as_deref() {
            None => Some(IssuerError::CorsMissing),
            Some("*") => None,
            Some(found) if found == origin => None,
            Some(found) => Some(IssuerError::CorsMismatch {
                found: found.to_string(),
            }),
        }
    }

    /// Parse the body as a key set.
    ///
    /// A body that is not a key set at all is an error. Individual keys that
    /// do not parse are returned as errors next to the keys that do.
    pub fn key_set(&self) -> std::result::Result<(KeySet, Vec<IssuerError>), IssuerError> {
        let raw: RawKeySet = serde_json::from_str(&self.body).map_err(|e| IssuerError::Parse {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        let (key_set, rejected) = raw.parse_keys();
        let errors = rejected
            .into_iter()
            .map(|(index, reason)| IssuerError::Parse {
                url: self.url.clone(),
                reason: format!("key {index}: {reason}"),
            })
            .collect();
        Ok((key_set, errors))
    }
}

impl Default for DirectoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryClient {
    /// Create a client with default settings
    #[must_use]
    pub fn new() -> Self {
        DirectoryClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> DirectoryClientBuilder {
        DirectoryClientBuilder::new()
    }

    /// Origin sent with key set requests
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.inner.origin
    }

    /// Fetch and parse the directory document.
    ///
    /// Any failure here aborts the audit, so it is returned as an [`AuditError`].
    pub async fn fetch_directory(&self, url: &str) -> Result<IssuerDirectory> {
        debug!(url = %url, "fetching directory");

        let body = self
            .get_text(url, false)
            .await
            .map_err(|e| AuditError::DirectoryFetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?
            .1;

        serde_json::from_str(&body).map_err(|e| AuditError::DirectoryParse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Fetch an issuer's key set, sending the probe origin
    pub async fn fetch_key_set(&self, iss: &str) -> std::result::Result<KeySetResponse, IssuerError> {
        let url = jwks_url(iss);
        debug!(url = %url, "fetching key set");

        let (allow_origin, body) = self.get_text(&url, true).await?;
        Ok(KeySetResponse {
            url,
            allow_origin,
            body,
        })
    }

    /// Fetch the revocation list of one key
    pub async fn fetch_crl(&self, iss: &str, kid: &str) -> std::result::Result<Crl, IssuerError> {
        let url = crl_url(iss, kid);
        debug!(url = %url, "fetching CRL");

        let (_, body) = self.get_text(&url, false).await?;
        serde_json::from_str(&body).map_err(|e| IssuerError::Parse {
            url,
            reason: e.to_string(),
        })
    }

    /// Perform a GET request, returning the CORS header and body
    async fn get_text(
        &self,
        url: &str,
        with_origin: bool,
    ) -> std::result::Result<(Option<String>, String), IssuerError> {
        let mut request = self.inner.http.get(url);
        if with_origin {
            request = request.header(ORIGIN, &self.inner.origin);
        }

        let response = request.send().await.map_err(|e| self.request_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "request failed");
            return Err(IssuerError::Network {
                url: url.to_string(),
                reason: format!("HTTP status {status}"),
            });
        }

        let allow_origin = response
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

        let body = response
            .text()
            .await
            .map_err(|e| self.request_error(url, &e))?;

        Ok((allow_origin, body))
    }

    /// Convert a transport error to a recorded issuer error
    fn request_error(&self, url: &str, err: &reqwest::Error) -> IssuerError {
        if err.is_timeout() {
            IssuerError::Timeout {
                target: url.to_string(),
                after: self.inner.timeout,
            }
        } else {
            IssuerError::Network {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

/// Builder for configuring a [`DirectoryClient`]
pub struct DirectoryClientBuilder {
    timeout: Duration,
    origin: String,
    user_agent: String,
}

impl Default for DirectoryClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryClientBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            origin: DEFAULT_ORIGIN.to_string(),
            user_agent: format!("vci-audit/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the origin sent to key endpoints
    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client
    #[must_use]
    pub fn build(self) -> DirectoryClient {
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .expect("Failed to build HTTP client");

        DirectoryClient {
            inner: Arc::new(ClientInner {
                http,
                timeout: self.timeout,
                origin: self.origin,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const JWKS: &str = r#"{"keys":[{"kty":"EC","kid":"k1","crlVersion":1},{"kid":"k2"}]}"#;

    #[tokio::test]
    async fn test_fetch_directory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/issuers.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"participating_issuers":[{"iss":"https://a.example","name":"A"}]}"#,
            ))
            .mount(&server)
            .await;

        let client = DirectoryClient::new();
        let dir = client
            .fetch_directory(&format!("{}/issuers.json", server.uri()))
            .await
            .unwrap();
        assert_eq!(dir.participating_issuers.len(), 1);
        assert_eq!(dir.participating_issuers[0].iss, "https://a.example");
    }

    #[tokio::test]
    async fn test_fetch_directory_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = DirectoryClient::new()
            .fetch_directory(&server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::DirectoryParse { .. }));
    }

    #[tokio::test]
    async fn test_fetch_directory_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = DirectoryClient::new()
            .fetch_directory(&server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::DirectoryFetch { .. }));
    }

    #[tokio::test]
    async fn test_fetch_key_set_sends_origin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .and(header("origin", DEFAULT_ORIGIN))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("access-control-allow-origin", "*")
                    .set_body_string(JWKS),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = DirectoryClient::new();
        let response = client.fetch_key_set(&server.uri()).await.unwrap();
        assert_eq!(response.allow_origin.as_deref(), Some("*"));
        assert!(response.check_cors(client.origin()).is_none());

        let (key_set, rejected) = response.key_set().unwrap();
        assert!(rejected.is_empty());
        let keys = key_set.keys;
        assert_eq!(keys.len(), 2);
        assert!(keys[0].has_crl());
        assert!(!keys[1].has_crl());
    }

    #[test]
    fn test_cors_check() {
        let mut response = KeySetResponse {
            url: "https://a.example/.well-known/jwks.json".into(),
            allow_origin: None,
            body: String::new(),
        };
        assert_eq!(
            response.check_cors(DEFAULT_ORIGIN),
            Some(IssuerError::CorsMissing)
        );

        response.allow_origin = Some(DEFAULT_ORIGIN.into());
        assert_eq!(response.check_cors(DEFAULT_ORIGIN), None);

        response.allow_origin = Some("https://other.example".into());
        assert_eq!(
            response.check_cors(DEFAULT_ORIGIN),
            Some(IssuerError::CorsMismatch {
                found: "https://other.example".into()
            })
        );
    }

    #[tokio::test]
    async fn test_key_set_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"nokeys\":true}"))
            .mount(&server)
            .await;

        let response = DirectoryClient::new()
            .fetch_key_set(&server.uri())
            .await
            .unwrap();
        let err = response.key_set().unwrap_err();
        assert_eq!(err.kind(), vci_audit_core::ErrorKind::ParseFailure);
    }

    #[test]
    fn test_malformed_key_is_reported_alone() {
        let response = KeySetResponse {
            url: "https://a.example/.well-known/jwks.json".into(),
            allow_origin: Some("*".into()),
            body: r#"{"keys":[{"kid":"k1"},{"kty":"EC","crv":"P-256"},{"kid":"k3","crlVersion":1.0}]}"#
                .into(),
        };

        let (key_set, rejected) = response.key_set().unwrap();
        assert_eq!(key_set.keys.len(), 2);
        assert!(key_set.keys[1].has_crl());
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].kind(), vci_audit_core::ErrorKind::ParseFailure);
        assert!(rejected[0].to_string().contains("key 1"));
    }

    #[tokio::test]
    async fn test_fetch_crl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/crl/k1.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"kid":"k1","method":"rid","ctr":1,"rids":[]}"#),
            )
            .mount(&server)
            .await;

        let crl = DirectoryClient::new()
            .fetch_crl(&server.uri(), "k1")
            .await
            .unwrap();
        assert_eq!(crl.0["kid"], "k1");
    }

    #[tokio::test]
    async fn test_timeout_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = DirectoryClient::builder()
            .timeout(Duration::from_millis(200))
            .build();
        let err = client.fetch_crl(&server.uri(), "k1").await.unwrap_err();
        assert_eq!(err.kind(), vci_audit_core::ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_http_error_is_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = DirectoryClient::new()
            .fetch_key_set(&server.uri())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), vci_audit_core::ErrorKind::NetworkFailure);
        assert!(err.to_string().contains("500"));
    }
}
