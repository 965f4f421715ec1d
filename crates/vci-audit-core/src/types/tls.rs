use serde::{Deserialize, Serialize};

/// Handshake parameters observed on an issuer's default TLS endpoint.
///
/// Every field is optional: `None` means the diagnostic output did not
/// mention it, not that the endpoint is non-compliant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsDetails {
    /// Negotiated protocol version (e.g. `TLSv1.3`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Negotiated cipher suite, OpenSSL or IANA naming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cipher: Option<String>,

    /// Ephemeral key exchange (e.g. `X25519, 253 bits`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kex_alg: Option<String>,

    /// Peer signature type (e.g. `RSA-PSS`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_alg: Option<String>,

    /// Server public key size in bits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_key_size: Option<String>,

    /// Compression method (`NONE` when disabled)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
}

impl TlsDetails {
    /// Returns true if nothing at all was observed
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.version.is_none()
            && self.cipher.is_none()
            && self.kex_alg.is_none()
            && self.auth_alg.is_none()
            && self.pub_key_size.is_none()
            && self.compression.is_none()
    }
}

/// Transport security rule that a TLS observation can break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyRule {
    /// SSL, TLS 1.0 or TLS 1.1 negotiated
    DeprecatedProtocol,
    /// Protocol string not recognized
    UnrecognizedProtocol,
    /// RC4, DES, export-grade, NULL or anonymous suite
    WeakCipher,
    /// CBC suite where AEAD suites are available
    NonAeadCipher,
    /// Suite without ephemeral key exchange
    NoForwardSecrecy,
    /// Server temp key is not an ephemeral DH group
    StaticKeyExchange,
    /// RSA/DH public key below the minimum size
    WeakPublicKey,
    /// TLS compression enabled
    Compression,
    /// Required field missing under the strict absent-field policy
    NotObserved,
}

impl PolicyRule {
    /// Stable identifier for reports
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::DeprecatedProtocol => "tls.protocol.deprecated",
            Self::UnrecognizedProtocol => "tls.protocol.unrecognized",
            Self::WeakCipher => "tls.cipher.weak",
            Self::NonAeadCipher => "tls.cipher.non_aead",
            Self::NoForwardSecrecy => "tls.cipher.no_forward_secrecy",
            Self::StaticKeyExchange => "tls.kex.static",
            Self::WeakPublicKey => "tls.key.size",
            Self::Compression => "tls.compression",
            Self::NotObserved => "tls.not_observed",
        }
    }
}

/// One transport security policy violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule that was broken
    pub rule: PolicyRule,

    /// Human-readable description
    pub message: String,
}

impl Violation {
    /// Create a new violation
    #[must_use]
    pub fn new(rule: PolicyRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_are_omitted() {
        let details = TlsDetails {
            version: Some("TLSv1.3".into()),
            pub_key_size: Some("2048".into()),
            ..TlsDetails::default()
        };
        let json = serde_json::to_string(&details).unwrap();
        assert_eq!(json, r#"{"version":"TLSv1.3","pubKeySize":"2048"}"#);
    }

    #[test]
    fn test_is_empty() {
        assert!(TlsDetails::default().is_empty());
        let details = TlsDetails {
            compression: Some("NONE".into()),
            ..TlsDetails::default()
        };
        assert!(!details.is_empty());
    }
}
