//! BCP 195 transport security evaluation.
//!
//! Rules follow RFC 7525 (secure use of TLS) and RFC 8996 (deprecating
//! TLS 1.0 and 1.1). Each check looks only at the fields it needs; when a
//! field was not observed, [`AbsentFieldPolicy`] decides whether the check is
//! skipped or reported.

use std::str::FromStr;
use vci_audit_core::{PolicyRule, TlsDetails, Violation};

/// Minimum RSA / finite-field DH size accepted by RFC 7525
pub const MIN_PUBLIC_KEY_BITS: u32 = 2048;

/// Cipher name tokens that disqualify a suite outright
const WEAK_CIPHER_TOKENS: &[&str] = &[
    "RC4", "DES", "3DES", "CBC3", "EXP", "EXPORT", "EXPORT40", "NULL", "ENULL", "ANULL", "ADH",
    "AECDH", "ANON", "MD5",
];

/// Tokens marking an AEAD suite
const AEAD_TOKENS: &[&str] = &["GCM", "CCM", "CCM8", "CHACHA20", "POLY1305"];

/// Key exchange groups reported as `Server Temp Key` that are ephemeral
const EPHEMERAL_GROUPS: &[&str] = &["X25519", "X448", "ECDH", "DH"];

/// What to do when a field the policy wants to check was not observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AbsentFieldPolicy {
    /// Skip the check; absence means "not observed"
    #[default]
    Skip,
    /// Report a `NotObserved` violation for the missing field
    Flag,
}

/// Thresholds applied by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsPolicy {
    /// Minimum RSA / DH key size in bits
    pub min_public_key_bits: u32,
    /// Handling of unobserved fields
    pub absent_fields: AbsentFieldPolicy,
}

impl Default for TlsPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl TlsPolicy {
    /// BCP 195 defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_public_key_bits: MIN_PUBLIC_KEY_BITS,
            absent_fields: AbsentFieldPolicy::Skip,
        }
    }

    /// Set the minimum public key size
    #[must_use]
    pub const fn min_public_key_bits(mut self, bits: u32) -> Self {
        self.min_public_key_bits = bits;
        self
    }

    /// Set the absent-field policy
    #[must_use]
    pub const fn absent_fields(mut self, policy: AbsentFieldPolicy) -> Self {
        self.absent_fields = policy;
        self
    }
}

/// Negotiated protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProtocolVersion {
    /// SSL 2.0
    Ssl2,
    /// SSL 3.0
    Ssl3,
    /// TLS 1.0
    Tls10,
    /// TLS 1.1
    Tls11,
    /// TLS 1.2
    Tls12,
    /// TLS 1.3
    Tls13,
}

impl ProtocolVersion {
    /// Returns true if RFC 8996 / RFC 7568 forbid the version
    #[must_use]
    pub const fn is_deprecated(self) -> bool {
        matches!(self, Self::Ssl2 | Self::Ssl3 | Self::Tls10 | Self::Tls11)
    }
}

impl FromStr for ProtocolVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "SSLV2" | "SSL2" | "SSL2.0" => Ok(Self::Ssl2),
            "SSLV3" | "SSL3" | "SSL3.0" => Ok(Self::Ssl3),
            "TLSV1" | "TLSV1.0" | "TLS1.0" | "TLS1" => Ok(Self::Tls10),
            "TLSV1.1" | "TLS1.1" => Ok(Self::Tls11),
            "TLSV1.2" | "TLS1.2" => Ok(Self::Tls12),
            "TLSV1.3" | "TLS1.3" => Ok(Self::Tls13),
            _ => Err(format!("unknown protocol version: {s}")),
        }
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ssl2 => write!(f, "SSLv2"),
            Self::Ssl3 => write!(f, "SSLv3"),
            Self::Tls10 => write!(f, "TLSv1"),
            Self::Tls11 => write!(f, "TLSv1.1"),
            Self::Tls12 => write!(f, "TLSv1.2"),
            Self::Tls13 => write!(f, "TLSv1.3"),
        }
    }
}

/// Properties of a cipher suite derived from its OpenSSL or IANA name
#[derive(Debug, Clone, Copy)]
struct CipherTraits {
    weak: bool,
    aead: bool,
    forward_secret: bool,
    ecdsa: bool,
}

impl CipherTraits {
    fn of(cipher: &str) -> Self {
        let upper = cipher.to_uppercase();
        let tokens: Vec<&str> = upper.split(['-', '_']).collect();
        let has = |set: &[&str]| tokens.iter().any(|t| set.contains(t));

        // TLS 1.3 suites name only the AEAD; key exchange is always ephemeral.
        let tls13 = upper.starts_with("TLS_AES_") || upper.starts_with("TLS_CHACHA20_");

        let forward_secret = tls13
            || upper.starts_with("ECDHE-")
            || upper.starts_with("DHE-")
            || upper.starts_with("EDH-")
            || upper.starts_with("TLS_ECDHE_")
            || upper.starts_with("TLS_DHE_");

        Self {
            weak: has(WEAK_CIPHER_TOKENS),
            aead: tls13 || has(AEAD_TOKENS),
            forward_secret,
            ecdsa: tokens.contains(&"ECDSA"),
        }
    }
}

/// Applies a [`TlsPolicy`] to observed handshake parameters
#[derive(Debug, Clone, Default)]
pub struct ComplianceEvaluator {
    policy: TlsPolicy,
}

impl ComplianceEvaluator {
    /// Create an evaluator with the given policy
    #[must_use]
    pub const fn new(policy: TlsPolicy) -> Self {
        Self { policy }
    }

    /// Policy in use
    #[must_use]
    pub const fn policy(&self) -> &TlsPolicy {
        &self.policy
    }

    /// Evaluate observed parameters.
    ///
    /// An empty result means nothing observed breaks the policy; it is not a
    /// claim that the endpoint is compliant.
    #[must_use]
    pub fn evaluate(&self, details: &TlsDetails) -> Vec<Violation> {
        let mut violations = Vec::new();

        let version = self.check_protocol(details, &mut violations);
        let tls12 = version == Some(ProtocolVersion::Tls12);
        let cipher = details.cipher.as_deref().map(|c| (c, CipherTraits::of(c)));

        self.check_cipher(cipher, tls12, &mut violations);
        self.check_key_exchange(details, tls12, &mut violations);
        self.check_public_key(details, cipher.map(|(_, t)| t), &mut violations);
        Self::check_compression(details, &mut violations);

        violations
    }

    fn flag_absent(&self, field: &str, violations: &mut Vec<Violation>) {
        if self.policy.absent_fields == AbsentFieldPolicy::Flag {
            violations.push(Violation::new(
                PolicyRule::NotObserved,
                format!("TLS {field} was not observed"),
            ));
        }
    }

    fn check_protocol(
        &self,
        details: &TlsDetails,
        violations: &mut Vec<Violation>,
    ) -> Option<ProtocolVersion> {
        let Some(raw) = details.version.as_deref() else {
            self.flag_absent("protocol version", violations);
            return None;
        };

        match raw.parse::<ProtocolVersion>() {
            Ok(version) if version.is_deprecated() => {
                violations.push(Violation::new(
                    PolicyRule::DeprecatedProtocol,
                    format!("Deprecated protocol {raw}; only TLS 1.2 and TLS 1.3 are allowed"),
                ));
                Some(version)
            }
            Ok(version) => Some(version),
            Err(_) => {
                violations.push(Violation::new(
                    PolicyRule::UnrecognizedProtocol,
                    format!("Unrecognized protocol {raw}; only TLS 1.2 and TLS 1.3 are allowed"),
                ));
                None
            }
        }
    }

    fn check_cipher(
        &self,
        cipher: Option<(&str, CipherTraits)>,
        tls12: bool,
        violations: &mut Vec<Violation>,
    ) {
        let Some((name, traits)) = cipher else {
            self.flag_absent("cipher suite", violations);
            return;
        };

        if traits.weak {
            violations.push(Violation::new(
                PolicyRule::WeakCipher,
                format!("Weak cipher suite {name} (RC4, DES, export-grade, NULL, anonymous or MD5)"),
            ));
        } else if tls12 && !traits.aead {
            violations.push(Violation::new(
                PolicyRule::NonAeadCipher,
                format!("Non-AEAD cipher suite {name} negotiated over TLS 1.2"),
            ));
        }

        if tls12 && !traits.forward_secret {
            violations.push(Violation::new(
                PolicyRule::NoForwardSecrecy,
                format!("Cipher suite {name} does not provide forward secrecy"),
            ));
        }
    }

    fn check_key_exchange(&self, details: &TlsDetails, tls12: bool, violations: &mut Vec<Violation>) {
        if !tls12 {
            return;
        }
        let Some(kex) = details.kex_alg.as_deref() else {
            self.flag_absent("key exchange", violations);
            return;
        };

        // e.g. "X25519, 253 bits", "ECDH, P-256, 256 bits", "DH, 2048 bits"
        let mut parts = kex.split(',').map(str::trim);
        let group = parts.next().unwrap_or_default().to_uppercase();

        if !EPHEMERAL_GROUPS.contains(&group.as_str()) {
            violations.push(Violation::new(
                PolicyRule::StaticKeyExchange,
                format!("Key exchange {kex} is not ephemeral Diffie-Hellman"),
            ));
            return;
        }

        if group == "DH" {
            let bits = parts.last().and_then(parse_bits);
            if let Some(bits) = bits.filter(|b| *b < self.policy.min_public_key_bits) {
                violations.push(Violation::new(
                    PolicyRule::WeakPublicKey,
                    format!(
                        "Ephemeral DH group of {bits} bits is below the {} bit minimum",
                        self.policy.min_public_key_bits
                    ),
                ));
            }
        }
    }

    fn check_public_key(
        &self,
        details: &TlsDetails,
        cipher: Option<CipherTraits>,
        violations: &mut Vec<Violation>,
    ) {
        let Some(raw) = details.pub_key_size.as_deref() else {
            return;
        };

        let ec_key = cipher.is_some_and(|t| t.ecdsa)
            || details.auth_alg.as_deref().is_some_and(|a| {
                let upper = a.to_uppercase();
                upper.contains("ECDSA") || upper.starts_with("ED25519") || upper.starts_with("ED448")
            });
        if ec_key {
            return;
        }

        match raw.trim().parse::<u32>() {
            Ok(bits) if bits < self.policy.min_public_key_bits => {
                violations.push(Violation::new(
                    PolicyRule::WeakPublicKey,
                    format!(
                        "Server public key of {bits} bits is below the {} bit minimum",
                        self.policy.min_public_key_bits
                    ),
                ));
            }
            Ok(_) => {}
            Err(_) => violations.push(Violation::new(
                PolicyRule::WeakPublicKey,
                format!("Unreadable server public key size {raw}"),
            )),
        }
    }

    fn check_compression(details: &TlsDetails, violations: &mut Vec<Violation>) {
        if let Some(method) = details.compression.as_deref().map(str::trim) {
            if !method.is_empty() && !method.eq_ignore_ascii_case("NONE") {
                violations.push(Violation::new(
                    PolicyRule::Compression,
                    format!("TLS compression {method} is enabled"),
                ));
            }
        }
    }
}

/// Parse `"2048 bits"` into 2048
fn parse_bits(field: &str) -> Option<u32> {
    field.split_whitespace().next()?.parse().ok()
}
