//! `openssl s_client` transcript parsing.
//!
//! Each line of the transcript is matched independently against one pattern
//! per observable. Matches become [`Observation`]s, which are then folded into
//! a [`TlsDetails`] record (first occurrence of each field wins).

use regex::Regex;
use std::sync::OnceLock;
use vci_audit_core::TlsDetails;

/// One fact reported by the diagnostic client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// `    Protocol  : TLSv1.3` (session block)
    Protocol(String),
    /// `    Cipher    : TLS_AES_256_GCM_SHA384` (session block)
    Cipher(String),
    /// `New, TLSv1.2, Cipher is ECDHE-RSA-AES128-GCM-SHA256`
    NewSession {
        /// Protocol version
        version: String,
        /// Cipher suite
        cipher: String,
    },
    /// `Server Temp Key: X25519, 253 bits`
    ServerTempKey(String),
    /// `Peer signature type: RSA-PSS`
    PeerSignatureType(String),
    /// `Server public key is 2048 bit`
    PublicKeyBits(String),
    /// `Compression: NONE`
    Compression(String),
}

struct Patterns {
    protocol: Regex,
    cipher: Regex,
    new_session: Regex,
    temp_key: Regex,
    peer_signature: Regex,
    public_key: Regex,
    compression: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |pattern: &str| Regex::new(pattern).expect("static pattern");
        Patterns {
            protocol: re(r"^\s+Protocol\s+:\s*(?P<version>.*?)\s*$"),
            cipher: re(r"^\s+Cipher\s+:\s*(?P<cipher>.*?)\s*$"),
            new_session: re(r"^New, (?P<version>.*?), Cipher is (?P<cipher>.*?)\s*$"),
            temp_key: re(r"^Server Temp Key:\s*(?P<kex>.*?)\s*$"),
            peer_signature: re(r"^Peer signature type:\s*(?P<auth>.*?)\s*$"),
            public_key: re(r"^Server public key is (?P<bits>[0-9]+) bit"),
            compression: re(r"^Compression:\s*(?P<compression>.*?)\s*$"),
        }
    })
}

/// Placeholders OpenSSL prints when nothing was negotiated
fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value == "(NONE)" || value == "0000"
}

fn capture(re: &Regex, line: &str, name: &str) -> Option<String> {
    re.captures(line)
        .and_then(|c| c.name(name))
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !is_placeholder(v))
}

/// Extract every recognized observation from a transcript, in line order
#[must_use]
pub fn observations(transcript: &str) -> Vec<Observation> {
    let p = patterns();
    let mut found = Vec::new();

    for line in transcript.lines() {
        if let Some(v) = capture(&p.protocol, line, "version") {
            found.push(Observation::Protocol(v));
        } else if let Some(v) = capture(&p.cipher, line, "cipher") {
            found.push(Observation::Cipher(v));
        } else if let Some(c) = p.new_session.captures(line) {
            let version = c.name("version").map(|m| m.as_str().trim().to_string());
            let cipher = c.name("cipher").map(|m| m.as_str().trim().to_string());
            if let (Some(version), Some(cipher)) = (version, cipher) {
                if !is_placeholder(&version) && !is_placeholder(&cipher) {
                    found.push(Observation::NewSession { version, cipher });
                }
            }
        } else if let Some(v) = capture(&p.temp_key, line, "kex") {
            found.push(Observation::ServerTempKey(v));
        } else if let Some(v) = capture(&p.peer_signature, line, "auth") {
            found.push(Observation::PeerSignatureType(v));
        } else if let Some(v) = capture(&p.public_key, line, "bits") {
            found.push(Observation::PublicKeyBits(v));
        } else if let Some(v) = capture(&p.compression, line, "compression") {
            found.push(Observation::Compression(v));
        }
    }

    found
}

/// Parse a transcript into a [`TlsDetails`] record.
///
/// Version and cipher come from the session block; the `New, ..., Cipher is`
/// line is used only when the session block reported neither.
#[must_use]
pub fn parse_tls_details(transcript: &str) -> TlsDetails {
    let mut details = TlsDetails::default();
    let mut fallback = None;

    for observation in observations(transcript) {
        match observation {
            Observation::Protocol(v) => {
                details.version.get_or_insert(v);
            }
            Observation::Cipher(v) => {
                details.cipher.get_or_insert(v);
            }
            Observation::NewSession { version, cipher } => {
                fallback.get_or_insert((version, cipher));
            }
            Observation::ServerTempKey(v) => {
                details.kex_alg.get_or_insert(v);
            }
            Observation::PeerSignatureType(v) => {
                details.auth_alg.get_or_insert(v);
            }
            Observation::PublicKeyBits(v) => {
                details.pub_key_size.get_or_insert(v);
            }
            Observation::Compression(v) => {
                details.compression.get_or_insert(v);
            }
        }
    }

    if details.version.is_none() && details.cipher.is_none() {
        if let Some((version, cipher)) = fallback {
            details.version = Some(version);
            details.cipher = Some(cipher);
        }
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;

    /// OpenSSL 1.1.1 against a TLS 1.2 endpoint
    const TLS12_TRANSCRIPT: &str = "\
CONNECTED(00000003)
---
Certificate chain
 0 s:CN = issuer.example
   i:C = US, O = Let's Encrypt, CN = R3
---
Server certificate
subject=CN = issuer.example

issuer=C = US, O = Let's Encrypt, CN = R3

---
No client certificate CA names sent
Peer signing digest: SHA256
Peer signature type: RSA-PSS
Server Temp Key: X25519, 253 bits
---
SSL handshake has read 4593 bytes and written 405 bytes
Verification: OK
---
New, TLSv1.2, Cipher is ECDHE-RSA-AES128-GCM-SHA256
Server public key is 2048 bit
Secure Renegotiation IS supported
Compression: NONE
Expansion: NONE
No ALPN negotiated
SSL-Session:
    Protocol  : TLSv1.2
    Cipher    : ECDHE-RSA-AES128-GCM-SHA256
    Session-ID: 5F1C
    Master-Key: 0A1B
    Verify return code: 0 (ok)
---
DONE
";

    /// TLS 1.3 output where the session block is not printed
    const FALLBACK_TRANSCRIPT: &str = "\
CONNECTED(00000003)
---
Peer signature type: ECDSA
Server Temp Key: X25519, 253 bits
---
New, TLSv1.2, Cipher is ECDHE-RSA-AES128-GCM-SHA256
Server public key is 256 bit
Compression: NONE
Expansion: NONE
";

    #[test]
    fn test_parse_session_block() {
        let details = parse_tls_details(TLS12_TRANSCRIPT);
        assert_eq!(details.version.as_deref(), Some("TLSv1.2"));
        assert_eq!(details.cipher.as_deref(), Some("ECDHE-RSA-AES128-GCM-SHA256"));
        assert_eq!(details.kex_alg.as_deref(), Some("X25519, 253 bits"));
        assert_eq!(details.auth_alg.as_deref(), Some("RSA-PSS"));
        assert_eq!(details.pub_key_size.as_deref(), Some("2048"));
        assert_eq!(details.compression.as_deref(), Some("NONE"));
    }

    #[test]
    fn test_parse_fallback_line() {
        let details = parse_tls_details(FALLBACK_TRANSCRIPT);
        assert_eq!(details.version.as_deref(), Some("TLSv1.2"));
        assert_eq!(details.cipher.as_deref(), Some("ECDHE-RSA-AES128-GCM-SHA256"));
        assert_eq!(details.pub_key_size.as_deref(), Some("256"));
    }

    #[test]
    fn test_fallback_not_used_when_one_primary_field_present() {
        let transcript = "\
New, TLSv1.2, Cipher is ECDHE-RSA-AES128-GCM-SHA256
SSL-Session:
    Protocol  : TLSv1.3
";
        let details = parse_tls_details(transcript);
        assert_eq!(details.version.as_deref(), Some("TLSv1.3"));
        assert_eq!(details.cipher, None);
    }

    #[test]
    fn test_failed_handshake_placeholders() {
        let transcript = "\
CONNECTED(00000003)
New, (NONE), Cipher is (NONE)
Compression: NONE
SSL-Session:
    Protocol  : TLSv1.2
    Cipher    : 0000
";
        let details = parse_tls_details(transcript);
        assert_eq!(details.version.as_deref(), Some("TLSv1.2"));
        assert_eq!(details.cipher, None);
    }

    #[test]
    fn test_empty_transcript() {
        assert!(parse_tls_details("").is_empty());
        assert!(observations("garbage\nmore garbage").is_empty());
    }

    #[test]
    fn test_observation_order() {
        let found = observations(FALLBACK_TRANSCRIPT);
        assert_eq!(
            found.first(),
            Some(&Observation::PeerSignatureType("ECDSA".into()))
        );
        assert!(found.contains(&Observation::NewSession {
            version: "TLSv1.2".into(),
            cipher: "ECDHE-RSA-AES128-GCM-SHA256".into(),
        }));
    }
}
