use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Identity record of one issuer in the source directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedIssuer {
    /// Issuer base URL
    pub iss: String,

    /// Display name
    pub name: String,
}

/// The published directory document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuerDirectory {
    /// Issuers in publication order
    pub participating_issuers: Vec<TrustedIssuer>,
}

/// One public key published by an issuer.
///
/// Only `kid` and `crlVersion` are interpreted; every other JWK member is
/// carried through untouched so snapshots keep the key as published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuerKey {
    /// Key identifier
    pub kid: String,

    /// Revocation list version, when the issuer publishes one for this key
    #[serde(
        rename = "crlVersion",
        default,
        deserialize_with = "crl_version",
        skip_serializing_if = "Option::is_none"
    )]
    pub crl_version: Option<u64>,

    /// Remaining JWK members
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl IssuerKey {
    /// Create a key with no revocation list and no extra members
    #[must_use]
    pub fn new(kid: impl Into<String>) -> Self {
        Self {
            kid: kid.into(),
            crl_version: None,
            other: Map::new(),
        }
    }

    /// Returns true if a revocation list should be fetched for this key.
    ///
    /// A `crlVersion` of 0 means no revocation has been published yet.
    #[must_use]
    pub fn has_crl(&self) -> bool {
        self.crl_version.is_some_and(|v| v > 0)
    }
}

/// Accepts any non-negative JSON number; fractional versions are truncated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn crl_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let Some(number) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(version) = number.as_u64() {
        return Ok(Some(version));
    }
    match number.as_f64() {
        Some(version) if version.is_finite() && version >= 0.0 => Ok(Some(version as u64)),
        _ => Err(D::Error::custom(format!("invalid crlVersion {number}"))),
    }
}

/// The key-set document served at `/.well-known/jwks.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeySet {
    /// Published keys
    pub keys: Vec<IssuerKey>,
}

/// A key-set document whose keys have not been interpreted yet.
///
/// Keys are parsed one by one so a single malformed entry does not discard
/// the rest of the set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawKeySet {
    /// Published keys, as JSON
    pub keys: Vec<Value>,
}

impl RawKeySet {
    /// Split into the keys that parse and the position and reason of each
    /// key that does not
    #[must_use]
    pub fn parse_keys(self) -> (KeySet, Vec<(usize, String)>) {
        let mut keys = Vec::with_capacity(self.keys.len());
        let mut rejected = Vec::new();
        for (index, value) in self.keys.into_iter().enumerate() {
            match serde_json::from_value::<IssuerKey>(value) {
                Ok(key) => keys.push(key),
                Err(e) => rejected.push((index, e.to_string())),
            }
        }
        (KeySet { keys }, rejected)
    }
}

/// Revocation list document, kept opaque
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crl(pub Value);
