//! Directory snapshot -- point-in-time state of every issuer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::issuer::{Crl, IssuerKey, TrustedIssuer};
use super::tls::TlsDetails;
use crate::error::IssuerError;

/// Probe result for one issuer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerLogInfo {
    /// Issuer as listed in the directory
    pub issuer: TrustedIssuer,

    /// Keys served by the issuer's key endpoint
    #[serde(default)]
    pub keys: Vec<IssuerKey>,

    /// Observed TLS parameters, when the probe ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_details: Option<TlsDetails>,

    /// Revocation lists fetched for keys carrying a `crlVersion`
    #[serde(default)]
    pub crls: Vec<Crl>,

    /// Failures recorded while probing
    #[serde(default)]
    pub errors: Vec<IssuerError>,
}

impl IssuerLogInfo {
    /// Create an empty entry for an issuer
    #[must_use]
    pub const fn new(issuer: TrustedIssuer) -> Self {
        Self {
            issuer,
            keys: Vec::new(),
            tls_details: None,
            crls: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Returns true if any probe step failed
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if at least one revocation list was fetched
    #[must_use]
    pub fn has_crls(&self) -> bool {
        !self.crls.is_empty()
    }
}

/// Full snapshot of a directory audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryLog {
    /// Directory URL the snapshot was taken from
    pub directory: String,

    /// When the snapshot was taken (UTC, whole seconds)
    pub time: DateTime<Utc>,

    /// One entry per directory issuer, in directory order
    pub issuer_info: Vec<IssuerLogInfo>,
}
