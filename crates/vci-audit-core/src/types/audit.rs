//! Audit report -- summary and diff of a directory snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::log::IssuerLogInfo;

/// Key identifiers that disappeared from one issuer between two snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerKids {
    /// Issuer URL (normalized)
    pub iss: String,

    /// Key identifiers
    pub kids: Vec<String>,
}

/// Audit report for one snapshot, optionally compared to a previous one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// Directory URL
    pub directory: String,

    /// Time of the audited snapshot
    pub audit_time: DateTime<Utc>,

    /// Number of issuers in the snapshot
    pub issuer_count: usize,

    /// Full entries of issuers with at least one recorded error
    pub issuers_with_errors: Vec<IssuerLogInfo>,

    /// Number of issuers with at least one revocation list
    #[serde(rename = "issuerWithCRLCount")]
    pub issuer_with_crl_count: usize,

    /// Key identifiers published more than once across the directory
    pub duplicated_kids: Vec<String>,

    /// Issuer URLs listed more than once
    pub duplicated_iss: Vec<String>,

    /// Issuer names listed more than once
    pub duplicated_names: Vec<String>,

    /// Time of the previous snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_audit_time: Option<DateTime<Utc>>,

    /// Issuers absent from the previous snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_issuer_count: Option<usize>,

    /// Issuers absent from the current snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_issuer_count: Option<usize>,

    /// Keys removed per issuer since the previous snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_kids: Option<Vec<IssuerKids>>,
}

impl AuditLog {
    /// Returns true if this report compares against a previous snapshot
    #[must_use]
    pub const fn has_comparison(&self) -> bool {
        self.previous_audit_time.is_some()
    }
}
