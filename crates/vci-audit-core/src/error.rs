use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;
use thiserror::Error;

use crate::types::Violation;

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Errors that abort an audit run.
///
/// Anything that goes wrong for a single issuer is an [`IssuerError`] instead
/// and is recorded on that issuer's log entry.
#[derive(Error, Debug)]
pub enum AuditError {
    /// The directory document could not be fetched
    #[error("can't fetch directory {url}: {reason}")]
    DirectoryFetch {
        /// Directory URL
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// The directory document could not be parsed
    #[error("can't parse directory {url}: {reason}")]
    DirectoryParse {
        /// Directory URL
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// A snapshot file could not be read or parsed
    #[error("can't read snapshot {path}: {reason}")]
    Snapshot {
        /// File path
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad classification of a recorded per-issuer error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Endpoint unreachable, HTTP failure status, or TLS probe unavailable
    NetworkFailure,
    /// Response body was not the expected JSON document
    ParseFailure,
    /// TLS configuration breaks the transport security policy
    PolicyViolation,
    /// CORS header missing or not matching the requested origin
    CorsMismatch,
    /// A bounded call ran out of time
    Timeout,
    /// Read back from a persisted snapshot; the original kind is unknown
    Unclassified,
}

/// A failure recorded against one issuer without stopping the audit.
///
/// In the JSON documents each error is rendered as its display string, which
/// keeps the snapshot shape a plain list of messages. Strings read back from
/// a persisted snapshot become [`IssuerError::Recorded`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssuerError {
    /// Endpoint unreachable or answered with a failure status
    #[error("can't reach {url}: {reason}")]
    Network {
        /// Requested URL
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// Call did not complete within its time budget
    #[error("request to {target} timed out after {after:?}")]
    Timeout {
        /// URL or host:port that was being contacted
        target: String,
        /// Time budget that ran out
        after: Duration,
    },

    /// Response body could not be parsed
    #[error("can't parse {url}: {reason}")]
    Parse {
        /// Requested URL
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// Key endpoint response carries no CORS header
    #[error("Issuer key endpoint does not contain a CORS 'access-control-allow-origin' header")]
    CorsMissing,

    /// Key endpoint CORS header does not allow the requested origin
    #[error("Issuer key endpoint's CORS 'access-control-allow-origin' header {found} does not match the requested origin")]
    CorsMismatch {
        /// Header value returned by the issuer
        found: String,
    },

    /// External TLS diagnostic could not be run against the issuer host
    #[error("TLS probe unavailable for {host}: {reason}")]
    TlsProbeUnavailable {
        /// Issuer host
        host: String,
        /// Underlying failure
        reason: String,
    },

    /// Transport security policy violation
    #[error("{0}")]
    Policy(Violation),

    /// Message read back from a persisted snapshot
    #[error("{0}")]
    Recorded(String),
}

impl IssuerError {
    /// Returns the classification of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } | Self::TlsProbeUnavailable { .. } => ErrorKind::NetworkFailure,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Parse { .. } => ErrorKind::ParseFailure,
            Self::CorsMissing | Self::CorsMismatch { .. } => ErrorKind::CorsMismatch,
            Self::Policy(_) => ErrorKind::PolicyViolation,
            Self::Recorded(_) => ErrorKind::Unclassified,
        }
    }
}

impl From<Violation> for IssuerError {
    fn from(violation: Violation) -> Self {
        Self::Policy(violation)
    }
}

impl Serialize for IssuerError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IssuerError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::Recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(IssuerError::CorsMissing.kind(), ErrorKind::CorsMismatch);
        assert_eq!(
            IssuerError::Timeout {
                target: "https://issuer.example/.well-known/jwks.json".into(),
                after: Duration::from_secs(5),
            }
            .kind(),
            ErrorKind::Timeout
        );
        assert_eq!(
            IssuerError::Recorded("anything".into()).kind(),
            ErrorKind::Unclassified
        );
    }

    #[test]
    fn test_timeout_message_keeps_subsecond_budget() {
        let err = IssuerError::Timeout {
            target: "issuer.example:443".into(),
            after: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "request to issuer.example:443 timed out after 250ms");
    }

    #[test]
    fn test_serializes_as_message() {
        let err = IssuerError::CorsMismatch {
            found: "https://other.example".into(),
        };
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(
            json,
            "\"Issuer key endpoint's CORS 'access-control-allow-origin' header https://other.example does not match the requested origin\""
        );
    }

    #[test]
    fn test_deserializes_as_recorded() {
        let err: IssuerError = serde_json::from_str("\"boom\"").unwrap();
        assert_eq!(err, IssuerError::Recorded("boom".into()));
        assert_eq!(err.to_string(), "boom");
    }
}
