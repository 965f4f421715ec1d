//! TLS posture checks for issuer endpoints.
//!
//! The handshake itself is delegated to an external diagnostic client
//! (`openssl s_client`); this crate runs it, turns its transcript into a
//! [`TlsDetails`] record, and evaluates that record against a BCP 195
//! transport security baseline.
//!
//! ```text
//! TlsProbe::handshake() -> transcript
//!   -> parse_tls_details() -> TlsDetails
//!   -> ComplianceEvaluator::evaluate() -> Vec<Violation>
//! ```

mod compliance;
mod error;
mod openssl;
mod parser;
mod probe;

pub use compliance::{AbsentFieldPolicy, ComplianceEvaluator, ProtocolVersion, TlsPolicy};
pub use error::{TlsProbeError, TlsResult};
pub use openssl::{OpensslProbe, DEFAULT_TLS_PORT, DEFAULT_TLS_TIMEOUT};
pub use parser::{observations, parse_tls_details, Observation};
pub use probe::TlsProbe;
pub use vci_audit_core::{PolicyRule, TlsDetails, Violation};
