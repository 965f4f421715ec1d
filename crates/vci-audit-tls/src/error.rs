use std::time::Duration;
use thiserror::Error;

/// Result type alias for TLS probing
pub type TlsResult<T> = std::result::Result<T, TlsProbeError>;

/// Reasons a handshake transcript could not be obtained
#[derive(Error, Debug)]
pub enum TlsProbeError {
    /// The diagnostic client is not installed
    #[error("{program} not available")]
    Unavailable {
        /// Program that was looked up
        program: String,
    },

    /// The diagnostic client ran but reported failure
    #[error("handshake failed (exit code {code:?}): {stderr}")]
    Failed {
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Last line of diagnostic output
        stderr: String,
    },

    /// The handshake did not finish in time
    #[error("handshake timed out after {0:?}")]
    Timeout(Duration),

    /// The issuer URL has no usable host
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// Process spawn or pipe error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
