//! `openssl s_client` handshake probe.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;
use url::Url;

use crate::error::{TlsProbeError, TlsResult};
use crate::probe::TlsProbe;

/// Port probed on every issuer host
pub const DEFAULT_TLS_PORT: u16 = 443;

/// Time budget for one handshake
pub const DEFAULT_TLS_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs `openssl s_client -connect host:443` and captures its output
#[derive(Debug, Clone)]
pub struct OpensslProbe {
    program: PathBuf,
    port: u16,
    timeout: Duration,
}

impl Default for OpensslProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl OpensslProbe {
    /// Probe using `openssl` from `PATH`
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("openssl"),
            port: DEFAULT_TLS_PORT,
            timeout: DEFAULT_TLS_TIMEOUT,
        }
    }

    /// Use a specific openssl binary
    #[must_use]
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the port to connect to
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the handshake timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn target(&self, issuer: &Url) -> TlsResult<(String, String)> {
        let host = issuer
            .host_str()
            .ok_or_else(|| TlsProbeError::InvalidTarget(issuer.to_string()))?;
        // Keep the host from being read as an option by s_client.
        if host.starts_with('-') {
            return Err(TlsProbeError::InvalidTarget(host.to_string()));
        }
        Ok((host.to_string(), format!("{host}:{}", self.port)))
    }
}

#[async_trait]
impl TlsProbe for OpensslProbe {
    async fn handshake(&self, issuer: &Url) -> TlsResult<String> {
        let (host, connect) = self.target(issuer)?;
        debug!(target = %connect, "running openssl s_client");

        let child = Command::new(&self.program)
            .arg("s_client")
            .arg("-connect")
            .arg(&connect)
            .arg("-servername")
            .arg(&host)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TlsProbeError::Unavailable {
                        program: self.program.display().to_string(),
                    }
                } else {
                    TlsProbeError::Io(e)
                }
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| TlsProbeError::Timeout(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TlsProbeError::Failed {
                code: output.status.code(),
                stderr: stderr.lines().last().unwrap_or_default().trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
