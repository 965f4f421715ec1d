//! Configuration management.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Folder for logs when neither the config file nor a flag names one
pub const DEFAULT_LOG_DIR: &str = "logs";

/// CLI configuration, read from `config.toml`.
///
/// Every field is optional; flags override whatever is set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory URL to audit.
    pub directory: Option<String>,

    /// Folder for default-named directory logs and audit reports.
    pub log_dir: Option<PathBuf>,

    /// Issuers probed at the same time.
    pub concurrency: Option<usize>,

    /// Report TLS parameters that could not be observed.
    #[serde(default)]
    pub strict_tls: bool,

    /// Origin sent to key endpoints when checking CORS.
    pub origin: Option<String>,
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("org", "vci", "vci-auditor")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from a file; a missing file gives the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

        Ok(config)
    }

    /// Log folder, falling back to `logs`.
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.log_dir(), PathBuf::from("logs"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
directory = "https://directory.example/issuers.json"
log_dir = "/var/log/vci"
concurrency = 4
strict_tls = true
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.directory.as_deref(),
            Some("https://directory.example/issuers.json")
        );
        assert_eq!(config.log_dir(), PathBuf::from("/var/log/vci"));
        assert_eq!(config.concurrency, Some(4));
        assert!(config.strict_tls);
        assert!(config.origin.is_none());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "concurrency = \"many\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
