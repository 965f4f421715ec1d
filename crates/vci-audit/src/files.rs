//! Reading and writing snapshot and report files.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use vci_audit_core::{AuditError, DirectoryLog, Result};

/// Write `value` as JSON indented by four spaces, creating parent directories
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    buf.push(b'\n');

    fs::write(path, buf)?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

/// Read a directory snapshot
pub fn read_directory_log(path: &Path) -> Result<DirectoryLog> {
    let snapshot_error = |reason: String| AuditError::Snapshot {
        path: path.display().to_string(),
        reason,
    };

    let content = fs::read_to_string(path).map_err(|e| snapshot_error(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| snapshot_error(e.to_string()))
}

/// Read the previous snapshot for a comparison.
///
/// A missing or unreadable file is logged and treated as no previous
/// snapshot, so the report is produced without comparison fields.
pub fn read_previous(path: &Path) -> Option<DirectoryLog> {
    match read_directory_log(path) {
        Ok(log) => Some(log),
        Err(e) => {
            warn!(error = %e, "previous snapshot ignored");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vci_audit_core::{IssuerError, IssuerLogInfo, TrustedIssuer};

    fn sample() -> DirectoryLog {
        let mut info = IssuerLogInfo::new(TrustedIssuer {
            iss: "https://issuer.example".into(),
            name: "Example".into(),
        });
        info.errors.push(IssuerError::CorsMissing);
        DirectoryLog {
            directory: "https://directory.example".into(),
            time: Utc.with_ymd_and_hms(2022, 1, 31, 8, 30, 0).unwrap(),
            issuer_info: vec![info],
        }
    }

    #[test]
    fn test_write_creates_dirs_and_indents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/nested/snapshot.json");

        write_json(&path, &sample()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"directory\""));
        assert!(text.contains("\"time\": \"2022-01-31T08:30:00Z\""));
    }

    #[test]
    fn test_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        write_json(&path, &sample()).unwrap();

        let log = read_directory_log(&path).unwrap();
        assert_eq!(log.directory, "https://directory.example");
        assert_eq!(log.time, sample().time);
        // errors come back as recorded messages
        assert_eq!(
            log.issuer_info[0].errors[0].to_string(),
            IssuerError::CorsMissing.to_string()
        );
    }

    #[test]
    fn test_read_invalid_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            read_directory_log(&path),
            Err(AuditError::Snapshot { .. })
        ));
        assert!(read_previous(&path).is_none());
    }

    #[test]
    fn test_missing_previous() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_previous(&dir.path().join("absent.json")).is_none());
    }
}
