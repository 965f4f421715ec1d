//! Audit report construction.

use vci_audit_core::{AuditLog, DirectoryLog};

use crate::diff::{DiffEngine, UrlNormalization};

/// Builds an [`AuditLog`] from a snapshot and, optionally, the one before it.
///
/// Building is pure: the same inputs always give the same report.
#[derive(Debug, Clone, Copy)]
pub struct AuditLogBuilder<'a> {
    current: &'a DirectoryLog,
    previous: Option<&'a DirectoryLog>,
    engine: DiffEngine,
}

impl<'a> AuditLogBuilder<'a> {
    /// Start a report for `current`
    #[must_use]
    pub fn new(current: &'a DirectoryLog) -> Self {
        Self {
            current,
            previous: None,
            engine: DiffEngine::default(),
        }
    }

    /// Compare against a previous snapshot
    #[must_use]
    pub const fn previous(mut self, previous: Option<&'a DirectoryLog>) -> Self {
        self.previous = previous;
        self
    }

    /// Normalize `audit-<n>` fixture folders when comparing issuer URLs
    #[must_use]
    pub const fn test_mode(mut self, enabled: bool) -> Self {
        self.engine = DiffEngine::new(UrlNormalization::for_test_mode(enabled));
        self
    }

    /// Produce the report
    #[must_use]
    pub fn build(&self) -> AuditLog {
        let current = self.current;
        let duplicates = self.engine.duplicates(current);

        let mut report = AuditLog {
            directory: current.directory.clone(),
            audit_time: current.time,
            issuer_count: current.issuer_info.len(),
            issuers_with_errors: current
                .issuer_info
                .iter()
                .filter(|info| info.has_errors())
                .cloned()
                .collect(),
            issuer_with_crl_count: current.issuer_info.iter().filter(|info| info.has_crls()).count(),
            duplicated_kids: duplicates.kids,
            duplicated_iss: duplicates.iss,
            duplicated_names: duplicates.names,
            previous_audit_time: None,
            new_issuer_count: None,
            deleted_issuer_count: None,
            removed_kids: None,
        };

        if let Some(previous) = self.previous {
            let comparison = self.engine.compare(current, previous);
            report.previous_audit_time = Some(previous.time);
            report.new_issuer_count = Some(comparison.new_issuer_count);
            report.deleted_issuer_count = Some(comparison.deleted_issuer_count);
            report.removed_kids = Some(comparison.removed_kids);
        }

        report
    }
}
