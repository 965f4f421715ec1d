//! Snapshot comparison -- duplicates, issuer churn and removed keys.
//!
//! Issuer URLs are compared after [`UrlNormalization`]; everything else is
//! compared verbatim. Neither snapshot is modified.

use regex::Regex;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;
use vci_audit_core::{DirectoryLog, IssuerKids};

/// How issuer URLs are canonicalized before comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UrlNormalization {
    /// Compare URLs exactly as published
    #[default]
    Verbatim,
    /// Rewrite a sequenced `audit-<n>` folder to `audit`, so fixtures that
    /// simulate one issuer over several runs compare as the same issuer
    SequencedAuditFolder,
}

fn audit_folder() -> &'static Regex {
    static AUDIT_FOLDER: OnceLock<Regex> = OnceLock::new();
    AUDIT_FOLDER.get_or_init(|| Regex::new(r"audit-\d+").expect("static pattern"))
}

impl UrlNormalization {
    /// Select the normalization for a run
    #[must_use]
    pub const fn for_test_mode(test_mode: bool) -> Self {
        if test_mode {
            Self::SequencedAuditFolder
        } else {
            Self::Verbatim
        }
    }

    /// Normalize one issuer URL
    #[must_use]
    pub fn normalize<'a>(self, iss: &'a str) -> Cow<'a, str> {
        match self {
            Self::Verbatim => Cow::Borrowed(iss),
            Self::SequencedAuditFolder => audit_folder().replace(iss, "audit"),
        }
    }
}

/// Distinct values occurring at least twice, sorted.
///
/// The input is treated as a multiset, so the result does not depend on the
/// order of `values`.
#[must_use]
pub fn find_duplicates<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value.as_ref().to_string()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(value, _)| value)
        .collect()
}

/// Values duplicated within one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Duplicates {
    /// Key identifiers, across all issuers
    pub kids: Vec<String>,
    /// Normalized issuer URLs
    pub iss: Vec<String>,
    /// Issuer display names
    pub names: Vec<String>,
}

/// Differences between a snapshot and the one before it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    /// Issuers absent from the previous snapshot
    pub new_issuer_count: usize,
    /// Issuers absent from the current snapshot
    pub deleted_issuer_count: usize,
    /// Keys that disappeared from issuers present in both
    pub removed_kids: Vec<IssuerKids>,
}

/// Computes duplicates and snapshot-to-snapshot differences
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine {
    normalization: UrlNormalization,
}

impl DiffEngine {
    /// Create an engine with the given URL normalization
    #[must_use]
    pub const fn new(normalization: UrlNormalization) -> Self {
        Self { normalization }
    }

    fn issuer_urls<'a>(&self, log: &'a DirectoryLog) -> Vec<Cow<'a, str>> {
        log.issuer_info
            .iter()
            .map(|info| self.normalization.normalize(&info.issuer.iss))
            .collect()
    }

    fn issuer_set<'a>(&self, log: &'a DirectoryLog) -> HashSet<Cow<'a, str>> {
        self.issuer_urls(log).into_iter().collect()
    }

    /// Duplicated kids, issuer URLs and names within one snapshot
    #[must_use]
    pub fn duplicates(&self, log: &DirectoryLog) -> Duplicates {
        Duplicates {
            kids: find_duplicates(
                log.issuer_info
                    .iter()
                    .flat_map(|info| info.keys.iter().map(|key| key.kid.as_str())),
            ),
            iss: find_duplicates(self.issuer_urls(log)),
            names: find_duplicates(log.issuer_info.iter().map(|info| info.issuer.name.as_str())),
        }
    }

    /// Distinct issuers in `current` that `previous` does not list
    #[must_use]
    pub fn new_issuer_count(&self, current: &DirectoryLog, previous: &DirectoryLog) -> usize {
        let before = self.issuer_set(previous);
        self.issuer_set(current)
            .iter()
            .filter(|iss| !before.contains(*iss))
            .count()
    }

    /// Distinct issuers in `previous` that `current` no longer lists
    #[must_use]
    pub fn deleted_issuer_count(&self, current: &DirectoryLog, previous: &DirectoryLog) -> usize {
        self.new_issuer_count(previous, current)
    }

    /// Keys listed by an issuer in `previous` but not in `current`.
    ///
    /// Only issuers present in both snapshots are considered. Groups follow
    /// the issuer order of `previous`, kids keep their previous order, and
    /// issuers with nothing removed are left out.
    #[must_use]
    pub fn removed_kids(&self, current: &DirectoryLog, previous: &DirectoryLog) -> Vec<IssuerKids> {
        let mut current_kids: HashMap<Cow<'_, str>, HashSet<&str>> = HashMap::new();
        for info in &current.issuer_info {
            current_kids
                .entry(self.normalization.normalize(&info.issuer.iss))
                .or_default()
                .extend(info.keys.iter().map(|key| key.kid.as_str()));
        }

        let mut order: Vec<Cow<'_, str>> = Vec::new();
        let mut removed: HashMap<Cow<'_, str>, Vec<String>> = HashMap::new();
        for info in &previous.issuer_info {
            let iss = self.normalization.normalize(&info.issuer.iss);
            let Some(still_listed) = current_kids.get(iss.as_ref()) else {
                continue;
            };

            if !removed.contains_key(iss.as_ref()) {
                order.push(iss.clone());
            }
            let group = removed.entry(iss).or_default();
            for key in &info.keys {
                if !still_listed.contains(key.kid.as_str()) && !group.contains(&key.kid) {
                    group.push(key.kid.clone());
                }
            }
        }

        order
            .into_iter()
            .filter_map(|iss| {
                let kids = removed.remove(iss.as_ref())?;
                (!kids.is_empty()).then(|| IssuerKids {
                    iss: iss.into_owned(),
                    kids,
                })
            })
            .collect()
    }

    /// Full comparison of two snapshots
    #[must_use]
    pub fn compare(&self, current: &DirectoryLog, previous: &DirectoryLog) -> Comparison {
        Comparison {
            new_issuer_count: self.new_issuer_count(current, previous),
            deleted_issuer_count: self.deleted_issuer_count(current, previous),
            removed_kids: self.removed_kids(current, previous),
        }
    }
}
