//! Core types and errors for the issuer directory auditor.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace:
//!
//! - **Types**: the directory document, issuer keys, TLS observations, and the
//!   two documents an audit run produces ([`DirectoryLog`] and [`AuditLog`])
//! - **Errors**: [`AuditError`] for failures that abort a run, and
//!   [`IssuerError`] for failures recorded against a single issuer
//!
//! # Example
//!
//! ```rust,ignore
//! use vci_audit_core::{DirectoryLog, Result};
//!
//! fn summarize(log: &DirectoryLog) -> Result<()> {
//!     println!("{} issuers audited at {}", log.issuer_info.len(), log.time);
//!     Ok(())
//! }
//! ```

mod error;
pub mod types;

pub use error::{AuditError, ErrorKind, IssuerError, Result};
pub use types::*;
