//! HTTP client for issuer directories.
//!
//! This crate provides [`DirectoryClient`], which fetches the directory
//! document, each issuer's key set (recording the CORS header the issuer
//! returns), and per-key revocation lists.

mod client;
pub mod well_known;

pub use client::{
    DirectoryClient, DirectoryClientBuilder, KeySetResponse, DEFAULT_ORIGIN, DEFAULT_TIMEOUT,
};
pub use vci_audit_core::{AuditError, IssuerError, Result};
