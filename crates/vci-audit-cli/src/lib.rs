//! # vci-audit-cli
//!
//! Command-line front end for the issuer directory audit engine.
//!
//! ## Features
//!
//! - **Snapshot**: fetch the directory and probe every issuer, with a
//!   progress bar while issuers finish
//! - **Report**: duplicates, error and CRL counts, and a comparison with a
//!   previous snapshot when one is given
//! - **Offline re-audit**: `--inlog` reports on an existing snapshot file
//! - **Config file**: defaults for directory, log folder and concurrency

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
