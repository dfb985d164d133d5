//! provcheck - verify SLSA build provenance for GitHub release artifacts
//!
//! This library provides the non-cryptographic half of provenance checking:
//! project-type detection, workflow-run discovery, artifact matching, and the
//! dispatch loop that drives the external `slsa-verifier` CLI. Signature and
//! transparency-log verification stay delegated to `slsa-verifier`; CI
//! interaction stays delegated to the `gh` CLI.

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod attestation;
pub mod checksum;
pub mod config;
pub mod detect;
pub mod discover;
pub mod dispatch;
pub mod output;
pub mod refspec;
pub mod repo;
pub mod runner;
