//! Artifact digests
//!
//! In-process streaming sha256, so artifact digests never depend on a
//! platform `sha256sum`/`shasum` binary.

use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Compute the hex-encoded sha256 digest of a file.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
