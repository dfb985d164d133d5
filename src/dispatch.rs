//! Verification dispatch
//!
//! Drives one `slsa-verifier verify-artifact` invocation per artifact,
//! strictly sequentially, and aggregates an all-or-nothing result. Every
//! prerequisite is checked before the first verifier call: an empty artifact
//! set, a missing provenance file, or a missing artifact file aborts without
//! invoking the verifier at all.

use std::path::PathBuf;

use log::info;
use thiserror::Error;

use crate::checksum;
use crate::config::ToolPaths;
use crate::refspec::{GitRef, RefKind};
use crate::runner::{CommandRunner, RunnerError};

/// Everything one verification run needs, resolved up front
#[derive(Debug, Clone)]
pub struct VerifyRequest {
    /// Repository slug (`owner/name`)
    pub repo: String,
    /// Reference the provenance must attest to
    pub reference: GitRef,
    /// The provenance file all artifacts are verified against
    pub provenance: PathBuf,
    /// Artifact files to verify, in order
    pub artifacts: Vec<PathBuf>,
}

/// Errors that abort dispatch before or between verifier invocations
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The artifact set was empty
    #[error("no artifacts to verify")]
    NoArtifacts,

    /// The provenance file does not exist
    #[error("provenance file not found: {0}")]
    ProvenanceMissing(PathBuf),

    /// An artifact file does not exist
    #[error("artifact file not found: {0}")]
    ArtifactMissing(PathBuf),

    /// The verifier could not be launched
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// Per-artifact verification outcome
#[derive(Debug, Clone)]
pub struct ArtifactOutcome {
    /// The artifact file
    pub path: PathBuf,
    /// Its sha256 digest, when it could be computed
    pub sha256: Option<String>,
    /// Did the verifier exit zero?
    pub passed: bool,
    /// Last line of verifier output, for the report
    pub detail: String,
}

/// Aggregate result across the artifact set
#[derive(Debug, Clone)]
pub struct VerifySummary {
    /// One outcome per artifact, in dispatch order
    pub outcomes: Vec<ArtifactOutcome>,
}

impl VerifySummary {
    /// Number of artifacts dispatched
    #[must_use]
    pub const fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of artifacts that verified
    #[must_use]
    pub fn verified(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    /// All-or-nothing success criterion
    #[must_use]
    pub fn all_passed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.passed)
    }
}

/// Verify every artifact in the request against its provenance.
pub fn run(
    runner: &dyn CommandRunner,
    tools: &ToolPaths,
    req: &VerifyRequest,
) -> Result<VerifySummary, DispatchError> {
    if req.artifacts.is_empty() {
        return Err(DispatchError::NoArtifacts);
    }
    if !req.provenance.is_file() {
        return Err(DispatchError::ProvenanceMissing(req.provenance.clone()));
    }
    for artifact in &req.artifacts {
        if !artifact.is_file() {
            return Err(DispatchError::ArtifactMissing(artifact.clone()));
        }
    }

    let provenance = req.provenance.to_string_lossy().into_owned();
    let source_uri = format!("github.com/{}", req.repo);
    let ref_flag = match req.reference.kind {
        RefKind::Tag => "--source-tag",
        RefKind::Branch => "--source-branch",
    };

    let mut outcomes = Vec::with_capacity(req.artifacts.len());
    for artifact in &req.artifacts {
        let artifact_str = artifact.to_string_lossy().into_owned();
        info!("verifying {artifact_str} against {provenance}");

        let out = runner.run(
            &tools.verifier,
            &[
                "verify-artifact",
                artifact_str.as_str(),
                "--provenance-path",
                provenance.as_str(),
                "--source-uri",
                source_uri.as_str(),
                ref_flag,
                req.reference.name.as_str(),
            ],
            None,
        )?;

        // slsa-verifier reports success on stdout and failures on stderr
        let detail = if out.success() {
            last_line(&out.stdout).or_else(|| last_line(&out.stderr)).unwrap_or_default()
        } else {
            last_line(&out.stderr).or_else(|| last_line(&out.stdout)).unwrap_or_default()
        };
        outcomes.push(ArtifactOutcome {
            path: artifact.clone(),
            sha256: checksum::sha256_file(artifact).ok(),
            passed: out.success(),
            detail,
        });
    }

    Ok(VerifySummary { outcomes })
}

fn last_line(text: &str) -> Option<String> {
    text.lines().rev().find(|l| !l.trim().is_empty()).map(|l| l.trim().to_string())
}
