//! Project-type detection
//!
//! Maps a source tree to one of four labels by probing for marker files in a
//! fixed priority order: `go.mod` wins over the Python manifests
//! (`pyproject.toml`, `setup.py`, `setup.cfg`), which win over `package.json`,
//! with `generic` as the catch-all. Detection is total and fails open: a
//! remote snapshot that cannot be fetched degrades to `generic` with a
//! warning, never an error. An explicit label from the caller short-circuits
//! probing entirely.

use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};
use serde::Serialize;
use tempfile::TempDir;
use thiserror::Error;

use crate::runner::{CommandRunner, RunnerError};

/// Errors fetching a remote snapshot for detection.
///
/// These never escape [`resolve`]; they exist so the fail-open warning can
/// say what actually went wrong.
#[derive(Debug, Error)]
pub enum DetectError {
    /// Could not create the temporary checkout directory
    #[error("could not create temporary directory: {0}")]
    Io(#[from] io::Error),

    /// `git` itself could not be launched
    #[error(transparent)]
    Runner(#[from] RunnerError),

    /// The shallow clone exited non-zero
    #[error("shallow clone of {repo}@{reference} failed: {detail}")]
    CloneFailed {
        /// Repository slug
        repo: String,
        /// Requested reference
        reference: String,
        /// Trailing stderr from git
        detail: String,
    },
}

/// Project-type label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    /// Go module (`go.mod`)
    Go,
    /// Python project (`pyproject.toml`, `setup.py`, or `setup.cfg`)
    Python,
    /// Node package (`package.json`)
    Nodejs,
    /// Anything else
    Generic,
}

/// Default build/verify parameters associated with a label
#[derive(Debug, Clone, Copy)]
pub struct ProjectDefaults {
    /// Command that prepares the build environment
    pub setup_command: &'static str,
    /// Command that produces the release artifacts
    pub build_command: &'static str,
    /// Human-readable artifact pattern (matching lives in `discover`)
    pub artifact_glob: &'static str,
    /// Directory the build drops artifacts into
    pub artifact_dir: &'static str,
}

impl ProjectType {
    /// Default parameters for this label
    #[must_use]
    pub const fn defaults(self) -> ProjectDefaults {
        match self {
            Self::Go => ProjectDefaults {
                setup_command: "go mod download",
                build_command: "go build ./...",
                artifact_glob: "<binary-name>*",
                artifact_dir: ".",
            },
            Self::Python => ProjectDefaults {
                setup_command: "python -m pip install build",
                build_command: "python -m build",
                artifact_glob: "*.whl *.tar.gz",
                artifact_dir: "dist",
            },
            Self::Nodejs => ProjectDefaults {
                setup_command: "npm ci",
                build_command: "npm pack",
                artifact_glob: "*.tgz",
                artifact_dir: ".",
            },
            Self::Generic => ProjectDefaults {
                setup_command: "",
                build_command: "",
                artifact_glob: "*",
                artifact_dir: ".",
            },
        }
    }

    /// Workflow-name candidates for this label, most specific first.
    ///
    /// The artifact-type-agnostic generator is always the last resort.
    #[must_use]
    pub const fn workflow_candidates(self) -> &'static [&'static str] {
        match self {
            Self::Go => &["SLSA Go Release", "Go Release", "SLSA Generic Generator"],
            Self::Python => &["SLSA Python Release", "Python Release", "SLSA Generic Generator"],
            Self::Nodejs => &["SLSA Node Release", "Node Release", "SLSA Generic Generator"],
            Self::Generic => &["SLSA Generic Generator", "Release"],
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Go => write!(f, "go"),
            Self::Python => write!(f, "python"),
            Self::Nodejs => write!(f, "nodejs"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

impl FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "go" => Ok(Self::Go),
            "python" => Ok(Self::Python),
            "nodejs" => Ok(Self::Nodejs),
            "generic" => Ok(Self::Generic),
            other => Err(format!(
                "unknown artifact type: {other} (expected auto, go, python, nodejs, or generic)"
            )),
        }
    }
}

/// One detection rule: marker files implying a label
struct TypeRule {
    label: ProjectType,
    markers: &'static [&'static str],
}

/// Ordered rule table; evaluated until first match, `generic` is implicit.
const RULES: &[TypeRule] = &[
    TypeRule { label: ProjectType::Go, markers: &["go.mod"] },
    TypeRule { label: ProjectType::Python, markers: &["pyproject.toml", "setup.py", "setup.cfg"] },
    TypeRule { label: ProjectType::Nodejs, markers: &["package.json"] },
];

/// How a label was arrived at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionSource {
    /// Caller supplied the label; nothing was probed
    Explicit,
    /// Marker files in a local directory
    Local,
    /// Marker files in a shallow remote snapshot
    Remote,
    /// Remote snapshot could not be fetched; degraded to generic
    Fallback,
}

/// A resolved label plus where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Detection {
    /// The resolved label
    pub label: ProjectType,
    /// How it was resolved
    pub source: DetectionSource,
}

/// Where to probe for marker files
#[derive(Debug, Clone, Copy)]
pub enum Probe<'a> {
    /// A directory on disk (the live working tree)
    Local(&'a Path),
    /// A shallow checkout of a reference fetched on demand
    Remote {
        /// Repository slug (`owner/name`)
        repo: &'a str,
        /// Tag or branch to snapshot
        reference: &'a str,
    },
}

/// Probe a directory for marker files. Total: always returns a label.
#[must_use]
pub fn detect_dir(dir: &Path) -> ProjectType {
    for rule in RULES {
        for marker in rule.markers {
            if dir.join(marker).is_file() {
                debug!("detected {} ({} present)", rule.label, marker);
                return rule.label;
            }
        }
    }
    ProjectType::Generic
}

/// Resolve a label from an optional explicit request and a probe target.
///
/// Never fails: an unreachable remote degrades to `generic` with a warning.
pub fn resolve(
    requested: Option<ProjectType>,
    probe: Probe<'_>,
    runner: &dyn CommandRunner,
) -> Detection {
    if let Some(label) = requested {
        return Detection { label, source: DetectionSource::Explicit };
    }

    match probe {
        Probe::Local(dir) => {
            Detection { label: detect_dir(dir), source: DetectionSource::Local }
        }
        Probe::Remote { repo, reference } => match remote_snapshot(runner, repo, reference) {
            Ok(snapshot) => Detection {
                label: detect_dir(snapshot.path()),
                source: DetectionSource::Remote,
            },
            Err(err) => {
                warn!("could not inspect {repo}@{reference}: {err}; assuming generic");
                Detection { label: ProjectType::Generic, source: DetectionSource::Fallback }
            }
        },
    }
}

/// Shallow-clone `repo` at `reference` into a self-deleting temp directory.
fn remote_snapshot(
    runner: &dyn CommandRunner,
    repo: &str,
    reference: &str,
) -> Result<TempDir, DetectError> {
    let dir = tempfile::tempdir()?;
    let url = format!("https://github.com/{repo}.git");
    let dest = dir.path().to_string_lossy().into_owned();

    let out = runner.run(
        "git",
        &["clone", "--quiet", "--depth", "1", "--branch", reference, &url, &dest],
        None,
    )?;

    if out.success() {
        Ok(dir)
    } else {
        Err(DetectError::CloneFailed {
            repo: repo.to_string(),
            reference: reference.to_string(),
            detail: out.stderr.lines().last().unwrap_or("no output").to_string(),
        })
    }
}
