//! Workflow-run and artifact discovery
//!
//! Finds the most recent successful provenance-generating run for a
//! reference, downloads its artifacts through the `gh` CLI, and locates the
//! provenance and artifact files by name. Unlike detection, everything here
//! fails closed: no matching run, a failed download, a missing provenance
//! file, or zero matched artifacts all abort the verification.

use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::Config;
use crate::detect::ProjectType;
use crate::refspec::GitRef;
use crate::runner::{CommandRunner, RunnerError};

/// Suffix identifying a provenance file among downloaded artifacts
pub const PROVENANCE_SUFFIX: &str = ".intoto.jsonl";

/// File name suffixes that are never release artifacts (generic fallback)
const NON_ARTIFACT_SUFFIXES: &[&str] = &[
    PROVENANCE_SUFFIX,
    ".md",
    ".txt",
    ".json",
    ".jsonl",
    ".sig",
    ".pem",
    ".crt",
    ".sha256",
    ".yml",
    ".yaml",
];

/// Errors during discovery; all of them abort the run
#[derive(Debug, Error)]
pub enum DiscoverError {
    /// No successful run of any candidate workflow matched the reference
    #[error("no successful workflow run found for {reference} in {repo}")]
    NoRun {
        /// Repository slug
        repo: String,
        /// Requested reference
        reference: String,
    },

    /// `gh run download` exited non-zero
    #[error("artifact download failed: {0}")]
    Download(String),

    /// `gh` printed something that is not the expected JSON
    #[error("unexpected output from gh: {0}")]
    Malformed(#[from] serde_json::Error),

    /// No file matching [`PROVENANCE_SUFFIX`] was found
    #[error("no provenance file (*{PROVENANCE_SUFFIX}) found under {0}")]
    MissingProvenance(PathBuf),

    /// No artifact file matched the patterns for the project type
    #[error("no artifact files matched for project type {0}")]
    NoArtifacts(ProjectType),

    /// An external tool could not be launched
    #[error(transparent)]
    Runner(#[from] RunnerError),

    /// Filesystem error while scanning for files
    #[error("could not scan for artifacts: {0}")]
    Io(#[from] io::Error),

    /// A constructed artifact pattern was invalid
    #[error("invalid artifact pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// A workflow run selected for artifact download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRun {
    /// The run's database id (what `gh run download` takes)
    pub id: u64,
    /// The workflow name the run belongs to
    pub workflow: String,
}

#[derive(Debug, Deserialize)]
struct RunRow {
    #[serde(rename = "databaseId")]
    database_id: u64,
}

/// Find the most recent successful run for the reference.
///
/// Candidate workflows are tried in order, most type-specific first; the
/// first workflow with a matching successful run wins. A `gh` failure for one
/// candidate (e.g. the workflow does not exist) moves on to the next.
pub fn find_run(
    runner: &dyn CommandRunner,
    cfg: &Config,
    repo: &str,
    reference: &GitRef,
    label: ProjectType,
) -> Result<WorkflowRun, DiscoverError> {
    for workflow in cfg.workflow_candidates(label) {
        let out = runner.run(
            &cfg.tools.gh,
            &[
                "run",
                "list",
                "--repo",
                repo,
                "--workflow",
                workflow.as_str(),
                "--status",
                "success",
                "--branch",
                reference.name.as_str(),
                "--limit",
                "1",
                "--json",
                "databaseId",
            ],
            None,
        )?;

        if !out.success() {
            debug!("no runs for workflow {workflow:?}: {}", out.stderr.trim());
            continue;
        }

        let rows: Vec<RunRow> = serde_json::from_str(out.stdout.trim())?;
        if let Some(row) = rows.first() {
            info!("using run {} of workflow {workflow:?}", row.database_id);
            return Ok(WorkflowRun { id: row.database_id, workflow });
        }
    }

    Err(DiscoverError::NoRun { repo: repo.to_string(), reference: reference.name.clone() })
}

/// Download all artifacts of a run into `dest`.
pub fn download_artifacts(
    runner: &dyn CommandRunner,
    cfg: &Config,
    repo: &str,
    run: &WorkflowRun,
    dest: &Path,
) -> Result<(), DiscoverError> {
    let id = run.id.to_string();
    let dest_str = dest.to_string_lossy().into_owned();
    let out = runner.run(
        &cfg.tools.gh,
        &["run", "download", id.as_str(), "--repo", repo, "--dir", dest_str.as_str()],
        None,
    )?;

    if out.success() {
        Ok(())
    } else {
        Err(DiscoverError::Download(
            out.stderr.lines().last().unwrap_or("gh run download failed").to_string(),
        ))
    }
}

/// Locate the provenance file under `dir` by its suffix.
///
/// Exactly one is expected; with several, the first (sorted) wins with a
/// warning. `gh run download` nests each artifact in its own subdirectory,
/// so the scan is recursive.
pub fn find_provenance(dir: &Path) -> Result<PathBuf, DiscoverError> {
    let mut found: Vec<PathBuf> = files_under(dir)?
        .into_iter()
        .filter(|p| file_name(p).ends_with(PROVENANCE_SUFFIX))
        .collect();
    found.sort();

    match found.len() {
        0 => Err(DiscoverError::MissingProvenance(dir.to_path_buf())),
        1 => Ok(found.remove(0)),
        n => {
            warn!("{n} provenance files found; using {}", found[0].display());
            Ok(found.remove(0))
        }
    }
}

/// File-name patterns identifying artifacts of a project type.
///
/// `repo` supplies the binary-name prefix for go builds.
#[must_use]
pub fn artifact_patterns(label: ProjectType, repo: &str) -> Vec<String> {
    match label {
        ProjectType::Go => {
            let binary = repo.rsplit('/').next().unwrap_or(repo);
            vec![format!("{binary}*")]
        }
        ProjectType::Python => vec!["*.whl".to_string(), "*.tar.gz".to_string()],
        ProjectType::Nodejs => vec!["*.tgz".to_string()],
        ProjectType::Generic => vec!["*".to_string()],
    }
}

/// Locate artifact files under `dir` for a project type.
///
/// Provenance files and, for the generic fallback, known non-artifact
/// suffixes are excluded. Zero matches is a hard error, never a vacuous
/// success.
pub fn find_artifacts(
    dir: &Path,
    label: ProjectType,
    repo: &str,
) -> Result<Vec<PathBuf>, DiscoverError> {
    let patterns = artifact_patterns(label, repo)
        .iter()
        .map(|p| Pattern::new(p))
        .collect::<Result<Vec<_>, _>>()?;

    let mut found: Vec<PathBuf> = files_under(dir)?
        .into_iter()
        .filter(|p| {
            let name = file_name(p);
            if name.starts_with('.') || name.ends_with(PROVENANCE_SUFFIX) {
                return false;
            }
            if label == ProjectType::Generic
                && NON_ARTIFACT_SUFFIXES.iter().any(|s| name.ends_with(s))
            {
                return false;
            }
            patterns.iter().any(|pat| pat.matches(&name))
        })
        .collect();
    found.sort();

    if found.is_empty() {
        return Err(DiscoverError::NoArtifacts(label));
    }
    Ok(found)
}

fn files_under(dir: &Path) -> Result<Vec<PathBuf>, DiscoverError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(3) {
        let entry = entry.map_err(|e| {
            DiscoverError::Io(e.into_io_error().unwrap_or_else(|| io::Error::other("walk error")))
        })?;
        // Skip hidden entries (.git and friends), judged relative to the root
        let rel = entry.path().strip_prefix(dir).unwrap_or_else(|_| entry.path());
        if rel.components().any(|c| {
            let name = c.as_os_str().to_string_lossy();
            name.starts_with('.') && name.len() > 1
        }) {
            continue;
        }
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}
