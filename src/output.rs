//! Output formatting for human and JSON modes
//!
//! This module provides structured output that can be rendered either as
//! human-readable text or machine-parseable JSON.

use colored::Colorize;
use serde::Serialize;

use crate::detect::{Detection, DetectionSource, ProjectType};
use crate::dispatch::{VerifyRequest, VerifySummary};
use crate::refspec::RefKind;

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// Result of a detection operation
#[derive(Debug, Serialize)]
pub struct DetectReport {
    /// The resolved project-type label
    pub label: ProjectType,
    /// How it was resolved
    pub source: DetectionSource,
    /// Default setup command for the label
    pub setup_command: String,
    /// Default build command for the label
    pub build_command: String,
    /// Artifact pattern associated with the label
    pub artifact_glob: String,
    /// Artifact root directory associated with the label
    pub artifact_dir: String,
}

impl DetectReport {
    /// Build a report from a detection.
    #[must_use]
    pub fn new(detection: Detection) -> Self {
        let defaults = detection.label.defaults();
        Self {
            label: detection.label,
            source: detection.source,
            setup_command: defaults.setup_command.to_string(),
            build_command: defaults.build_command.to_string(),
            artifact_glob: defaults.artifact_glob.to_string(),
            artifact_dir: defaults.artifact_dir.to_string(),
        }
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => render_json(self),
        }
    }

    fn render_human(&self) {
        println!("Project type: {} ({:?} detection)", self.label.to_string().bold(), self.source);
        if !self.setup_command.is_empty() {
            println!("  setup:     {}", self.setup_command);
        }
        if !self.build_command.is_empty() {
            println!("  build:     {}", self.build_command);
        }
        println!("  artifacts: {} (in {})", self.artifact_glob, self.artifact_dir);
    }
}

/// Per-artifact entry of a verification report
#[derive(Debug, Serialize)]
pub struct ArtifactReport {
    /// Artifact file path
    pub file: String,
    /// sha256 digest, when it could be computed
    pub sha256: Option<String>,
    /// Did this artifact verify?
    pub passed: bool,
    /// Last line of verifier output
    pub detail: String,
}

/// Result of a verification run
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    /// Repository slug
    pub repo: String,
    /// Reference name verified against
    pub reference: String,
    /// Whether the reference was treated as tag or branch
    pub ref_kind: RefKind,
    /// Resolved project type
    pub project_type: ProjectType,
    /// How the project type was resolved
    pub detection_source: DetectionSource,
    /// Provenance file used
    pub provenance: String,
    /// All-or-nothing aggregate
    pub passed: bool,
    /// Artifacts that verified
    pub verified: usize,
    /// Artifacts dispatched
    pub total: usize,
    /// Per-artifact outcomes
    pub artifacts: Vec<ArtifactReport>,
    /// Report timestamp (RFC 3339)
    pub generated_at: String,
}

impl VerifyReport {
    /// Build a report from a request, its detection, and the dispatch summary.
    #[must_use]
    pub fn new(request: &VerifyRequest, detection: Detection, summary: &VerifySummary) -> Self {
        Self {
            repo: request.repo.clone(),
            reference: request.reference.name.clone(),
            ref_kind: request.reference.kind,
            project_type: detection.label,
            detection_source: detection.source,
            provenance: request.provenance.display().to_string(),
            passed: summary.all_passed(),
            verified: summary.verified(),
            total: summary.total(),
            artifacts: summary
                .outcomes
                .iter()
                .map(|o| ArtifactReport {
                    file: o.path.display().to_string(),
                    sha256: o.sha256.clone(),
                    passed: o.passed,
                    detail: o.detail.clone(),
                })
                .collect(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => render_json(self),
        }
    }

    fn render_human(&self) {
        println!(
            "Verifying {} artifact(s) from {}@{} ({})\n  provenance: {}\n",
            self.total, self.repo, self.reference, self.ref_kind, self.provenance
        );

        for artifact in &self.artifacts {
            let mark = if artifact.passed { "PASS".green() } else { "FAIL".red() };
            println!("  [{mark}] {}", artifact.file);
            if let Some(digest) = &artifact.sha256 {
                println!("         sha256: {digest}");
            }
            if !artifact.passed && !artifact.detail.is_empty() {
                println!("         {}", artifact.detail);
            }
        }

        println!();
        if self.passed {
            println!("{}", format!("All {} artifact(s) verified.", self.total).green().bold());
        } else {
            println!(
                "{}",
                format!("FAILED: {}/{} artifact(s) verified.", self.verified, self.total)
                    .red()
                    .bold()
            );
        }
    }
}

/// Subject entry of an inspection report
#[derive(Debug, Serialize)]
pub struct SubjectReport {
    /// Attested artifact name
    pub name: String,
    /// Attested sha256 digest
    pub sha256: Option<String>,
}

/// Result of an inspect operation
#[derive(Debug, Serialize)]
pub struct InspectReport {
    /// The attestation file inspected
    pub file: String,
    /// DSSE payload media type
    pub payload_type: String,
    /// Predicate type URI
    pub predicate_type: String,
    /// SLSA provenance version
    pub slsa_version: String,
    /// Builder identity, when present
    pub builder_id: Option<String>,
    /// Number of signatures on the envelope
    pub signatures: usize,
    /// Attested subjects
    pub subjects: Vec<SubjectReport>,
    /// Digest of the local artifact compared against the subjects
    pub artifact_sha256: Option<String>,
    /// Did the local artifact match a subject?
    pub digest_match: Option<bool>,
    /// Path the bare envelope was written to, when extracting
    pub envelope_out: Option<String>,
    /// Path the certificate was written to, when present
    pub certificate_out: Option<String>,
}

impl InspectReport {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => render_json(self),
        }
    }

    fn render_human(&self) {
        println!("Attestation: {}", self.file);
        println!("  payload type:   {}", self.payload_type);
        println!("  predicate:      {} (SLSA {})", self.predicate_type, self.slsa_version);
        if let Some(builder) = &self.builder_id {
            println!("  builder:        {builder}");
        }
        println!("  signatures:     {}", self.signatures);

        println!("  subjects:");
        for subject in &self.subjects {
            println!(
                "    {}  {}",
                subject.sha256.as_deref().unwrap_or("<no sha256>"),
                subject.name
            );
        }

        if let Some(digest) = &self.artifact_sha256 {
            match self.digest_match {
                Some(true) => println!("  artifact match: {} ({digest})", "yes".green()),
                _ => println!("  artifact match: {} ({digest})", "no".red()),
            }
        }
        if let Some(out) = &self.envelope_out {
            println!("  envelope written to {out}");
        }
        if let Some(out) = &self.certificate_out {
            println!("  certificate written to {out}");
        }
    }
}

fn render_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}
