//! Verify command - download, match, and verify artifacts against provenance

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::cli::app::VerifyArgs;
use provcheck::config::Config;
use provcheck::detect::{self, Detection, DetectionSource, Probe, ProjectType};
use provcheck::discover;
use provcheck::dispatch::{self, VerifyRequest};
use provcheck::output::{OutputMode, VerifyReport};
use provcheck::refspec::GitRef;
use provcheck::repo;
use provcheck::runner::SystemRunner;

/// Verify release artifacts for a reference
pub fn verify(args: &VerifyArgs, mode: OutputMode) -> anyhow::Result<()> {
    let cfg = Config::load();
    let runner = SystemRunner;

    if args.verify_only && (args.artifact_path.is_none() || args.provenance_path.is_none()) {
        anyhow::bail!("--verify-only requires --artifact-path and --provenance-path");
    }

    let repo = args
        .repo
        .clone()
        .or_else(repo::infer_slug)
        .context("no repository given and none inferred from the origin remote (use --repo)")?;

    let reference = GitRef::resolve(&args.reference, args.ref_kind.resolved(), &args.source_branch);

    // Verify-only mode never probes anything; without an explicit type the
    // label is irrelevant and defaults to generic.
    let detection = if args.verify_only {
        Detection {
            label: args.artifact_type.resolved().unwrap_or(ProjectType::Generic),
            source: DetectionSource::Explicit,
        }
    } else if args.no_download {
        detect::resolve(args.artifact_type.resolved(), Probe::Local(Path::new(".")), &runner)
    } else {
        detect::resolve(
            args.artifact_type.resolved(),
            Probe::Remote { repo: &repo, reference: &args.reference },
            &runner,
        )
    };

    let workdir = Path::new(".");
    if !args.verify_only && !args.no_download {
        let run = discover::find_run(&runner, &cfg, &repo, &reference, detection.label)?;
        discover::download_artifacts(&runner, &cfg, &repo, &run, workdir)?;
    }

    let provenance = match &args.provenance_path {
        Some(path) => path.clone(),
        None => discover::find_provenance(workdir)?,
    };
    let artifacts: Vec<PathBuf> = match &args.artifact_path {
        Some(path) => vec![path.clone()],
        None => discover::find_artifacts(workdir, detection.label, &repo)?,
    };

    let request = VerifyRequest { repo, reference, provenance, artifacts };
    let summary = dispatch::run(&runner, &cfg.tools, &request)?;

    let report = VerifyReport::new(&request, detection, &summary);
    report.render(mode);

    if !summary.all_passed() {
        anyhow::bail!(
            "{} of {} artifact(s) failed verification",
            summary.total() - summary.verified(),
            summary.total()
        );
    }
    Ok(())
}
