//! Detect command - report the project type and its defaults

use crate::cli::app::DetectArgs;
use provcheck::detect::{self, Probe};
use provcheck::output::{DetectReport, OutputMode};
use provcheck::runner::SystemRunner;

/// Detect the project type of a directory or remote reference
pub fn detect(args: &DetectArgs, mode: OutputMode) -> anyhow::Result<()> {
    let runner = SystemRunner;

    let detection = match (&args.repo, &args.tag) {
        (Some(repo), Some(tag)) => detect::resolve(
            args.artifact_type.resolved(),
            Probe::Remote { repo, reference: tag },
            &runner,
        ),
        _ => detect::resolve(args.artifact_type.resolved(), Probe::Local(&args.dir), &runner),
    };

    DetectReport::new(detection).render(mode);
    Ok(())
}
