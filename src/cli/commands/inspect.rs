//! Inspect command - diagnostic view of a provenance attestation

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::cli::app::InspectArgs;
use provcheck::attestation;
use provcheck::checksum;
use provcheck::output::{InspectReport, OutputMode, SubjectReport};

/// Inspect an attestation: statement, subjects, builder; optionally extract
/// the bare envelope and certificate, or cross-check a local artifact digest.
pub fn inspect(args: &InspectArgs, mode: OutputMode) -> anyhow::Result<()> {
    let loaded = attestation::load(&args.provenance)?;
    let statement = loaded.envelope.decode_statement()?;
    let version = statement.slsa_version()?;

    let artifact_sha256 = match &args.artifact {
        Some(path) => Some(
            checksum::sha256_file(path)
                .with_context(|| format!("could not hash {}", path.display()))?,
        ),
        None => None,
    };
    let digest_match =
        artifact_sha256.as_ref().map(|d| statement.subject_with_sha256(d).is_some());

    let mut envelope_out = None;
    let mut certificate_out = None;
    if args.extract {
        let out = args.output.clone().unwrap_or_else(|| default_envelope_out(&args.provenance));
        attestation::write_envelope(&loaded.envelope, &out)?;
        envelope_out = Some(out.display().to_string());

        if let Some(pem) = loaded
            .verification_material
            .as_ref()
            .and_then(attestation::certificate_pem)
        {
            let cert_path = out.with_extension("crt");
            std::fs::write(&cert_path, pem)
                .with_context(|| format!("could not write {}", cert_path.display()))?;
            certificate_out = Some(cert_path.display().to_string());
        }
    }

    let report = InspectReport {
        file: args.provenance.display().to_string(),
        payload_type: loaded.envelope.payload_type.clone(),
        predicate_type: statement.predicate_type.clone(),
        slsa_version: version.to_string(),
        builder_id: statement.builder_id(),
        signatures: loaded.envelope.signatures.len(),
        subjects: statement
            .subject
            .iter()
            .map(|s| SubjectReport { name: s.name.clone(), sha256: s.digest.get("sha256").cloned() })
            .collect(),
        artifact_sha256,
        digest_match,
        envelope_out,
        certificate_out,
    };
    report.render(mode);

    if digest_match == Some(false) {
        anyhow::bail!("artifact digest does not match any attested subject");
    }
    Ok(())
}

/// Default output path for the extracted envelope: `<base>.intoto.jsonl`
/// next to the input, dodging the input file itself.
fn default_envelope_out(input: &Path) -> PathBuf {
    let name = input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let base = name.split('.').next().unwrap_or("attestation");
    let parent = input.parent().unwrap_or_else(|| Path::new("."));

    let candidate = parent.join(format!("{base}.intoto.jsonl"));
    if candidate == input {
        parent.join(format!("{base}.extracted.intoto.jsonl"))
    } else {
        candidate
    }
}
