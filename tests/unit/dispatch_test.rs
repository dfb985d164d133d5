//! Tests for the verification dispatcher
//!
//! The dispatcher is all-or-nothing: one failing artifact among N fails the
//! run, and every prerequisite is checked before the verifier is invoked.

use std::path::PathBuf;

use provcheck::config::ToolPaths;
use provcheck::dispatch::{self, DispatchError, VerifyRequest};
use provcheck::refspec::{GitRef, RefKind};

use crate::common::{MockRunner, write_file};

fn request(provenance: PathBuf, artifacts: Vec<PathBuf>) -> VerifyRequest {
    VerifyRequest {
        repo: "acme/zobra".to_string(),
        reference: GitRef { name: "v1.0.0".to_string(), kind: RefKind::Tag },
        provenance,
        artifacts,
    }
}

#[test]
fn all_artifacts_passing_is_success() {
    let dir = tempfile::tempdir().unwrap();
    let prov = write_file(dir.path(), "zobra.intoto.jsonl", "{}");
    let a = write_file(dir.path(), "zobra-0.1.0.tar.gz", "a");
    let b = write_file(dir.path(), "zobra-0.1.0-py3-none-any.whl", "b");

    let runner = MockRunner::new();
    runner.push_success("PASSED: SLSA verification passed");
    runner.push_success("PASSED: SLSA verification passed");

    let summary =
        dispatch::run(&runner, &ToolPaths::default(), &request(prov, vec![a, b])).unwrap();

    assert!(summary.all_passed());
    assert_eq!(summary.verified(), 2);
    assert_eq!(summary.total(), 2);
    assert_eq!(runner.calls().len(), 2);
}

#[test]
fn one_failure_flips_the_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    let prov = write_file(dir.path(), "zobra.intoto.jsonl", "{}");
    let a = write_file(dir.path(), "a.tar.gz", "a");
    let b = write_file(dir.path(), "b.tar.gz", "b");
    let c = write_file(dir.path(), "c.tar.gz", "c");

    let runner = MockRunner::new();
    runner.push_success("PASSED");
    runner.push_failure(6, "FAILED: expected tag v1.0.0, got v0.9.0");
    runner.push_success("PASSED");

    let summary =
        dispatch::run(&runner, &ToolPaths::default(), &request(prov, vec![a, b, c])).unwrap();

    assert!(!summary.all_passed());
    assert_eq!(summary.verified(), 2);
    assert_eq!(summary.total(), 3);
    assert!(!summary.outcomes[1].passed);
    assert!(summary.outcomes[1].detail.contains("FAILED"));
    // Failure does not stop the remaining artifacts
    assert_eq!(runner.calls().len(), 3);
}

#[test]
fn zero_artifacts_is_a_hard_failure() {
    let dir = tempfile::tempdir().unwrap();
    let prov = write_file(dir.path(), "zobra.intoto.jsonl", "{}");

    let runner = MockRunner::new();
    let err = dispatch::run(&runner, &ToolPaths::default(), &request(prov, vec![])).unwrap_err();

    assert!(matches!(err, DispatchError::NoArtifacts));
    assert!(runner.calls().is_empty());
}

#[test]
fn missing_provenance_fails_before_any_invocation() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(dir.path(), "a.tar.gz", "a");
    let missing = dir.path().join("gone.intoto.jsonl");

    let runner = MockRunner::new();
    let err =
        dispatch::run(&runner, &ToolPaths::default(), &request(missing, vec![a])).unwrap_err();

    assert!(matches!(err, DispatchError::ProvenanceMissing(_)));
    assert!(runner.calls().is_empty());
}

#[test]
fn missing_artifact_fails_before_any_invocation() {
    let dir = tempfile::tempdir().unwrap();
    let prov = write_file(dir.path(), "zobra.intoto.jsonl", "{}");
    let missing = dir.path().join("gone.tar.gz");

    let runner = MockRunner::new();
    let err =
        dispatch::run(&runner, &ToolPaths::default(), &request(prov, vec![missing])).unwrap_err();

    assert!(matches!(err, DispatchError::ArtifactMissing(_)));
    assert!(runner.calls().is_empty());
}

#[test]
fn tag_references_use_source_tag() {
    let dir = tempfile::tempdir().unwrap();
    let prov = write_file(dir.path(), "zobra.intoto.jsonl", "{}");
    let a = write_file(dir.path(), "a.tar.gz", "a");

    let runner = MockRunner::new();
    runner.push_success("PASSED");
    dispatch::run(&runner, &ToolPaths::default(), &request(prov, vec![a])).unwrap();

    let call = &runner.calls()[0];
    assert!(call.starts_with("slsa-verifier verify-artifact"));
    assert!(call.contains("--source-uri github.com/acme/zobra"));
    assert!(call.contains("--source-tag v1.0.0"));
    assert!(!call.contains("--source-branch"));
}

#[test]
fn branch_references_use_source_branch() {
    let dir = tempfile::tempdir().unwrap();
    let prov = write_file(dir.path(), "zobra.intoto.jsonl", "{}");
    let a = write_file(dir.path(), "a.tar.gz", "a");

    let runner = MockRunner::new();
    runner.push_success("PASSED");
    let req = VerifyRequest {
        repo: "acme/zobra".to_string(),
        reference: GitRef { name: "main".to_string(), kind: RefKind::Branch },
        provenance: prov,
        artifacts: vec![a],
    };
    dispatch::run(&runner, &ToolPaths::default(), &req).unwrap();

    assert!(runner.calls()[0].contains("--source-branch main"));
}

#[test]
fn artifacts_are_verified_sequentially_in_request_order() {
    let dir = tempfile::tempdir().unwrap();
    let prov = write_file(dir.path(), "zobra.intoto.jsonl", "{}");
    let first = write_file(dir.path(), "first.tar.gz", "1");
    let second = write_file(dir.path(), "second.tar.gz", "2");

    let runner = MockRunner::new();
    runner.push_success("PASSED");
    runner.push_success("PASSED");
    dispatch::run(&runner, &ToolPaths::default(), &request(prov, vec![first, second])).unwrap();

    let calls = runner.calls();
    assert!(calls[0].contains("first.tar.gz"));
    assert!(calls[1].contains("second.tar.gz"));
}

#[test]
fn outcomes_carry_artifact_digests() {
    let dir = tempfile::tempdir().unwrap();
    let prov = write_file(dir.path(), "zobra.intoto.jsonl", "{}");
    let a = write_file(dir.path(), "a.txt", "hello\n");

    let runner = MockRunner::new();
    runner.push_success("PASSED");
    let summary =
        dispatch::run(&runner, &ToolPaths::default(), &request(prov, vec![a])).unwrap();

    assert_eq!(
        summary.outcomes[0].sha256.as_deref(),
        Some("5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03")
    );
}
