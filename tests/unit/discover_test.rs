//! Tests for workflow-run and artifact discovery

use provcheck::config::Config;
use provcheck::detect::ProjectType;
use provcheck::discover::{self, DiscoverError};
use provcheck::refspec::{GitRef, RefKind};

use crate::common::{MockRunner, dir_with, write_file};

fn tag(name: &str) -> GitRef {
    GitRef { name: name.to_string(), kind: RefKind::Tag }
}

// =============================================================================
// Provenance location
// =============================================================================

#[test]
fn finds_nested_provenance() {
    let dir = dir_with(&["zobra-provenance/zobra.intoto.jsonl", "zobra-dist/zobra.tar.gz"]);
    let found = discover::find_provenance(dir.path()).unwrap();
    assert!(found.ends_with("zobra-provenance/zobra.intoto.jsonl"));
}

#[test]
fn multiple_provenance_files_take_first_sorted() {
    let dir = dir_with(&["b.intoto.jsonl", "a.intoto.jsonl"]);
    let found = discover::find_provenance(dir.path()).unwrap();
    assert!(found.ends_with("a.intoto.jsonl"));
}

#[test]
fn missing_provenance_is_an_error() {
    let dir = dir_with(&["zobra.tar.gz", "README.md"]);
    let err = discover::find_provenance(dir.path()).unwrap_err();
    assert!(matches!(err, DiscoverError::MissingProvenance(_)));
}

// =============================================================================
// Artifact matching
// =============================================================================

#[test]
fn python_matches_wheels_and_sdists() {
    let dir = dir_with(&[
        "dist/zobra-0.1.0-py3-none-any.whl",
        "dist/zobra-0.1.0.tar.gz",
        "zobra.intoto.jsonl",
        "README.md",
    ]);
    let found = discover::find_artifacts(dir.path(), ProjectType::Python, "acme/zobra").unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|p| {
        let n = p.file_name().unwrap().to_string_lossy().into_owned();
        n.ends_with(".whl") || n.ends_with(".tar.gz")
    }));
}

#[test]
fn go_matches_binary_name_prefix() {
    let dir = dir_with(&["zobra-linux-amd64", "zobra-darwin-arm64", "other-tool", "zobra.intoto.jsonl"]);
    let found = discover::find_artifacts(dir.path(), ProjectType::Go, "acme/zobra").unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|p| p.file_name().unwrap().to_string_lossy().starts_with("zobra")));
}

#[test]
fn nodejs_matches_tarballs() {
    let dir = dir_with(&["zobra-0.1.0.tgz", "zobra-0.1.0.tar.gz", "zobra.intoto.jsonl"]);
    let found = discover::find_artifacts(dir.path(), ProjectType::Nodejs, "acme/zobra").unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].ends_with("zobra-0.1.0.tgz"));
}

#[test]
fn generic_excludes_known_non_artifacts() {
    let dir = dir_with(&[
        "zobra.bin",
        "zobra.intoto.jsonl",
        "README.md",
        "notes.txt",
        "metadata.json",
        "checksums.sha256",
        ".hidden",
    ]);
    let found = discover::find_artifacts(dir.path(), ProjectType::Generic, "acme/zobra").unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].ends_with("zobra.bin"));
}

#[test]
fn zero_matched_artifacts_is_an_error() {
    let dir = dir_with(&["zobra.intoto.jsonl", "README.md"]);
    let err =
        discover::find_artifacts(dir.path(), ProjectType::Python, "acme/zobra").unwrap_err();
    assert!(matches!(err, DiscoverError::NoArtifacts(ProjectType::Python)));
}

#[test]
fn patterns_per_type() {
    assert_eq!(discover::artifact_patterns(ProjectType::Go, "acme/zobra"), vec!["zobra*"]);
    assert_eq!(
        discover::artifact_patterns(ProjectType::Python, "acme/zobra"),
        vec!["*.whl", "*.tar.gz"]
    );
    assert_eq!(discover::artifact_patterns(ProjectType::Nodejs, "acme/zobra"), vec!["*.tgz"]);
    assert_eq!(discover::artifact_patterns(ProjectType::Generic, "acme/zobra"), vec!["*"]);
}

// =============================================================================
// Run selection
// =============================================================================

#[test]
fn first_candidate_with_a_run_wins() {
    let runner = MockRunner::new();
    runner.push_success(r#"[{"databaseId": 42}]"#);

    let run = discover::find_run(
        &runner,
        &Config::default(),
        "acme/zobra",
        &tag("v1.0.0"),
        ProjectType::Go,
    )
    .unwrap();

    assert_eq!(run.id, 42);
    assert_eq!(run.workflow, "SLSA Go Release");
    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("--workflow SLSA Go Release"));
    assert!(calls[0].contains("--status success"));
    assert!(calls[0].contains("--branch v1.0.0"));
}

#[test]
fn candidates_fall_through_to_the_generic_generator() {
    let runner = MockRunner::new();
    runner.push_success("[]");
    runner.push_failure(1, "could not find any workflows named Go Release");
    runner.push_success(r#"[{"databaseId": 7}]"#);

    let run = discover::find_run(
        &runner,
        &Config::default(),
        "acme/zobra",
        &tag("v1.0.0"),
        ProjectType::Go,
    )
    .unwrap();

    assert_eq!(run.id, 7);
    assert_eq!(run.workflow, "SLSA Generic Generator");
    assert_eq!(runner.calls().len(), 3);
}

#[test]
fn no_matching_run_anywhere_is_an_error() {
    let runner = MockRunner::new();
    runner.push_success("[]");
    runner.push_success("[]");
    runner.push_success("[]");

    let err = discover::find_run(
        &runner,
        &Config::default(),
        "acme/zobra",
        &tag("v9.9.9"),
        ProjectType::Go,
    )
    .unwrap_err();

    assert!(matches!(err, DiscoverError::NoRun { .. }));
}

// =============================================================================
// Download
// =============================================================================

#[test]
fn download_invokes_gh_with_run_id() {
    let dir = dir_with(&[]);
    let runner = MockRunner::new();
    runner.push_success("");

    let run = discover::WorkflowRun { id: 42, workflow: "SLSA Go Release".to_string() };
    discover::download_artifacts(&runner, &Config::default(), "acme/zobra", &run, dir.path())
        .unwrap();

    let calls = runner.calls();
    assert!(calls[0].starts_with("gh run download 42 --repo acme/zobra --dir"));
}

#[test]
fn failed_download_is_an_error() {
    let dir = dir_with(&[]);
    let runner = MockRunner::new();
    runner.push_failure(1, "HTTP 404: Not Found");

    let run = discover::WorkflowRun { id: 42, workflow: "SLSA Go Release".to_string() };
    let err =
        discover::download_artifacts(&runner, &Config::default(), "acme/zobra", &run, dir.path())
            .unwrap_err();

    assert!(err.to_string().contains("HTTP 404"));
}
