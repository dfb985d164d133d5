//! CLI definitions and entry point

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use super::commands;
use provcheck::detect::ProjectType;
use provcheck::output::OutputMode;
use provcheck::refspec::RefKind;

/// provcheck - verify SLSA build provenance for release artifacts
#[derive(Parser, Debug)]
#[command(
    name = "provcheck",
    version,
    about = "Verify SLSA build provenance for GitHub release artifacts",
    long_about = "Verify SLSA build provenance for GitHub release artifacts.\n\n\
                  Detects the project type, finds the provenance-generating\n\
                  workflow run for a tag or branch, downloads its artifacts,\n\
                  and drives slsa-verifier once per artifact. Verification is\n\
                  all-or-nothing: one failing artifact fails the run."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download release artifacts and verify them against their provenance
    Verify(VerifyArgs),

    /// Detect the project type of a directory or a remote reference
    Detect(DetectArgs),

    /// Inspect a provenance attestation (diagnostics; checks no signatures)
    Inspect(InspectArgs),

    /// Show version
    Version,
}

/// Arguments of `provcheck verify`
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Repository slug (owner/repo); inferred from the origin remote if omitted
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Tag or branch reference to verify
    #[arg(short = 't', long = "tag", value_name = "REF")]
    pub reference: String,

    /// Artifact type (auto = detect from the source tree)
    #[arg(short = 'a', long, value_enum, default_value = "auto")]
    pub artifact_type: TypeArg,

    /// Explicit artifact file (bypasses discovery)
    #[arg(short = 'p', long, value_name = "FILE")]
    pub artifact_path: Option<PathBuf>,

    /// Explicit provenance file (bypasses discovery)
    #[arg(short = 's', long, value_name = "FILE")]
    pub provenance_path: Option<PathBuf>,

    /// Branch verified against when the reference is not version-like
    #[arg(short = 'b', long, default_value = "main")]
    pub source_branch: String,

    /// Skip downloading; verify files already present locally
    #[arg(short = 'n', long)]
    pub no_download: bool,

    /// Verify-only mode: requires --artifact-path and --provenance-path; no CI calls
    #[arg(long)]
    pub verify_only: bool,

    /// How to interpret the reference (auto = classify by shape)
    #[arg(long, value_enum, default_value = "auto")]
    pub ref_kind: RefKindArg,
}

/// Arguments of `provcheck detect`
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Directory to inspect
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Inspect a remote repository instead (requires --tag)
    #[arg(short, long, requires = "tag")]
    pub repo: Option<String>,

    /// Reference to snapshot when inspecting remotely (requires --repo)
    #[arg(short, long, requires = "repo")]
    pub tag: Option<String>,

    /// Artifact type (non-auto skips inspection entirely)
    #[arg(short = 'a', long, value_enum, default_value = "auto")]
    pub artifact_type: TypeArg,
}

/// Arguments of `provcheck inspect`
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Attestation file (bare DSSE envelope or Sigstore bundle, JSONL)
    pub provenance: PathBuf,

    /// Compare this artifact's sha256 against the statement subjects
    #[arg(short = 'p', long, value_name = "FILE")]
    pub artifact: Option<PathBuf>,

    /// Write the bare DSSE envelope (and certificate, when present)
    #[arg(long)]
    pub extract: bool,

    /// Output path for the extracted envelope
    #[arg(short = 'o', long, requires = "extract", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Artifact type argument, `auto` meaning "detect"
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeArg {
    /// Detect from the source tree
    Auto,
    /// Go module
    Go,
    /// Python project
    Python,
    /// Node package
    Nodejs,
    /// Anything else
    Generic,
}

impl TypeArg {
    /// The explicit label, or `None` for auto.
    #[must_use]
    pub const fn resolved(self) -> Option<ProjectType> {
        match self {
            Self::Auto => None,
            Self::Go => Some(ProjectType::Go),
            Self::Python => Some(ProjectType::Python),
            Self::Nodejs => Some(ProjectType::Nodejs),
            Self::Generic => Some(ProjectType::Generic),
        }
    }
}

/// Reference kind argument, `auto` meaning "classify by shape"
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKindArg {
    /// Version-like names are tags, everything else is a branch
    Auto,
    /// The reference is a tag
    Tag,
    /// The reference is a branch
    Branch,
}

impl RefKindArg {
    /// The explicit kind, or `None` for auto.
    #[must_use]
    pub const fn resolved(self) -> Option<RefKind> {
        match self {
            Self::Auto => None,
            Self::Tag => Some(RefKind::Tag),
            Self::Branch => Some(RefKind::Branch),
        }
    }
}

/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match cli.command {
        Some(Command::Verify(args)) => commands::verify(&args, output_mode),
        Some(Command::Detect(args)) => commands::detect(&args, output_mode),
        Some(Command::Inspect(args)) => commands::inspect(&args, output_mode),
        Some(Command::Version) => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION")
                    })
                );
            } else {
                println!("provcheck v{}", env!("CARGO_PKG_VERSION"));
            }
            Ok(())
        }
        None => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "hint": "Use --help for usage"
                    })
                );
            } else {
                println!("provcheck v{}", env!("CARGO_PKG_VERSION"));
                println!("Verify SLSA build provenance for GitHub release artifacts");
                println!("\nUse --help for usage.");
            }
            Ok(())
        }
    }
}
