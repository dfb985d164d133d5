//! Tool and workflow configuration
//!
//! One explicit `Config` value is built at startup and threaded through every
//! stage; nothing reads ambient state after that. Defaults can be overridden
//! by a `.provcheck.toml` in the working directory:
//!
//! ```toml
//! [tools]
//! gh = "/opt/gh/bin/gh"
//! slsa-verifier = "slsa-verifier-v2.6.0"
//!
//! [workflows]
//! go = ["Custom Go Release", "SLSA Generic Generator"]
//! ```
//!
//! Environment variables `PROVCHECK_GH_BIN` and `PROVCHECK_VERIFIER_BIN`
//! override both. Loading is lenient: a missing or malformed file means
//! defaults.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::detect::ProjectType;

/// Config file name, looked up in the working directory
pub const CONFIG_FILE: &str = ".provcheck.toml";

/// Environment override for the `gh` binary
pub const GH_BIN_ENV: &str = "PROVCHECK_GH_BIN";

/// Environment override for the `slsa-verifier` binary
pub const VERIFIER_BIN_ENV: &str = "PROVCHECK_VERIFIER_BIN";

/// Paths of the external tools provcheck drives
#[derive(Debug, Clone)]
pub struct ToolPaths {
    /// The GitHub CLI
    pub gh: String,
    /// The provenance verifier CLI
    pub verifier: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self { gh: "gh".to_string(), verifier: "slsa-verifier".to_string() }
    }
}

/// Raw `.provcheck.toml` shape
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    tools: ToolsSection,
    #[serde(default)]
    workflows: WorkflowsSection,
}

#[derive(Debug, Default, Deserialize)]
struct ToolsSection {
    gh: Option<String>,
    #[serde(rename = "slsa-verifier")]
    slsa_verifier: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct WorkflowsSection {
    go: Option<Vec<String>>,
    python: Option<Vec<String>>,
    nodejs: Option<Vec<String>>,
    generic: Option<Vec<String>>,
}

/// Resolved configuration, threaded explicitly through every stage
#[derive(Debug, Clone)]
pub struct Config {
    /// External tool paths
    pub tools: ToolPaths,
    workflows: WorkflowsSection,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(FileConfig::default())
    }
}

impl Config {
    /// Load from `.provcheck.toml` in the working directory, or defaults.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(Path::new("."))
    }

    /// Load from `.provcheck.toml` in `dir`, or defaults.
    #[must_use]
    pub fn load_from(dir: &Path) -> Self {
        let file = fs::read_to_string(dir.join(CONFIG_FILE))
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default();
        Self::from_file(file)
    }

    fn from_file(file: FileConfig) -> Self {
        let gh = env::var(GH_BIN_ENV)
            .ok()
            .or(file.tools.gh)
            .unwrap_or_else(|| "gh".to_string());
        let verifier = env::var(VERIFIER_BIN_ENV)
            .ok()
            .or(file.tools.slsa_verifier)
            .unwrap_or_else(|| "slsa-verifier".to_string());

        Self { tools: ToolPaths { gh, verifier }, workflows: file.workflows }
    }

    /// Workflow-name candidates for a label, most specific first.
    #[must_use]
    pub fn workflow_candidates(&self, label: ProjectType) -> Vec<String> {
        let overridden = match label {
            ProjectType::Go => &self.workflows.go,
            ProjectType::Python => &self.workflows.python,
            ProjectType::Nodejs => &self.workflows.nodejs,
            ProjectType::Generic => &self.workflows.generic,
        };
        overridden.clone().unwrap_or_else(|| {
            label.workflow_candidates().iter().map(ToString::to_string).collect()
        })
    }
}
