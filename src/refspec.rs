//! Git reference classification
//!
//! `slsa-verifier` takes either `--source-tag` or `--source-branch`, so every
//! reference we verify against must be pinned to one kind. The kind is an
//! explicit caller choice; when the caller asks for `auto` we fall back to a
//! shape heuristic: names starting with `v` + digit or a bare digit are
//! tag-like, everything else is branch-like. The heuristic can misclassify a
//! branch literally named like a version (`v2-wip`); callers who hit that pass
//! the kind explicitly.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Whether a git reference is a tag or a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    /// A release tag (verified with `--source-tag`)
    Tag,
    /// A branch head (verified with `--source-branch`)
    Branch,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag => write!(f, "tag"),
            Self::Branch => write!(f, "branch"),
        }
    }
}

impl FromStr for RefKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tag" => Ok(Self::Tag),
            "branch" => Ok(Self::Branch),
            other => Err(format!("unknown ref kind: {other} (expected tag or branch)")),
        }
    }
}

/// A git reference pinned to a kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitRef {
    /// The reference name (`v1.0.0`, `main`, ...)
    pub name: String,
    /// Tag or branch
    pub kind: RefKind,
}

impl GitRef {
    /// Pin a reference to a kind.
    ///
    /// An explicit `kind` always wins and keeps `name` as given. With `None`,
    /// version-like names classify as tags; everything else classifies as a
    /// branch whose name is taken from `fallback_branch` (the `-b` flag), not
    /// from `name` itself.
    #[must_use]
    pub fn resolve(name: &str, kind: Option<RefKind>, fallback_branch: &str) -> Self {
        match kind {
            Some(kind) => Self { name: name.to_string(), kind },
            None if version_like(name) => Self { name: name.to_string(), kind: RefKind::Tag },
            None => Self { name: fallback_branch.to_string(), kind: RefKind::Branch },
        }
    }
}

impl fmt::Display for GitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// Classify a reference name by shape: version-like means tag.
#[must_use]
pub fn classify(name: &str) -> RefKind {
    if version_like(name) {
        RefKind::Tag
    } else {
        RefKind::Branch
    }
}

/// Does the name look like a version string (`v1.0.0`, `2.3.1`)?
#[must_use]
pub fn version_like(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^v?[0-9]").expect("static pattern is valid"));
    re.is_match(name)
}
