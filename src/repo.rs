//! Repository identification
//!
//! When `--repo` is omitted we try the `origin` remote of the enclosing git
//! repository and derive the `owner/name` slug from its URL.

use log::debug;

/// Infer the `owner/name` slug from the current repository's `origin` remote.
#[must_use]
pub fn infer_slug() -> Option<String> {
    let repo = git2::Repository::discover(".").ok()?;
    let remote = repo.find_remote("origin").ok()?;
    let url = remote.url()?;
    let slug = slug_from_url(url);
    if let Some(slug) = &slug {
        debug!("inferred repository {slug} from origin remote");
    }
    slug
}

/// Extract `owner/name` from a GitHub remote URL (https, ssh, or scp-like).
#[must_use]
pub fn slug_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let rest = trimmed
        .strip_prefix("https://github.com/")
        .or_else(|| trimmed.strip_prefix("http://github.com/"))
        .or_else(|| trimmed.strip_prefix("ssh://git@github.com/"))
        .or_else(|| trimmed.strip_prefix("git@github.com:"))?;

    let mut parts = rest.split('/');
    let owner = parts.next()?;
    let name = parts.next()?;
    if owner.is_empty() || name.is_empty() || parts.next().is_some() {
        return None;
    }
    Some(format!("{owner}/{name}"))
}
