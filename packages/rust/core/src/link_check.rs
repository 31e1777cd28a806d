//! Link validation for rendered outlines.
//!
//! Generated links are absolute from the deployment root (Docsify style), not
//! from the scanned directory, so absolute targets may need a base prefix
//! before they resolve on disk.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use demoindex_discovery::{DiscoveryOptions, discover};
use demoindex_markdown::extract_links;
use demoindex_shared::{ProjectEntry, ValidationReport};

/// A link whose target does not exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    pub text: String,
    pub target: String,
    /// Where the target was looked for.
    pub resolved: PathBuf,
}

impl fmt::Display for BrokenLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' -> {}", self.text, self.target)
    }
}

/// Resolve a link target against `fs_root`.
///
/// Absolute targets drop their leading `/` and gain `base_prefix` (if any);
/// relative targets resolve directly.
pub fn resolve_target(target: &str, fs_root: &Path, base_prefix: Option<&str>) -> PathBuf {
    match target.strip_prefix('/') {
        Some(rest) => match base_prefix.map(|p| p.trim_end_matches('/')) {
            Some(prefix) if !prefix.is_empty() => fs_root.join(prefix).join(rest),
            _ => fs_root.join(rest),
        },
        None => fs_root.join(target),
    }
}

/// Where absolute outline links resolve on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRoot {
    pub fs_root: PathBuf,
    /// Segment prepended to absolute targets.
    pub prefix: Option<String>,
    /// Leading segments removed from absolute targets first, when present.
    pub strip: Option<String>,
}

impl LinkRoot {
    pub fn new(fs_root: impl Into<PathBuf>) -> Self {
        Self {
            fs_root: fs_root.into(),
            prefix: None,
            strip: None,
        }
    }

    /// Resolve one link target.
    pub fn resolve(&self, target: &str) -> PathBuf {
        let stripped;
        let target = match (self.strip.as_deref(), target.strip_prefix('/')) {
            (Some(strip), Some(rest)) => {
                match rest.strip_prefix(strip).and_then(|r| r.strip_prefix('/')) {
                    Some(remainder) => {
                        stripped = format!("/{remainder}");
                        stripped.as_str()
                    }
                    None => target,
                }
            }
            _ => target,
        };
        resolve_target(target, &self.fs_root, self.prefix.as_deref())
    }
}

/// Check every local link in `content`, returning those that do not resolve.
pub fn validate_links(content: &str, fs_root: &Path, base_prefix: Option<&str>) -> Vec<BrokenLink> {
    let root = LinkRoot {
        prefix: base_prefix.map(str::to_string),
        ..LinkRoot::new(fs_root)
    };
    validate_links_in(content, &root)
}

/// Check every local link in `content` against `root`.
#[instrument(skip_all, fields(fs_root = %root.fs_root.display()))]
pub fn validate_links_in(content: &str, root: &LinkRoot) -> Vec<BrokenLink> {
    let mut broken = Vec::new();
    let mut checked = 0usize;

    for link in extract_links(content) {
        if link.is_external() {
            continue;
        }
        checked += 1;

        let resolved = root.resolve(&link.target);
        if !resolved.exists() {
            debug!(target = %link.target, resolved = %resolved.display(), "broken link");
            broken.push(BrokenLink {
                text: link.text,
                target: link.target,
                resolved,
            });
        }
    }

    debug!(checked, broken = broken.len(), "link validation complete");
    broken
}

/// Re-run discovery and return every entry without a README.
///
/// Uses a scratch report so the caller's stats are not counted twice.
pub fn entries_missing_readme(projects_dir: &Path, opts: &DiscoveryOptions) -> Vec<ProjectEntry> {
    let mut scratch = ValidationReport::new();
    let mut missing: Vec<ProjectEntry> = discover(projects_dir, opts, &mut scratch)
        .into_iter()
        .filter(|e| !e.has_readme())
        .collect();
    missing.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    missing
}
