//! Core domain types for demo project indexing and packaging.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

// ---------------------------------------------------------------------------
// ProjectEntry
// ---------------------------------------------------------------------------

/// One discovered unit: a real project (found through its manifest) or a
/// standalone README living in a directory without a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    /// Last path segment (technical identifier).
    pub name: String,
    /// First H1 of the README, falling back to `name`.
    pub display_title: String,
    /// Absolute (or root-joined) directory of the entry.
    pub path: PathBuf,
    /// Directory relative to the scanned root. Never empty.
    pub relative_path: PathBuf,
    /// Number of path segments beyond the category segment.
    pub depth: usize,
    /// First path segment.
    pub category: String,
    /// README location. Present iff the entry has a README.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_path: Option<PathBuf>,
    /// `true` when a manifest marked this directory, `false` for a
    /// standalone-README placeholder.
    pub is_project: bool,
}

impl ProjectEntry {
    /// Build an entry for `dir` below `root`.
    ///
    /// Returns `None` when `dir` is the root itself (no category segment).
    pub fn new(
        root: &Path,
        dir: &Path,
        display_title: Option<String>,
        readme_path: Option<PathBuf>,
        is_project: bool,
    ) -> Option<Self> {
        let relative_path = dir.strip_prefix(root).ok()?.to_path_buf();
        let segments = path_segments(&relative_path);
        let (category, name) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (first.clone(), last.clone()),
            _ => return None,
        };

        Some(Self {
            display_title: display_title.unwrap_or_else(|| name.clone()),
            name,
            path: dir.to_path_buf(),
            depth: segments.len() - 1,
            category,
            relative_path,
            readme_path,
            is_project,
        })
    }

    /// Whether a README was found for this entry.
    pub fn has_readme(&self) -> bool {
        self.readme_path.is_some()
    }

    /// Path segments of `relative_path`, category first.
    pub fn segments(&self) -> Vec<String> {
        path_segments(&self.relative_path)
    }

    /// `relative_path` joined with `/` regardless of platform.
    pub fn relative_slash_path(&self) -> String {
        self.segments().join("/")
    }
}

/// Split a relative path into its normal components.
pub fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// ArtifactInfo
// ---------------------------------------------------------------------------

/// What a packaged artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    /// A top-level documentation file (index page, outline, readme, ...).
    Documentation,
    /// A copied project collection directory.
    ProjectCollection,
}

/// Reporting-only record of a packaged file or directory. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    /// Size in bytes (recursive for directories).
    pub size: u64,
    pub artifact_type: ArtifactType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

// ---------------------------------------------------------------------------
// Issues and reports
// ---------------------------------------------------------------------------

/// How severe a recorded issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks deployment / fails validation.
    Error,
    /// Advisory only.
    Warning,
}

/// Taxonomy of everything the pipelines can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingDirectory,
    ProjectAtRoot,
    MissingReadme,
    TitleExtractionFailed,
    BrokenLink,
    IncompleteExport,
    LeakedExcludedItem,
    NoExportsFound,
    NoProjectsDirectory,
    MissingDocumentation,
}

impl IssueKind {
    /// Stable snake_case identifier used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingDirectory => "missing_directory",
            Self::ProjectAtRoot => "project_at_root",
            Self::MissingReadme => "missing_readme",
            Self::TitleExtractionFailed => "title_extraction_failed",
            Self::BrokenLink => "broken_link",
            Self::IncompleteExport => "incomplete_export",
            Self::LeakedExcludedItem => "leaked_excluded_item",
            Self::NoExportsFound => "no_exports_found",
            Self::NoProjectsDirectory => "no_projects_directory",
            Self::MissingDocumentation => "missing_documentation",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters collected during a sidebar generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarStats {
    pub projects_found: usize,
    pub projects_with_readme: usize,
    pub categories: usize,
    pub broken_links: usize,
}

/// Run-scoped accumulator of errors, warnings, and stats.
///
/// Each run creates its own report and hands it back to the caller; nothing is
/// shared between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: SidebarStats,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue at the given severity and log it.
    pub fn record(&mut self, severity: Severity, kind: IssueKind, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Error => {
                error!(kind = %kind, "{message}");
                self.errors.push(message);
            }
            Severity::Warning => {
                warn!(kind = %kind, "{message}");
                self.warnings.push(message);
            }
        }
    }

    /// Record a blocking issue.
    pub fn error(&mut self, kind: IssueKind, message: impl Into<String>) {
        self.record(Severity::Error, kind, message);
    }

    /// Record an advisory issue.
    pub fn warn(&mut self, kind: IssueKind, message: impl Into<String>) {
        self.record(Severity::Warning, kind, message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Render the human-readable status report.
    pub fn render(&self) -> String {
        let mut lines = vec![
            "=== Sidebar Generation Report ===".to_string(),
            format!("Projects found: {}", self.stats.projects_found),
            format!("Projects with README: {}", self.stats.projects_with_readme),
            format!("Categories: {}", self.stats.categories),
            format!("Broken links: {}", self.stats.broken_links),
        ];

        if !self.errors.is_empty() {
            lines.push("\nERRORS:".to_string());
            lines.extend(self.errors.iter().map(|e| format!("  - {e}")));
        }

        if !self.warnings.is_empty() {
            lines.push("\nWARNINGS:".to_string());
            lines.extend(self.warnings.iter().map(|w| format!("  - {w}")));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_from_nested_dir() {
        let root = Path::new("/demos");
        let entry = ProjectEntry::new(
            root,
            Path::new("/demos/3d/physics/ragdoll"),
            Some("Ragdoll Physics".into()),
            Some(PathBuf::from("/demos/3d/physics/ragdoll/README.md")),
            true,
        )
        .expect("entry below root");

        assert_eq!(entry.name, "ragdoll");
        assert_eq!(entry.category, "3d");
        assert_eq!(entry.depth, 2);
        assert_eq!(entry.display_title, "Ragdoll Physics");
        assert_eq!(entry.relative_slash_path(), "3d/physics/ragdoll");
        assert!(entry.has_readme());
    }

    #[test]
    fn entry_title_falls_back_to_name() {
        let entry = ProjectEntry::new(
            Path::new("/demos"),
            Path::new("/demos/2d"),
            None,
            None,
            true,
        )
        .unwrap();
        assert_eq!(entry.display_title, "2d");
        assert_eq!(entry.depth, 0);
        assert!(!entry.has_readme());
    }

    #[test]
    fn entry_at_root_is_rejected() {
        let root = Path::new("/demos");
        assert!(ProjectEntry::new(root, root, None, None, true).is_none());
        assert!(ProjectEntry::new(root, Path::new("/elsewhere"), None, None, true).is_none());
    }

    #[test]
    fn report_collects_by_severity() {
        let mut report = ValidationReport::new();
        report.warn(IssueKind::ProjectAtRoot, "Project at root level: /demos");
        report.error(IssueKind::BrokenLink, "Broken link: 'A' -> /a/README.md");

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.has_errors());

        let text = report.render();
        assert!(text.starts_with("=== Sidebar Generation Report ==="));
        assert!(text.contains("ERRORS:"));
        assert!(text.contains("  - Broken link: 'A' -> /a/README.md"));
    }

    #[test]
    fn artifact_type_serializes_snake_case() {
        let json = serde_json::to_string(&ArtifactType::ProjectCollection).unwrap();
        assert_eq!(json, "\"project_collection\"");
    }
}
