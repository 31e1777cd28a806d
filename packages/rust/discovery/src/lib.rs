//! Project and README discovery over a demo project tree.
//!
//! Walks a root directory, finds every project manifest (`project.godot`) and
//! every `README.md`, and turns them into [`ProjectEntry`] records. A directory
//! holding a manifest yields exactly one project entry; READMEs in directories
//! without a manifest become standalone entries.
//!
//! Discovery itself does not sort its output: ordering is established by the
//! categorizer downstream.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, info, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use demoindex_markdown::{TitleOutcome, read_title};
use demoindex_shared::{BuildConfig, DemoIndexError, IssueKind, ProjectEntry, Result, ValidationReport};

/// Default manifest file marking a project directory.
pub const MANIFEST_FILE: &str = "project.godot";

/// Default README file name.
pub const README_FILE: &str = "README.md";

/// Infrastructure directories never scanned.
pub const EXCLUDED_DIRS: &[&str] = &[".github", "docs"];

// ---------------------------------------------------------------------------
// Discovery options
// ---------------------------------------------------------------------------

/// Configuration for a discovery walk.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// File name marking a project directory.
    pub manifest_name: String,
    /// File name of per-directory documentation.
    pub readme_name: String,
    /// Path components that exclude everything below them.
    pub excluded_dirs: Vec<String>,
    /// A manifest's root-relative path must match one of these (if any).
    pub include_patterns: Vec<Pattern>,
    /// Root-relative paths matching any of these are pruned from the walk.
    pub exclude_patterns: Vec<Pattern>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            manifest_name: MANIFEST_FILE.into(),
            readme_name: README_FILE.into(),
            excluded_dirs: EXCLUDED_DIRS.iter().map(|d| (*d).to_string()).collect(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl DiscoveryOptions {
    /// Build options from the build config's include/exclude globs.
    pub fn from_config(config: &BuildConfig) -> Result<Self> {
        Ok(Self {
            include_patterns: compile_patterns(&config.project_include_patterns)?,
            exclude_patterns: compile_patterns(&config.project_exclude_patterns)?,
            ..Self::default()
        })
    }

    /// Whether a root-relative path is pruned by the infrastructure list or an
    /// exclude glob.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let infra = relative.components().any(|c| {
            let c = c.as_os_str().to_string_lossy();
            self.excluded_dirs.iter().any(|d| *d == c)
        });
        infra || self.exclude_patterns.iter().any(|p| p.matches_path(relative))
    }

    fn is_included(&self, relative_manifest: &Path) -> bool {
        self.include_patterns.is_empty()
            || self
                .include_patterns
                .iter()
                .any(|p| p.matches_path(relative_manifest))
    }
}

fn compile_patterns(raw: &[String]) -> Result<Vec<Pattern>> {
    raw.iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| DemoIndexError::parse(format!("invalid glob pattern '{p}': {e}")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tree scan
// ---------------------------------------------------------------------------

/// Raw result of walking a tree: every manifest and README file found.
#[derive(Debug, Clone, Default)]
pub struct TreeScan {
    pub manifests: Vec<PathBuf>,
    pub readmes: Vec<PathBuf>,
}

/// Walk `root` once, collecting manifest and README files.
///
/// Symlinks are not followed. Unreadable entries are logged and skipped.
pub fn scan_tree(root: &Path, opts: &DiscoveryOptions) -> TreeScan {
    let mut scan = TreeScan::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned(root, entry, opts));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if name == opts.manifest_name.as_str() {
            scan.manifests.push(entry.into_path());
        } else if name == opts.readme_name.as_str() {
            scan.readmes.push(entry.into_path());
        }
    }

    debug!(
        manifests = scan.manifests.len(),
        readmes = scan.readmes.len(),
        "tree scan complete"
    );
    scan
}

/// Every manifest file below `root` (including one at the root itself).
pub fn find_manifests(root: &Path, opts: &DiscoveryOptions) -> Vec<PathBuf> {
    scan_tree(root, opts).manifests
}

fn is_pruned(root: &Path, entry: &DirEntry, opts: &DiscoveryOptions) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    match entry.path().strip_prefix(root) {
        Ok(relative) => opts.is_excluded(relative),
        Err(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Discover all projects and standalone READMEs below `root`.
///
/// Issues (missing root, root-level manifests, missing READMEs, unreadable or
/// untitled READMEs) are recorded in `report`; stats `projects_found` and
/// `projects_with_readme` are incremented.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn discover(
    root: &Path,
    opts: &DiscoveryOptions,
    report: &mut ValidationReport,
) -> Vec<ProjectEntry> {
    if !root.is_dir() {
        report.error(
            IssueKind::MissingDirectory,
            format!("Projects directory not found: {}", root.display()),
        );
        return Vec::new();
    }

    let scan = scan_tree(root, opts);
    let mut entries = Vec::new();

    // Pass 1: directories marked by a manifest.
    for manifest in &scan.manifests {
        let Some(dir) = manifest.parent() else {
            continue;
        };

        if dir == root {
            report.warn(
                IssueKind::ProjectAtRoot,
                format!("Project at root level: {}", dir.display()),
            );
            continue;
        }

        let relative_manifest = manifest.strip_prefix(root).unwrap_or(manifest);
        if !opts.is_included(relative_manifest) {
            debug!(manifest = %manifest.display(), "manifest not matched by include patterns");
            continue;
        }

        let relative = dir.strip_prefix(root).unwrap_or(dir);
        let readme = dir.join(&opts.readme_name);
        let readme_path = readme.is_file().then_some(readme);

        let title = match &readme_path {
            Some(readme) => readme_title(readme, relative, report),
            None => {
                report.warn(
                    IssueKind::MissingReadme,
                    format!("Missing README.md: {}", relative.display()),
                );
                None
            }
        };

        if let Some(entry) = ProjectEntry::new(root, dir, title, readme_path, true) {
            report.stats.projects_found += 1;
            if entry.has_readme() {
                report.stats.projects_with_readme += 1;
            }
            entries.push(entry);
        }
    }

    // Pass 2: READMEs in directories no project has claimed.
    let project_dirs: HashSet<PathBuf> = entries.iter().map(|e| e.path.clone()).collect();

    for readme in &scan.readmes {
        let Some(dir) = readme.parent() else {
            continue;
        };
        if dir == root || project_dirs.contains(dir) {
            continue;
        }

        let relative = dir.strip_prefix(root).unwrap_or(dir);
        let title = readme_title(readme, relative, report);

        if let Some(entry) = ProjectEntry::new(root, dir, title, Some(readme.clone()), false) {
            report.stats.projects_found += 1;
            report.stats.projects_with_readme += 1;
            entries.push(entry);
        }
    }

    info!(
        entries = entries.len(),
        projects = entries.iter().filter(|e| e.is_project).count(),
        "discovery complete"
    );

    entries
}

/// Read a README title, recording a warning when none can be extracted.
fn readme_title(readme: &Path, relative: &Path, report: &mut ValidationReport) -> Option<String> {
    match read_title(readme) {
        TitleOutcome::Found(title) => Some(title),
        TitleOutcome::NotFound => {
            report.warn(
                IssueKind::TitleExtractionFailed,
                format!("No H1 title found in README: {}", relative.display()),
            );
            None
        }
        TitleOutcome::ReadError(reason) => {
            report.warn(
                IssueKind::TitleExtractionFailed,
                format!("Failed to read README {}: {reason}", readme.display()),
            );
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn find<'a>(entries: &'a [ProjectEntry], rel: &str) -> &'a ProjectEntry {
        entries
            .iter()
            .find(|e| e.relative_slash_path() == rel)
            .unwrap_or_else(|| panic!("no entry for {rel}"))
    }

    #[test]
    fn discovers_projects_and_standalone_readmes() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "2d/platformer/project.godot", "");
        write(root, "2d/platformer/README.md", "# Platformer Demo\n");
        write(root, "networking/README.md", "# Networking Overview\n");

        let mut report = ValidationReport::new();
        let entries = discover(root, &DiscoveryOptions::default(), &mut report);

        assert_eq!(entries.len(), 2);

        let platformer = find(&entries, "2d/platformer");
        assert!(platformer.is_project);
        assert_eq!(platformer.display_title, "Platformer Demo");
        assert_eq!(platformer.category, "2d");
        assert_eq!(platformer.depth, 1);

        let networking = find(&entries, "networking");
        assert!(!networking.is_project);
        assert!(networking.has_readme());
        assert_eq!(networking.display_title, "Networking Overview");
        assert_eq!(networking.depth, 0);

        assert_eq!(report.stats.projects_found, 2);
        assert_eq!(report.stats.projects_with_readme, 2);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn manifest_and_readme_in_same_dir_yield_one_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "3d/ragdoll/project.godot", "");
        write(root, "3d/ragdoll/README.md", "# Ragdoll\n");

        let mut report = ValidationReport::new();
        let entries = discover(root, &DiscoveryOptions::default(), &mut report);

        let matching: Vec<_> = entries
            .iter()
            .filter(|e| e.relative_slash_path() == "3d/ragdoll")
            .collect();
        assert_eq!(matching.len(), 1);
        assert!(matching[0].is_project);
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut report = ValidationReport::new();
        let entries = discover(
            &tmp.path().join("absent"),
            &DiscoveryOptions::default(),
            &mut report,
        );

        assert!(entries.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Projects directory not found"));
    }

    #[test]
    fn root_level_project_is_skipped_with_warning() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "project.godot", "");
        write(root, "README.md", "# Root\n");

        let mut report = ValidationReport::new();
        let entries = discover(root, &DiscoveryOptions::default(), &mut report);

        assert!(entries.is_empty());
        assert!(report.warnings.iter().any(|w| w.starts_with("Project at root level")));
    }

    #[test]
    fn missing_readme_and_missing_title_warn() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "audio/mic/project.godot", "");
        write(root, "audio/spectrum/project.godot", "");
        write(root, "audio/spectrum/README.md", "No heading here.\n");

        let mut report = ValidationReport::new();
        let entries = discover(root, &DiscoveryOptions::default(), &mut report);

        let mic = find(&entries, "audio/mic");
        assert!(!mic.has_readme());
        assert_eq!(mic.display_title, "mic");

        let spectrum = find(&entries, "audio/spectrum");
        assert!(spectrum.has_readme());
        assert_eq!(spectrum.display_title, "spectrum");

        assert!(report.warnings.contains(&"Missing README.md: audio/mic".to_string()));
        assert!(
            report
                .warnings
                .contains(&"No H1 title found in README: audio/spectrum".to_string())
        );
        assert_eq!(report.stats.projects_found, 2);
        assert_eq!(report.stats.projects_with_readme, 1);
    }

    #[test]
    fn infrastructure_dirs_are_excluded() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, ".github/workflows/README.md", "# CI\n");
        write(root, "docs/README.md", "# Generated\n");
        write(root, "gui/docs/project.godot", "");
        write(root, "gui/theme/project.godot", "");

        let mut report = ValidationReport::new();
        let entries = discover(root, &DiscoveryOptions::default(), &mut report);

        let paths: Vec<String> = entries.iter().map(|e| e.relative_slash_path()).collect();
        assert_eq!(paths, vec!["gui/theme"]);
    }

    #[test]
    fn config_globs_prune_and_filter() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "2d/hud/project.godot", "");
        write(root, "2d/hud/exports/web/README.md", "# Export notes\n");
        write(root, "2d/.hidden/project.godot", "");

        let opts = DiscoveryOptions::from_config(&BuildConfig::default()).unwrap();
        let mut report = ValidationReport::new();
        let entries = discover(root, &opts, &mut report);

        let paths: Vec<String> = entries.iter().map(|e| e.relative_slash_path()).collect();
        assert_eq!(paths, vec!["2d/hud"]);
    }

    #[test]
    fn invalid_glob_is_a_parse_error() {
        let mut config = BuildConfig::default();
        config.project_exclude_patterns = vec!["[unclosed".into()];
        let err = DiscoveryOptions::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("invalid glob pattern"));
    }

    #[test]
    fn find_manifests_includes_root_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "project.godot", "");
        write(root, "a/b/project.godot", "");

        let manifests = find_manifests(root, &DiscoveryOptions::default());
        assert_eq!(manifests.len(), 2);
    }
}
