//! End-to-end sidebar generation: discover → categorize → render → validate.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use demoindex_discovery::{DiscoveryOptions, discover};
use demoindex_shared::{
    BuildConfig, IssueKind, ProjectEntry, Result, ValidationReport, path_segments,
};

use crate::categorize::group_by_category;
use crate::link_check::{LinkRoot, entries_missing_readme, validate_links_in};
use crate::render::{ModeSelection, OutlineRenderer, category_header};

/// Content emitted when nothing was discovered.
pub const NO_PROJECTS: &str = "No projects found.\n";

/// Options for one sidebar generation run.
#[derive(Debug, Clone, Default)]
pub struct SidebarOptions {
    /// Base path of every generated link (the projects directory as deployed).
    pub base_path: String,
    /// Render mode choice, resolved per category.
    pub mode: ModeSelection,
    /// Whether to check links and READMEs after rendering.
    pub validate: bool,
    /// Discovery settings.
    pub discovery: DiscoveryOptions,
}

impl SidebarOptions {
    /// Derive options from the build config.
    pub fn from_config(config: &BuildConfig) -> Result<Self> {
        Ok(Self {
            base_path: config.structure.projects_dir.clone(),
            mode: ModeSelection::default(),
            validate: false,
            discovery: DiscoveryOptions::from_config(config)?,
        })
    }
}

/// Result of a run: the outline and the run's own report.
#[derive(Debug, Clone)]
pub struct SidebarOutput {
    pub content: String,
    pub report: ValidationReport,
}

/// Generate the outline for `projects_dir`.
///
/// Every run starts from a fresh report. Structural problems (missing
/// directory, broken links, missing READMEs) land in `report.errors`; the
/// outline is still returned.
#[instrument(skip_all, fields(projects_dir = %projects_dir.display(), mode = ?opts.mode))]
pub fn generate_sidebar(projects_dir: &Path, opts: &SidebarOptions) -> SidebarOutput {
    let mut report = ValidationReport::new();

    let entries = discover(projects_dir, &opts.discovery, &mut report);
    let content = if entries.is_empty() {
        NO_PROJECTS.to_string()
    } else {
        render_outline(projects_dir, entries, opts, &mut report)
    };

    if opts.validate {
        validate_outline(projects_dir, &content, opts, &mut report);
    }

    info!(
        projects = report.stats.projects_found,
        categories = report.stats.categories,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "sidebar generated"
    );

    SidebarOutput { content, report }
}

fn render_outline(
    projects_dir: &Path,
    entries: Vec<ProjectEntry>,
    opts: &SidebarOptions,
    report: &mut ValidationReport,
) -> String {
    let categories = group_by_category(entries);
    report.stats.categories = categories.len();

    let mut content = String::new();
    for (category, list) in &categories {
        let header = category_header(projects_dir, category, &opts.base_path);
        let mode = opts.mode.resolve(list);
        debug!(category = %category, entries = list.len(), ?mode, "rendering category");

        let renderer = OutlineRenderer::new(&opts.base_path, header.link.as_deref());
        let body = renderer.render(mode, list, &mut report.stats);

        content.push_str(&header.line);
        content.push('\n');
        content.push_str(&body);
        content.push('\n');
    }
    content
}

fn validate_outline(
    projects_dir: &Path,
    content: &str,
    opts: &SidebarOptions,
    report: &mut ValidationReport,
) {
    let root = link_resolution(projects_dir, &opts.base_path);
    debug!(fs_root = %root.fs_root.display(), prefix = ?root.prefix, strip = ?root.strip, "validating links");

    for link in validate_links_in(content, &root) {
        report.error(IssueKind::BrokenLink, format!("Broken link: {link}"));
    }

    for entry in entries_missing_readme(projects_dir, &opts.discovery) {
        report.error(
            IssueKind::MissingReadme,
            format!("Missing README.md for project: {}", entry.path.display()),
        );
    }
}

/// Work out where absolute links resolve on disk.
///
/// - Empty base path: links are rooted at the projects directory; resolve from
///   its parent with the directory's own name as prefix.
/// - Projects directory ends with the base path: resolve from the directory
///   above those segments.
/// - Otherwise the local layout differs from the deployed one; strip the base
///   path from each link and resolve the rest against the projects directory.
pub fn link_resolution(projects_dir: &Path, base_path: &str) -> LinkRoot {
    let dir = projects_dir
        .canonicalize()
        .unwrap_or_else(|_| projects_dir.to_path_buf());
    let base_segments = path_segments(Path::new(base_path));

    if base_segments.is_empty() {
        let parent = dir.parent().map(Path::to_path_buf).unwrap_or_else(|| dir.clone());
        return LinkRoot {
            prefix: dir.file_name().map(|n| n.to_string_lossy().into_owned()),
            ..LinkRoot::new(parent)
        };
    }

    let base = base_segments.iter().collect::<PathBuf>();
    if dir.ends_with(&base) {
        let site_root = dir
            .ancestors()
            .nth(base_segments.len())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dir.clone());
        return LinkRoot::new(site_root);
    }

    warn!(
        projects_dir = %dir.display(),
        base_path,
        "projects directory does not end with the link base path; pass --base-path to match the deployed layout"
    );
    LinkRoot {
        strip: Some(base_segments.join("/")),
        ..LinkRoot::new(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn empty_tree_yields_placeholder() {
        let tmp = tempfile::tempdir().unwrap();
        let output = generate_sidebar(tmp.path(), &SidebarOptions::default());
        assert_eq!(output.content, NO_PROJECTS);
        assert!(output.report.errors.is_empty());
    }

    #[test]
    fn missing_directory_reports_error() {
        let tmp = tempfile::tempdir().unwrap();
        let output = generate_sidebar(&tmp.path().join("nope"), &SidebarOptions::default());
        assert_eq!(output.content, NO_PROJECTS);
        assert_eq!(output.report.errors.len(), 1);
    }

    #[test]
    fn link_resolution_strategies() {
        let tmp = tempfile::tempdir().unwrap();
        let site = tmp.path().canonicalize().unwrap();
        let projects = site.join("godot-demo-projects");
        fs::create_dir_all(&projects).unwrap();

        let root = link_resolution(&projects, "");
        assert_eq!(root.fs_root, site);
        assert_eq!(root.prefix.as_deref(), Some("godot-demo-projects"));

        let root = link_resolution(&projects, "godot-demo-projects");
        assert_eq!(root, LinkRoot::new(site.clone()));

        let root = link_resolution(&projects, "elsewhere/demos");
        assert_eq!(root.fs_root, projects);
        assert_eq!(root.prefix, None);
        assert_eq!(root.strip.as_deref(), Some("elsewhere/demos"));
    }

    #[test]
    fn validation_with_mismatched_base_path_resolves_links() {
        let tmp = tempfile::tempdir().unwrap();
        let projects = tmp.path().join("demos");
        write(&projects, "2d/a/project.godot", "");
        write(&projects, "2d/a/README.md", "# A\n");

        let opts = SidebarOptions {
            base_path: "godot-demo-projects".into(),
            validate: true,
            ..SidebarOptions::default()
        };
        let output = generate_sidebar(&projects, &opts);

        assert!(output.content.contains("(/godot-demo-projects/2d/a/README.md)"));
        assert!(output.report.errors.is_empty(), "{:?}", output.report.errors);
    }

    #[test]
    fn stats_are_per_run() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "2d/a/project.godot", "");
        write(root, "2d/a/README.md", "# A\n");
        write(root, "3d/b/project.godot", "");

        let opts = SidebarOptions {
            validate: true,
            ..SidebarOptions::default()
        };
        let first = generate_sidebar(root, &opts);
        let second = generate_sidebar(root, &opts);

        assert_eq!(first.report.stats, second.report.stats);
        assert_eq!(first.report.stats.projects_found, 2);
        assert_eq!(first.report.stats.categories, 2);
        assert_eq!(first.report.stats.broken_links, 1);
        assert_eq!(first.report.errors, second.report.errors);
        assert_eq!(first.report.errors.len(), 1);
        assert!(first.report.errors[0].starts_with("Missing README.md for project:"));
    }
}
