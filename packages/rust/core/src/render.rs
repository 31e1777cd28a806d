//! Outline rendering.
//!
//! Produces the Docsify-style nested Markdown list: one top-level bullet per
//! category (linked when the category has its own README) followed by the
//! category's entries, either nested by path depth or as a single flat level.

use std::path::Path;

use serde::{Deserialize, Serialize};

use demoindex_discovery::README_FILE;
use demoindex_markdown::read_title;
use demoindex_shared::{ProjectEntry, SidebarStats};

use crate::hierarchy::TreeNode;

/// Marker appended to entries that have no README to link to.
pub const NO_README_MARKER: &str = "⚠️ (No README)";

/// How a category's entries are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Nested bullets, two spaces of indent per depth level.
    Hierarchical,
    /// One bullet level for the whole category.
    Flat,
}

/// Caller's choice of render mode, resolved per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeSelection {
    /// Flat when every entry sits at depth 0 or 1, hierarchical otherwise.
    #[default]
    Auto,
    Flat,
    Hierarchical,
}

impl ModeSelection {
    /// Pick the mode for one category's entries.
    pub fn resolve(self, entries: &[ProjectEntry]) -> RenderMode {
        match self {
            Self::Flat => RenderMode::Flat,
            Self::Hierarchical => RenderMode::Hierarchical,
            Self::Auto if entries.iter().all(|e| e.depth <= 1) => RenderMode::Flat,
            Self::Auto => RenderMode::Hierarchical,
        }
    }
}

/// Build an absolute-style README link: `/<base>/<relative>/README.md`.
///
/// Empty or `.` base paths are dropped and any `/./` collapses to `/`.
pub fn docs_link(base_path: &str, relative: &str) -> String {
    let base = base_path.trim_matches('/');
    let relative = relative.trim_matches('/');

    let mut link = if base.is_empty() {
        format!("/{relative}/{README_FILE}")
    } else {
        format!("/{base}/{relative}/{README_FILE}")
    };

    while link.contains("/./") {
        link = link.replace("/./", "/");
    }
    link
}

// ---------------------------------------------------------------------------
// Category header
// ---------------------------------------------------------------------------

/// The top-level bullet for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryHeader {
    /// Rendered line, without trailing newline.
    pub line: String,
    /// The header's README link; entries rendering the same link are skipped.
    pub link: Option<String>,
}

/// Render the header for `category`.
///
/// With a `category/README.md`, the header links to it, titled by its H1 (or
/// `"{CATEGORY} Demos"`). Otherwise it is a bold label.
pub fn category_header(projects_dir: &Path, category: &str, base_path: &str) -> CategoryHeader {
    let readme = projects_dir.join(category).join(README_FILE);

    if readme.is_file() {
        let title = read_title(&readme)
            .into_title()
            .unwrap_or_else(|| format!("{} Demos", category.to_uppercase()));
        let link = docs_link(base_path, category);
        CategoryHeader {
            line: format!("- [{title}]({link})"),
            link: Some(link),
        }
    } else {
        CategoryHeader {
            line: format!("- **{}**", category.to_uppercase()),
            link: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry rendering
// ---------------------------------------------------------------------------

/// Renders entries beneath a category header.
#[derive(Debug, Clone, Copy)]
pub struct OutlineRenderer<'a> {
    /// Base path prefixed to every link.
    pub base_path: &'a str,
    /// Link already rendered as the category header.
    pub skip_link: Option<&'a str>,
}

impl<'a> OutlineRenderer<'a> {
    pub fn new(base_path: &'a str, skip_link: Option<&'a str>) -> Self {
        Self {
            base_path,
            skip_link,
        }
    }

    /// Render a category tree depth-first in sorted order.
    ///
    /// The root's own entry and its direct children sit one level below the
    /// category header; deeper segments indent one more level each.
    pub fn render_tree(&self, root: &TreeNode, stats: &mut SidebarStats) -> String {
        let mut out = String::new();
        if let Some(entry) = &root.entry {
            self.render_entry(entry, 1, stats, &mut out);
        }
        for child in root.children.values() {
            self.render_node(child, 1, stats, &mut out);
        }
        out
    }

    /// Render entries as a single list level, ordered by title.
    pub fn render_flat(&self, entries: &[ProjectEntry], stats: &mut SidebarStats) -> String {
        let mut sorted: Vec<&ProjectEntry> = entries.iter().collect();
        sorted.sort_by(|a, b| {
            a.display_title
                .to_lowercase()
                .cmp(&b.display_title.to_lowercase())
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });

        let mut out = String::new();
        for entry in sorted {
            self.render_entry(entry, 1, stats, &mut out);
        }
        out
    }

    /// Render with the given mode.
    pub fn render(
        &self,
        mode: RenderMode,
        entries: &[ProjectEntry],
        stats: &mut SidebarStats,
    ) -> String {
        match mode {
            RenderMode::Hierarchical => {
                let tree = crate::hierarchy::build_tree(entries);
                self.render_tree(&tree, stats)
            }
            RenderMode::Flat => self.render_flat(entries, stats),
        }
    }

    fn render_node(&self, node: &TreeNode, depth: usize, stats: &mut SidebarStats, out: &mut String) {
        if let Some(entry) = &node.entry {
            self.render_entry(entry, depth, stats, out);
        }
        for child in node.children.values() {
            self.render_node(child, depth + 1, stats, out);
        }
    }

    fn render_entry(
        &self,
        entry: &ProjectEntry,
        depth: usize,
        stats: &mut SidebarStats,
        out: &mut String,
    ) {
        let indent = "  ".repeat(depth);

        if entry.has_readme() {
            let link = docs_link(self.base_path, &entry.relative_slash_path());
            if self.skip_link == Some(link.as_str()) {
                return;
            }
            out.push_str(&format!("{indent}- [{}]({link})\n", entry.display_title));
        } else {
            out.push_str(&format!(
                "{indent}- {} {NO_README_MARKER}\n",
                entry.display_title
            ));
            stats.broken_links += 1;
        }
    }
}
