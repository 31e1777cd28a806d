//! Web export detection and completeness checks.
//!
//! A web export lives at `<project>/exports/<target>/index.html` and is
//! complete when the same directory also holds a compiled binary payload
//! (`*.wasm`), a data package (`*.pck`), and a loader script (`*.js`).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;
use walkdir::WalkDir;

/// Directory name that holds a project's export targets.
pub const EXPORTS_DIR: &str = "exports";

/// Entry point every web export carries.
pub const EXPORT_INDEX: &str = "index.html";

/// Companion files a web export needs besides its index page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// Compiled binary payload.
    Wasm,
    /// Data package.
    Pck,
    /// Loader script.
    Js,
}

impl ExportKind {
    pub const ALL: [ExportKind; 3] = [ExportKind::Wasm, ExportKind::Pck, ExportKind::Js];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Wasm => "wasm",
            Self::Pck => "pck",
            Self::Js => "js",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Wasm => "WASM",
            Self::Pck => "PCK",
            Self::Js => "JS",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of inspecting one export directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportCheck {
    /// Directory holding `index.html`.
    pub dir: PathBuf,
    /// Project directory the export belongs to (two levels above `dir`).
    pub project: PathBuf,
    /// Companion files that were not found.
    pub missing: Vec<ExportKind>,
}

impl ExportCheck {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn has(&self, kind: ExportKind) -> bool {
        !self.missing.contains(&kind)
    }

    /// Human-readable diagnostic, e.g. `2d/platformer (missing: WASM, PCK)`.
    pub fn describe(&self, root: &Path) -> String {
        let project = self.project.strip_prefix(root).unwrap_or(&self.project);
        let missing: Vec<&str> = self.missing.iter().map(|k| k.label()).collect();
        format!(
            "{} (missing: {})",
            project.to_string_lossy().replace('\\', "/"),
            missing.join(", ")
        )
    }
}

/// Whether `path` is an export index page (`.../exports/<target>/index.html`).
pub fn is_export_index(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == EXPORT_INDEX)
        && path
            .parent()
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .is_some_and(|n| n == EXPORTS_DIR)
}

/// Find every web export directory under `root`, sorted by path.
pub fn find_exports(root: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable path while searching exports");
                continue;
            }
        };
        if entry.file_type().is_file() && is_export_index(entry.path()) {
            if let Some(dir) = entry.path().parent() {
                dirs.push(dir.to_path_buf());
            }
        }
    }
    dirs
}

/// Check which companion files an export directory is missing.
///
/// Only files directly inside `dir` count.
pub fn check_export(dir: &Path) -> ExportCheck {
    let extensions: Vec<String> = std::fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
                .filter_map(|e| {
                    e.path()
                        .extension()
                        .map(|x| x.to_string_lossy().to_lowercase())
                })
                .collect()
        })
        .unwrap_or_default();

    let missing = ExportKind::ALL
        .into_iter()
        .filter(|k| !extensions.iter().any(|x| x == k.extension()))
        .collect();

    let project = dir
        .parent()
        .and_then(Path::parent)
        .unwrap_or(dir)
        .to_path_buf();

    ExportCheck {
        dir: dir.to_path_buf(),
        project,
        missing,
    }
}

/// Find and check every export under `root`.
pub fn check_exports(root: &Path) -> Vec<ExportCheck> {
    find_exports(root).iter().map(|d| check_export(d)).collect()
}
