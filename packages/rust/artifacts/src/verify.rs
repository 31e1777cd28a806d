//! Post-build verification of a projects tree.

use std::path::{Path, PathBuf};

use demoindex_discovery::{DiscoveryOptions, find_manifests};
use serde::Serialize;
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::export::{EXPORTS_DIR, ExportKind, check_exports};

/// How many export records are kept in a verification result.
const SAMPLE_LIMIT: usize = 5;

/// One export in a verification sample.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord {
    pub path: PathBuf,
    pub has_wasm: bool,
    pub has_pck: bool,
    pub has_js: bool,
    pub complete: bool,
}

/// Counts describing how much of a projects tree was exported.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildVerification {
    pub total_projects: usize,
    pub export_dirs: usize,
    pub web_exports: usize,
    pub complete_exports: usize,
    pub incomplete_exports: usize,
    /// Percentage of projects with a complete export.
    pub success_rate: f64,
    /// First few exports found, for display.
    pub samples: Vec<ExportRecord>,
}

/// Count projects and exports under `projects_dir`.
#[instrument(skip_all, fields(projects_dir = %projects_dir.display()))]
pub fn verify_build_results(projects_dir: &Path) -> BuildVerification {
    if !projects_dir.is_dir() {
        warn!("projects directory not found");
        return BuildVerification::default();
    }

    let total_projects = find_manifests(projects_dir, &DiscoveryOptions::default()).len();
    let export_dirs = count_export_dirs(projects_dir);
    let checks = check_exports(projects_dir);
    let complete_exports = checks.iter().filter(|c| c.is_complete()).count();

    let success_rate = if total_projects > 0 {
        complete_exports as f64 / total_projects as f64 * 100.0
    } else {
        0.0
    };

    let samples = checks
        .iter()
        .take(SAMPLE_LIMIT)
        .map(|c| ExportRecord {
            path: c.dir.clone(),
            has_wasm: c.has(ExportKind::Wasm),
            has_pck: c.has(ExportKind::Pck),
            has_js: c.has(ExportKind::Js),
            complete: c.is_complete(),
        })
        .collect();

    info!(
        total_projects,
        export_dirs,
        web_exports = checks.len(),
        complete_exports,
        success_rate = %format!("{success_rate:.1}%"),
        "build verification"
    );

    BuildVerification {
        total_projects,
        export_dirs,
        web_exports: checks.len(),
        complete_exports,
        incomplete_exports: checks.len() - complete_exports,
        success_rate,
        samples,
    }
}

fn count_export_dirs(root: &Path) -> usize {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir() && e.file_name() == EXPORTS_DIR)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project(root: &Path, rel: &str, exports: Option<&[&str]>) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("project.godot"), "").unwrap();
        if let Some(files) = exports {
            let web = dir.join("exports/web");
            fs::create_dir_all(&web).unwrap();
            fs::write(web.join("index.html"), "").unwrap();
            for f in files {
                fs::write(web.join(f), "x").unwrap();
            }
        }
    }

    #[test]
    fn counts_projects_and_exports() {
        let tmp = tempfile::tempdir().unwrap();
        project(tmp.path(), "2d/a", Some(&["a.wasm", "a.pck", "a.js"]));
        project(tmp.path(), "2d/b", Some(&["b.js"]));
        project(tmp.path(), "3d/c", None);
        project(tmp.path(), "3d/d", Some(&["d.wasm", "d.pck", "d.js"]));

        let v = verify_build_results(tmp.path());
        assert_eq!(v.total_projects, 4);
        assert_eq!(v.export_dirs, 3);
        assert_eq!(v.web_exports, 3);
        assert_eq!(v.complete_exports, 2);
        assert_eq!(v.incomplete_exports, 1);
        assert!((v.success_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(v.samples.len(), 3);
        assert!(v.samples[1].has_js && !v.samples[1].has_wasm);
    }

    #[test]
    fn missing_dir_yields_zeroes() {
        let tmp = tempfile::tempdir().unwrap();
        let v = verify_build_results(&tmp.path().join("nope"));
        assert_eq!(v.total_projects, 0);
        assert_eq!(v.success_rate, 0.0);
    }
}
