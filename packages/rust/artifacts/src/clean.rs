//! Removal of generated exports and engine caches.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Directories removed wholesale.
const CLEAN_DIRS: &[&str] = &["exports", ".godot"];

/// File suffixes removed wherever they appear.
const CLEAN_SUFFIXES: &[&str] = &[".wasm", ".pck", ".tmp", ".log"];

/// File names removed wherever they appear.
const CLEAN_FILES: &[&str] = &["build_cache.json"];

/// Delete build artifacts under `projects_dir`. Returns how many paths were removed.
///
/// Failures on individual paths are logged and skipped.
#[instrument(skip_all, fields(projects_dir = %projects_dir.display()))]
pub fn clean_build_artifacts(projects_dir: &Path) -> usize {
    let targets = collect_targets(projects_dir);
    let mut removed = 0;

    for path in targets {
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match result {
            Ok(()) => {
                debug!(path = %path.display(), "removed");
                removed += 1;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove"),
        }
    }

    info!(removed, "cleaned build artifacts");
    removed
}

fn collect_targets(root: &Path) -> Vec<PathBuf> {
    let mut targets = Vec::new();
    let mut it = WalkDir::new(root).follow_links(false).sort_by_file_name().into_iter();

    while let Some(entry) = it.next() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable path");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            if CLEAN_DIRS.contains(&name.as_ref()) {
                targets.push(entry.path().to_path_buf());
                it.skip_current_dir();
            }
        } else if CLEAN_FILES.contains(&name.as_ref())
            || CLEAN_SUFFIXES.iter().any(|s| name.ends_with(s))
        {
            targets.push(entry.path().to_path_buf());
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_exports_caches_and_temp_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let project = root.join("2d/platformer");
        fs::create_dir_all(project.join("exports/web")).unwrap();
        fs::create_dir_all(project.join(".godot/imported")).unwrap();
        fs::write(project.join("exports/web/index.html"), "").unwrap();
        fs::write(project.join("exports/web/index.wasm"), "").unwrap();
        fs::write(project.join("stray.pck"), "").unwrap();
        fs::write(project.join("scratch.tmp"), "").unwrap();
        fs::write(project.join("export.log"), "").unwrap();
        fs::write(root.join("build_cache.json"), "{}").unwrap();
        fs::write(project.join("project.godot"), "").unwrap();
        fs::write(project.join("icon.svg.import"), "").unwrap();

        let removed = clean_build_artifacts(root);

        assert_eq!(removed, 6);
        assert!(!project.join("exports").exists());
        assert!(!project.join(".godot").exists());
        assert!(!project.join("stray.pck").exists());
        assert!(!root.join("build_cache.json").exists());
        assert!(project.join("project.godot").exists());
        assert!(project.join("icon.svg.import").exists());
    }

    #[test]
    fn clean_tree_removes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("3d/voxel")).unwrap();
        assert_eq!(clean_build_artifacts(tmp.path()), 0);
    }
}
