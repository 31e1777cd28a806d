//! Assembly of a deployable documentation artifact.
//!
//! Copies the site's documentation files and every project collection into a
//! staging directory, dropping engine binaries, caches, and templates on the
//! way.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use demoindex_shared::{ArtifactInfo, ArtifactType, BuildConfig, DemoIndexError, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::filter::ExclusionFilter;
use crate::verify::verify_build_results;

/// Default staging directory name, relative to the site root.
pub const STAGING_DIR: &str = "artifact_staging";

/// Files copied besides the index and sidebar, when present.
const EXTRA_DOCS: &[&str] = &["README.md", "CHANGELOG.md", "DOCS.md", "docsify-embed-godot.js"];

/// Suffixes that mark a top-level directory as a project collection.
const COLLECTION_SUFFIXES: &[&str] = &["-projects", "-extended"];

/// Whether a top-level directory name is a project collection.
pub fn is_collection_dir(name: &str) -> bool {
    COLLECTION_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Top-level collection directories under `root`, sorted by name.
pub fn collection_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(root)
        .map_err(|e| DemoIndexError::io(root, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|e| is_collection_dir(&e.file_name().to_string_lossy()))
        .map(|e| e.path())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Progress callback for packaging.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after a documentation file or collection is copied.
    fn item_copied(&self, name: &str, current: usize, total: usize);
    /// Called when packaging completes.
    fn done(&self, summary: &PackageSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn item_copied(&self, _name: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &PackageSummary) {}
}

/// What to copy and what to leave out.
#[derive(Debug, Clone)]
pub struct PackagerOptions {
    pub documentation_files: Vec<String>,
    pub filter: ExclusionFilter,
}

impl From<&BuildConfig> for PackagerOptions {
    fn from(config: &BuildConfig) -> Self {
        let mut documentation_files = vec![
            config.structure.index_file.clone(),
            config.structure.sidebar_file.clone(),
        ];
        for doc in EXTRA_DOCS {
            if !documentation_files.iter().any(|d| d == doc) {
                documentation_files.push((*doc).to_string());
            }
        }
        Self {
            documentation_files,
            filter: ExclusionFilter::from(config),
        }
    }
}

impl Default for PackagerOptions {
    fn default() -> Self {
        Self::from(&BuildConfig::default())
    }
}

/// Outcome of a packaging run.
#[derive(Debug, Clone)]
pub struct PackageSummary {
    pub output_dir: PathBuf,
    pub artifacts: Vec<ArtifactInfo>,
    pub total_files: usize,
    pub total_size: u64,
    pub total_projects: usize,
    pub total_exports: usize,
    pub elapsed_secs: f64,
}

/// Copy documentation and project collections from `root` into a staging
/// directory (`output_dir`, or `root/artifact_staging` when `None`).
#[instrument(skip_all, fields(root = %root.display()))]
pub fn prepare_documentation_artifact(
    root: &Path,
    output_dir: Option<&Path>,
    opts: &PackagerOptions,
    progress: &dyn ProgressReporter,
) -> Result<PackageSummary> {
    let start = Instant::now();
    let output_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(STAGING_DIR));
    let collections = collection_dirs(root)?;
    check_output_location(root, &output_dir, &collections)?;

    fs::create_dir_all(&output_dir).map_err(|e| DemoIndexError::io(&output_dir, e))?;
    info!(output = %output_dir.display(), "preparing documentation artifact");

    let mut artifacts = Vec::new();

    // --- Phase 1: Documentation files ---
    progress.phase("Copying documentation");
    let docs: Vec<&String> = opts
        .documentation_files
        .iter()
        .filter(|d| root.join(d).is_file())
        .collect();
    for (i, doc) in docs.iter().enumerate() {
        let src = root.join(doc);
        let dest = output_dir.join(doc);
        fs::copy(&src, &dest).map_err(|e| DemoIndexError::io(&src, e))?;
        let bytes = fs::read(&dest).map_err(|e| DemoIndexError::io(&dest, e))?;

        let mut metadata = BTreeMap::new();
        metadata.insert("name".to_string(), serde_json::Value::from(doc.as_str()));
        metadata.insert("sha256".to_string(), serde_json::Value::from(sha256_hex(&bytes)));

        debug!(doc = %doc, size = bytes.len(), "copied documentation file");
        artifacts.push(ArtifactInfo {
            path: dest,
            size: bytes.len() as u64,
            artifact_type: ArtifactType::Documentation,
            metadata: Some(metadata),
        });
        progress.item_copied(doc, i + 1, docs.len());
    }

    // --- Phase 2: Project collections ---
    progress.phase("Copying project collections");
    let mut total_projects = 0;
    let mut total_exports = 0;
    for (i, collection) in collections.iter().enumerate() {
        let name = collection
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dest = output_dir.join(&name);
        if dest.exists() {
            fs::remove_dir_all(&dest).map_err(|e| DemoIndexError::io(&dest, e))?;
        }

        let (files, size) = copy_filtered(collection, &dest, &opts.filter)?;
        let verification = verify_build_results(&dest);
        total_projects += verification.total_projects;
        total_exports += verification.web_exports;

        let mut metadata = BTreeMap::new();
        metadata.insert("name".to_string(), serde_json::Value::from(name.as_str()));
        metadata.insert("files".to_string(), serde_json::Value::from(files));
        metadata.insert(
            "projects".to_string(),
            serde_json::Value::from(verification.total_projects),
        );
        metadata.insert(
            "web_exports".to_string(),
            serde_json::Value::from(verification.web_exports),
        );

        info!(collection = %name, files, size = %format_size(size), "copied project collection");
        artifacts.push(ArtifactInfo {
            path: dest,
            size,
            artifact_type: ArtifactType::ProjectCollection,
            metadata: Some(metadata),
        });
        progress.item_copied(&name, i + 1, collections.len());
    }

    if collections.is_empty() {
        warn!("no project collections found");
    }

    // --- Phase 3: Totals ---
    progress.phase("Summarizing");
    let (total_files, total_size) = dir_stats(&output_dir);

    let summary = PackageSummary {
        output_dir,
        artifacts,
        total_files,
        total_size,
        total_projects,
        total_exports,
        elapsed_secs: start.elapsed().as_secs_f64(),
    };

    info!(
        files = total_files,
        size = %format_size(total_size),
        projects = total_projects,
        exports = total_exports,
        "artifact prepared"
    );

    progress.done(&summary);
    Ok(summary)
}

/// Reject staging directories that would overwrite or sit inside the sources.
fn check_output_location(root: &Path, output_dir: &Path, collections: &[PathBuf]) -> Result<()> {
    let output = absolute_path(output_dir);
    if output == absolute_path(root) {
        return Err(DemoIndexError::validation(format!(
            "output directory {} is the site root; choose a separate staging directory",
            output_dir.display()
        )));
    }
    for collection in collections {
        if output.starts_with(absolute_path(collection)) {
            return Err(DemoIndexError::validation(format!(
                "output directory {} is inside project collection {}",
                output_dir.display(),
                collection.display()
            )));
        }
    }
    Ok(())
}

/// Canonical form of `path`, resolving through the nearest existing ancestor
/// when the path itself does not exist yet.
fn absolute_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            absolute_path(parent).join(name)
        }
        _ => path.to_path_buf(),
    }
}

/// Recursively copy `src` into `dest`, skipping anything the filter excludes.
/// Returns `(files copied, bytes copied)`.
pub fn copy_filtered(src: &Path, dest: &Path, filter: &ExclusionFilter) -> Result<(usize, u64)> {
    let mut files = 0;
    let mut bytes = 0;

    let walker = WalkDir::new(src)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !filter.is_excluded(&e.file_name().to_string_lossy()));

    for entry in walker {
        let entry = entry.map_err(|e| DemoIndexError::walk(src, e.to_string()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| DemoIndexError::walk(entry.path(), e.to_string()))?;
        let target = dest.join(rel);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| DemoIndexError::io(&target, e))?;
        } else if file_type.is_file() || entry.path().is_file() {
            let copied = fs::copy(entry.path(), &target)
                .map_err(|e| DemoIndexError::io(entry.path(), e))?;
            files += 1;
            bytes += copied;
        } else {
            debug!(path = %entry.path().display(), "skipping non-file entry");
        }
    }

    Ok((files, bytes))
}

/// Count files and their total size under `dir`.
pub fn dir_stats(dir: &Path) -> (usize, u64) {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .fold((0, 0), |(n, size), e| {
            (n + 1, size + e.metadata().map(|m| m.len()).unwrap_or(0))
        })
}

/// Format a byte count with a binary unit, e.g. `1.5KB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.1}{unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1}TB")
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
