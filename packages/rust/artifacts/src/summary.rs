//! Deployment summary for a staged artifact.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use demoindex_shared::{DemoIndexError, Result};
use serde::Serialize;
use tracing::instrument;

use crate::package::{collection_dirs, dir_stats};
use crate::verify::{BuildVerification, verify_build_results};

/// Machine-readable description of what is about to be deployed.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentSummary {
    pub artifact_path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub total_size: u64,
    pub total_files: usize,
    /// Top-level files in the artifact, sorted.
    pub documentation_files: Vec<String>,
    /// Verification of each collection, keyed by directory name.
    pub collections: Vec<(String, BuildVerification)>,
}

/// Describe the artifact at `artifact_dir`.
#[instrument(skip_all, fields(artifact_dir = %artifact_dir.display()))]
pub fn create_deployment_summary(artifact_dir: &Path) -> Result<DeploymentSummary> {
    let metadata =
        std::fs::metadata(artifact_dir).map_err(|e| DemoIndexError::io(artifact_dir, e))?;
    let created_at = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    let (total_files, total_size) = dir_stats(artifact_dir);

    let mut documentation_files: Vec<String> = std::fs::read_dir(artifact_dir)
        .map_err(|e| DemoIndexError::io(artifact_dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    documentation_files.sort();

    let collections = collection_dirs(artifact_dir)?
        .into_iter()
        .map(|dir| {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (name, verify_build_results(&dir))
        })
        .collect();

    Ok(DeploymentSummary {
        artifact_path: artifact_dir.to_path_buf(),
        created_at,
        total_size,
        total_files,
        documentation_files,
        collections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn summarizes_files_and_collections() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("index.html"), "12345").unwrap();
        fs::write(tmp.path().join("_sidebar.md"), "123").unwrap();
        let project = tmp.path().join("godot-demo-projects/2d/a");
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("project.godot"), "12").unwrap();

        let summary = create_deployment_summary(tmp.path()).unwrap();
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.total_size, 10);
        assert_eq!(summary.documentation_files, vec!["_sidebar.md", "index.html"]);
        assert_eq!(summary.collections.len(), 1);
        assert_eq!(summary.collections[0].0, "godot-demo-projects");
        assert_eq!(summary.collections[0].1.total_projects, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["created_at"].is_string());
    }

    #[test]
    fn missing_artifact_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(create_deployment_summary(&tmp.path().join("nope")).is_err());
    }
}
