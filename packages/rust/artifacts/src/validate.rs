//! Pre-deployment checks on a staged artifact.

use std::path::Path;

use demoindex_discovery::{DiscoveryOptions, find_manifests};
use demoindex_shared::{BuildConfig, IssueKind, Result, Severity};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use walkdir::WalkDir;

use crate::export::{ExportCheck, check_exports};
use crate::filter::ExclusionFilter;
use crate::package::{collection_dirs, is_collection_dir};

/// Incomplete exports listed individually when within tolerance.
const WARNING_PREVIEW: usize = 5;

/// Thresholds and expectations for a deployable artifact.
#[derive(Debug, Clone)]
pub struct DeploymentPolicy {
    /// Highest tolerated percentage of projects with an incomplete export.
    pub max_failure_rate: f64,
    /// Files that must sit at the artifact root.
    pub required_docs: Vec<String>,
    pub filter: ExclusionFilter,
}

impl From<&BuildConfig> for DeploymentPolicy {
    fn from(config: &BuildConfig) -> Self {
        Self {
            max_failure_rate: config.deployment.max_failure_rate,
            required_docs: vec![
                config.structure.index_file.clone(),
                config.structure.sidebar_file.clone(),
            ],
            filter: ExclusionFilter::from(config),
        }
    }
}

impl Default for DeploymentPolicy {
    fn default() -> Self {
        Self::from(&BuildConfig::default())
    }
}

/// Findings of a deployment validation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeploymentReport {
    /// Blocking problems.
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub total_projects: usize,
    pub web_exports: usize,
    pub incomplete_exports: usize,
    /// Percentage of projects with an incomplete export, when exports exist.
    pub failure_rate: Option<f64>,
}

impl DeploymentReport {
    pub fn is_deployable(&self) -> bool {
        self.issues.is_empty()
    }

    fn record(&mut self, severity: Severity, kind: IssueKind, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Error => {
                error!(kind = %kind, "{message}");
                self.issues.push(message);
            }
            Severity::Warning => {
                warn!(kind = %kind, "{message}");
                self.warnings.push(message);
            }
        }
    }
}

/// How incomplete exports were classified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureOutcome {
    pub failure_rate: f64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Classify incomplete exports against the tolerated failure rate.
///
/// Within tolerance only the first few become warnings, followed by a count
/// of the rest. Over tolerance every one becomes an error. With no projects
/// counted, any incomplete export is over tolerance.
pub fn apply_failure_policy(
    incomplete: &[String],
    total_projects: usize,
    max_failure_rate: f64,
) -> FailureOutcome {
    if incomplete.is_empty() {
        return FailureOutcome::default();
    }

    let failure_rate = if total_projects == 0 {
        100.0
    } else {
        incomplete.len() as f64 / total_projects as f64 * 100.0
    };

    let mut outcome = FailureOutcome {
        failure_rate,
        ..FailureOutcome::default()
    };

    if failure_rate <= max_failure_rate {
        outcome.warnings = incomplete
            .iter()
            .take(WARNING_PREVIEW)
            .map(|e| format!("Incomplete export: {e}"))
            .collect();
        if incomplete.len() > WARNING_PREVIEW {
            outcome.warnings.push(format!(
                "... and {} more incomplete exports",
                incomplete.len() - WARNING_PREVIEW
            ));
        }
    } else {
        outcome.errors = incomplete
            .iter()
            .map(|e| format!("Incomplete export: {e}"))
            .collect();
    }
    outcome
}

/// Check a staged artifact before deployment.
///
/// Structural problems are reported in the returned report. Only I/O failures
/// on the artifact root itself are returned as errors.
#[instrument(skip_all, fields(artifact_dir = %artifact_dir.display()))]
pub fn validate_for_deployment(
    artifact_dir: &Path,
    policy: &DeploymentPolicy,
) -> Result<DeploymentReport> {
    let mut report = DeploymentReport::default();

    if !artifact_dir.is_dir() {
        report.record(
            Severity::Error,
            IssueKind::MissingDirectory,
            format!("Artifact directory not found: {}", artifact_dir.display()),
        );
        return Ok(report);
    }

    for doc in &policy.required_docs {
        if !artifact_dir.join(doc).is_file() {
            report.record(
                Severity::Error,
                IssueKind::MissingDocumentation,
                format!("Missing required documentation file: {doc}"),
            );
        }
    }

    let collections = collection_dirs(artifact_dir)?;
    if collections.is_empty() {
        report.record(
            Severity::Error,
            IssueKind::NoProjectsDirectory,
            "No projects directory found in artifact",
        );
    } else {
        let mut checks: Vec<ExportCheck> = Vec::new();
        for collection in &collections {
            report.total_projects +=
                find_manifests(collection, &DiscoveryOptions::default()).len();
            checks.extend(check_exports(collection));
        }
        report.web_exports = checks.len();

        if checks.is_empty() {
            report.record(
                Severity::Error,
                IssueKind::NoExportsFound,
                "No web exports found in projects",
            );
        } else {
            let incomplete: Vec<String> = checks
                .iter()
                .filter(|c| !c.is_complete())
                .map(|c| c.describe(artifact_dir))
                .collect();
            report.incomplete_exports = incomplete.len();

            let outcome =
                apply_failure_policy(&incomplete, report.total_projects, policy.max_failure_rate);
            report.failure_rate = Some(outcome.failure_rate);
            for message in outcome.errors {
                report.record(Severity::Error, IssueKind::IncompleteExport, message);
            }
            for message in outcome.warnings {
                report.record(Severity::Warning, IssueKind::IncompleteExport, message);
            }

            if checks.iter().all(|c| !c.is_complete()) {
                report.record(
                    Severity::Error,
                    IssueKind::NoExportsFound,
                    "No complete web exports found in projects",
                );
            }
        }
    }

    let leaked = count_leaked(artifact_dir, &policy.filter);
    if leaked > 0 {
        report.record(
            Severity::Warning,
            IssueKind::LeakedExcludedItem,
            format!("Found {leaked} items that should be excluded (binaries, caches, or templates)"),
        );
    }

    info!(
        projects = report.total_projects,
        exports = report.web_exports,
        incomplete = report.incomplete_exports,
        issues = report.issues.len(),
        warnings = report.warnings.len(),
        "deployment validation finished"
    );

    Ok(report)
}

/// Count entries the exclusion filter would have dropped. Collection
/// directories themselves are not judged by name.
fn count_leaked(artifact_dir: &Path, filter: &ExclusionFilter) -> usize {
    let mut leaked = 0;
    let mut it = WalkDir::new(artifact_dir).follow_links(false).into_iter();

    while let Some(entry) = it.next() {
        let Ok(entry) = entry else { continue };
        if entry.depth() == 0 {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if entry.depth() == 1 && entry.file_type().is_dir() && is_collection_dir(&name) {
            continue;
        }
        if filter.is_excluded(&name) {
            leaked += 1;
            if entry.file_type().is_dir() {
                it.skip_current_dir();
            }
        }
    }
    leaked
}
