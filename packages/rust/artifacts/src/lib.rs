//! Packaging and pre-deployment validation of the static documentation site.
//!
//! The packager copies documentation files and project collections into a
//! staging directory while dropping engine binaries, caches, and templates.
//! The validator then checks the staged tree for required files and web
//! export completeness before it is published.

pub mod clean;
pub mod export;
pub mod filter;
pub mod package;
pub mod summary;
pub mod validate;
pub mod verify;

pub use clean::clean_build_artifacts;
pub use export::{ExportCheck, ExportKind, check_export, check_exports, find_exports};
pub use filter::ExclusionFilter;
pub use package::{
    PackageSummary, PackagerOptions, ProgressReporter, STAGING_DIR, SilentProgress,
    collection_dirs, format_size, is_collection_dir, prepare_documentation_artifact,
};
pub use summary::{DeploymentSummary, create_deployment_summary};
pub use validate::{
    DeploymentPolicy, DeploymentReport, FailureOutcome, apply_failure_policy,
    validate_for_deployment,
};
pub use verify::{BuildVerification, ExportRecord, verify_build_results};
