//! Shared types, error model, and configuration for demoindex.
//!
//! This crate is the foundation depended on by all other demoindex crates.
//! It provides:
//! - [`DemoIndexError`], the unified error type
//! - Domain types ([`ProjectEntry`], [`ArtifactInfo`], [`ValidationReport`])
//! - Configuration ([`BuildConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    BuildConfig, CONFIG_FILE_NAME, DEFAULT_MAX_FAILURE_RATE, DeploymentConfig, LoggingConfig,
    StructureConfig, find_config_file, init_config, load_config, load_config_from,
};
pub use error::{DemoIndexError, Result};
pub use types::{
    ArtifactInfo, ArtifactType, IssueKind, ProjectEntry, Severity, SidebarStats,
    ValidationReport, path_segments,
};
