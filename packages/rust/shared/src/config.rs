//! Build system configuration.
//!
//! The configuration lives in `build_config.json` at the project root and is
//! produced by the configuration wizard. It is read-only for everything in
//! this workspace. A TOML rendition is accepted when the file has a `.toml`
//! extension.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DemoIndexError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "build_config.json";

// ---------------------------------------------------------------------------
// Config structs (matching build_config.json schema)
// ---------------------------------------------------------------------------

/// Top-level build configuration.
///
/// Plain values and arrays come before the nested tables so the struct
/// serializes cleanly to TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub godot_version: Option<String>,
    /// `None` lets the build pick a worker count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel_jobs: Option<u32>,
    #[serde(default = "default_true")]
    pub enable_web_exports: bool,
    #[serde(default = "default_true")]
    pub enable_documentation_generation: bool,
    #[serde(default = "default_true")]
    pub enable_embed_injection: bool,
    #[serde(default = "default_true")]
    pub enable_sidebar_generation: bool,
    #[serde(default = "default_true")]
    pub enable_caching: bool,
    #[serde(default)]
    pub verbose_output: bool,
    #[serde(default)]
    pub dry_run_mode: bool,

    /// Globs a manifest's relative path must match to count as a project.
    #[serde(default = "default_include_patterns")]
    pub project_include_patterns: Vec<String>,

    /// Globs that prune paths from discovery.
    #[serde(default = "default_exclude_patterns")]
    pub project_exclude_patterns: Vec<String>,

    /// `[structure]` section.
    #[serde(default)]
    pub structure: StructureConfig,

    /// `[logging]` section.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// `[deployment]` section.
    #[serde(default)]
    pub deployment: DeploymentConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            project_url: None,
            godot_version: None,
            max_parallel_jobs: None,
            enable_web_exports: true,
            enable_documentation_generation: true,
            enable_embed_injection: true,
            enable_sidebar_generation: true,
            enable_caching: true,
            verbose_output: false,
            dry_run_mode: false,
            project_include_patterns: default_include_patterns(),
            project_exclude_patterns: default_exclude_patterns(),
            structure: StructureConfig::default(),
            logging: LoggingConfig::default(),
            deployment: DeploymentConfig::default(),
        }
    }
}

fn default_project_name() -> String {
    "Godot Examples Documentation".into()
}
fn default_true() -> bool {
    true
}
fn default_include_patterns() -> Vec<String> {
    vec!["**/project.godot".into()]
}
fn default_exclude_patterns() -> Vec<String> {
    vec![
        "**/.*".into(),
        "**/addons/godot-git-plugin/**".into(),
        "**/exports/**".into(),
    ]
}

/// `[structure]` section: where things live relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Directory holding the demo projects; also the base path of outline links.
    #[serde(default = "default_projects_dir")]
    pub projects_dir: String,
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "default_site_root")]
    pub site_root: String,
    /// Outline file name.
    #[serde(default = "default_sidebar_file")]
    pub sidebar_file: String,
    /// Site index page name.
    #[serde(default = "default_index_file")]
    pub index_file: String,
    /// Per-project export location.
    #[serde(default = "default_exports_subdir")]
    pub exports_subdir: String,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            projects_dir: default_projects_dir(),
            docs_dir: default_docs_dir(),
            cache_dir: default_cache_dir(),
            site_root: default_site_root(),
            sidebar_file: default_sidebar_file(),
            index_file: default_index_file(),
            exports_subdir: default_exports_subdir(),
        }
    }
}

fn default_projects_dir() -> String {
    "godot-demo-projects".into()
}
fn default_docs_dir() -> String {
    "docs".into()
}
fn default_cache_dir() -> String {
    ".build_cache".into()
}
fn default_site_root() -> String {
    ".".into()
}
fn default_sidebar_file() -> String {
    "_sidebar.md".into()
}
fn default_index_file() -> String {
    "index.html".into()
}
fn default_exports_subdir() -> String {
    "exports/web".into()
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose_downloads: bool,
    #[serde(default = "default_true")]
    pub progress_updates: bool,
    #[serde(default)]
    pub ci_mode: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            verbose_downloads: false,
            progress_updates: true,
            ci_mode: false,
        }
    }
}

/// `[deployment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default = "default_true")]
    pub allow_partial_failures: bool,
    /// Percentage of incomplete exports tolerated before they become errors.
    #[serde(default = "default_max_failure_rate")]
    pub max_failure_rate: f64,
    #[serde(default = "default_true")]
    pub exclude_godot_binaries: bool,
    #[serde(default = "default_true")]
    pub exclude_templates: bool,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            allow_partial_failures: true,
            max_failure_rate: default_max_failure_rate(),
            exclude_godot_binaries: true,
            exclude_templates: true,
        }
    }
}

/// Default tolerated failure rate, in percent.
pub const DEFAULT_MAX_FAILURE_RATE: f64 = 10.0;

fn default_max_failure_rate() -> f64 {
    DEFAULT_MAX_FAILURE_RATE
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Locate `build_config.json` in `start` or any of its ancestors.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Load the build config.
///
/// With an explicit path, that file is read. Otherwise the current directory
/// and its ancestors are searched for `build_config.json`.
pub fn load_config(path: Option<&Path>) -> Result<BuildConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| DemoIndexError::io(".", e))?;
            find_config_file(&cwd).ok_or_else(|| {
                DemoIndexError::config(format!(
                    "{CONFIG_FILE_NAME} not found. Please run the configuration wizard."
                ))
            })?
        }
    };

    if !path.exists() {
        return Err(DemoIndexError::config(format!(
            "{} not found. Please run the configuration wizard.",
            path.display()
        )));
    }

    tracing::debug!(path = %path.display(), "loading build config");
    load_config_from(&path)
}

/// Load the build config from a specific file path (JSON, or TOML by extension).
pub fn load_config_from(path: &Path) -> Result<BuildConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DemoIndexError::io(path, e))?;

    if is_toml(path) {
        toml::from_str(&content).map_err(|e| {
            DemoIndexError::config(format!("failed to parse {}: {e}", path.display()))
        })
    } else {
        serde_json::from_str(&content).map_err(|e| {
            DemoIndexError::config(format!("failed to parse {}: {e}", path.display()))
        })
    }
}

/// Write a default config file to `path` (JSON, or TOML by extension).
pub fn init_config(path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DemoIndexError::io(parent, e))?;
    }

    let config = BuildConfig::default();
    let content = if is_toml(path) {
        toml::to_string_pretty(&config).map_err(|e| DemoIndexError::config(e.to_string()))?
    } else {
        serde_json::to_string_pretty(&config)
            .map_err(|e| DemoIndexError::config(e.to_string()))?
    };

    std::fs::write(path, content).map_err(|e| DemoIndexError::io(path, e))?;
    tracing::info!(path = %path.display(), "created default config file");

    Ok(path.to_path_buf())
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}
