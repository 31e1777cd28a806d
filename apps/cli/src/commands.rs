//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use demoindex_artifacts::{
    DeploymentPolicy, DeploymentReport, PackageSummary, PackagerOptions, ProgressReporter,
    SilentProgress, clean_build_artifacts, create_deployment_summary, format_size,
    prepare_documentation_artifact, validate_for_deployment, verify_build_results,
};
use demoindex_core::{ModeSelection, SidebarOptions, generate_sidebar};
use demoindex_shared::{
    BuildConfig, CONFIG_FILE_NAME, DemoIndexError, find_config_file, init_config, load_config,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// demoindex: navigation outline and deployment artifact builder.
#[derive(Parser)]
#[command(
    name = "demoindex",
    version,
    about = "Generate the sidebar outline for a tree of demo projects and package it for deployment.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to the build config (defaults to searching for build_config.json).
    #[arg(long, global = true, env = "DEMOINDEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Outline layout.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum ModeArg {
    Auto,
    Flat,
    Hierarchical,
}

impl From<ModeArg> for ModeSelection {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => ModeSelection::Auto,
            ModeArg::Flat => ModeSelection::Flat,
            ModeArg::Hierarchical => ModeSelection::Hierarchical,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate the sidebar outline from the projects tree.
    Sidebar {
        /// Projects directory (defaults to the configured one).
        #[arg(long)]
        projects_dir: Option<PathBuf>,

        /// Output file (defaults to the configured sidebar file).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Link prefix (defaults to the configured projects directory name).
        #[arg(long)]
        base_path: Option<String>,

        /// Check every emitted link and fail on problems.
        #[arg(long)]
        validate: bool,

        /// Outline layout.
        #[arg(long, value_enum, default_value = "auto")]
        mode: ModeArg,

        /// Print the generation report.
        #[arg(long)]
        report: bool,
    },

    /// Copy documentation and project collections into a staging directory.
    Package {
        /// Site root (defaults to the configured one).
        #[arg(long)]
        root_dir: Option<PathBuf>,

        /// Staging directory (defaults to <root>/artifact_staging).
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Skip deployment validation after packaging.
        #[arg(long)]
        skip_validation: bool,
    },

    /// Check a staged artifact before deployment.
    Validate {
        /// Artifact directory.
        artifact_dir: PathBuf,
    },

    /// Count projects and web exports (prints JSON).
    Verify {
        /// Projects directory.
        projects_dir: PathBuf,
    },

    /// Remove exports and engine caches from a projects tree.
    Clean {
        /// Projects directory.
        projects_dir: PathBuf,
    },

    /// Describe a staged artifact (prints JSON).
    Summary {
        /// Artifact directory.
        artifact_dir: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a config file with defaults.
    Init {
        /// Where to write it.
        #[arg(long, default_value = CONFIG_FILE_NAME)]
        path: PathBuf,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "demoindex=info",
        1 => "demoindex=debug",
        _ => "demoindex=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Sidebar {
            projects_dir,
            output,
            base_path,
            validate,
            mode,
            report,
        } => {
            let config = resolve_config(config_path)?;
            cmd_sidebar(
                &config,
                projects_dir,
                output,
                base_path,
                validate,
                mode.into(),
                report,
            )
        }
        Command::Package {
            root_dir,
            output_dir,
            skip_validation,
        } => {
            let config = resolve_config(config_path)?;
            cmd_package(&config, root_dir, output_dir.as_deref(), skip_validation)
        }
        Command::Validate { artifact_dir } => {
            let config = resolve_config(config_path)?;
            cmd_validate(&config, &artifact_dir)
        }
        Command::Verify { projects_dir } => cmd_verify(&projects_dir),
        Command::Clean { projects_dir } => cmd_clean(&projects_dir),
        Command::Summary { artifact_dir } => cmd_summary(&artifact_dir),
        Command::Config { action } => match action {
            ConfigAction::Init { path } => cmd_config_init(&path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

/// Load the explicit config, or the nearest `build_config.json`, or defaults.
fn resolve_config(path: Option<&Path>) -> Result<BuildConfig> {
    if path.is_some() {
        return Ok(load_config(path)?);
    }
    let cwd = std::env::current_dir()?;
    match find_config_file(&cwd) {
        Some(found) => Ok(load_config(Some(&found))?),
        None => {
            debug!("no {CONFIG_FILE_NAME} found, using defaults");
            Ok(BuildConfig::default())
        }
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_sidebar(
    config: &BuildConfig,
    projects_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    base_path: Option<String>,
    validate: bool,
    mode: ModeSelection,
    print_report: bool,
) -> Result<()> {
    let site_root = PathBuf::from(&config.structure.site_root);
    let projects_dir =
        projects_dir.unwrap_or_else(|| site_root.join(&config.structure.projects_dir));
    let output = output.unwrap_or_else(|| site_root.join(&config.structure.sidebar_file));

    let mut opts = SidebarOptions::from_config(config)?;
    opts.mode = mode;
    opts.validate = validate;
    if let Some(base) = base_path {
        opts.base_path = base;
    }

    info!(
        projects_dir = %projects_dir.display(),
        output = %output.display(),
        "generating sidebar"
    );

    let result = generate_sidebar(&projects_dir, &opts);

    if config.dry_run_mode {
        print!("{}", result.content);
    } else {
        std::fs::write(&output, &result.content)
            .map_err(|e| DemoIndexError::io(&output, e))?;
        println!("Sidebar written to: {}", output.display());
    }

    if print_report || config.verbose_output {
        println!("{}", result.report.render());
    }

    if result.report.has_errors() {
        return Err(eyre!(
            "sidebar generation finished with {} error(s)",
            result.report.errors.len()
        ));
    }
    Ok(())
}

fn cmd_package(
    config: &BuildConfig,
    root_dir: Option<PathBuf>,
    output_dir: Option<&Path>,
    skip_validation: bool,
) -> Result<()> {
    let root = root_dir.unwrap_or_else(|| PathBuf::from(&config.structure.site_root));
    let opts = PackagerOptions::from(config);

    info!(root = %root.display(), "packaging documentation artifact");

    let summary = if config.logging.progress_updates {
        let reporter = CliProgress::new();
        prepare_documentation_artifact(&root, output_dir, &opts, &reporter)?
    } else {
        prepare_documentation_artifact(&root, output_dir, &opts, &SilentProgress)?
    };

    println!();
    println!("  Artifact prepared!");
    println!("  Path:     {}", summary.output_dir.display());
    println!("  Files:    {}", summary.total_files);
    println!("  Size:     {}", format_size(summary.total_size));
    println!("  Projects: {}", summary.total_projects);
    println!("  Exports:  {}", summary.total_exports);
    println!("  Time:     {:.1}s", summary.elapsed_secs);
    println!();

    if skip_validation {
        return Ok(());
    }

    let report = validate_for_deployment(&summary.output_dir, &DeploymentPolicy::from(config))?;
    finish_validation(&report)
}

fn cmd_validate(config: &BuildConfig, artifact_dir: &Path) -> Result<()> {
    info!(artifact_dir = %artifact_dir.display(), "validating artifact");
    let report = validate_for_deployment(artifact_dir, &DeploymentPolicy::from(config))?;
    finish_validation(&report)
}

fn finish_validation(report: &DeploymentReport) -> Result<()> {
    if !report.warnings.is_empty() {
        println!("WARNINGS:");
        for w in &report.warnings {
            println!("  - {w}");
        }
    }
    if report.is_deployable() {
        println!("Artifact is ready for deployment.");
        return Ok(());
    }

    println!("ISSUES:");
    for issue in &report.issues {
        println!("  - {issue}");
    }
    Err(eyre!(
        "artifact failed validation with {} issue(s)",
        report.issues.len()
    ))
}

fn cmd_verify(projects_dir: &Path) -> Result<()> {
    let verification = verify_build_results(projects_dir);
    println!("{}", serde_json::to_string_pretty(&verification)?);
    Ok(())
}

fn cmd_clean(projects_dir: &Path) -> Result<()> {
    if !projects_dir.is_dir() {
        return Err(eyre!(
            "projects directory not found: {}",
            projects_dir.display()
        ));
    }
    let removed = clean_build_artifacts(projects_dir);
    println!("Removed {removed} build artifact(s).");
    Ok(())
}

fn cmd_summary(artifact_dir: &Path) -> Result<()> {
    let summary = create_deployment_summary(artifact_dir)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_config_init(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(eyre!("config already exists at '{}'", path.display()));
    }
    let path = init_config(path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn item_copied(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Copied [{current}/{total}] {name}"));
    }

    fn done(&self, _summary: &PackageSummary) {
        self.spinner.finish_and_clear();
    }
}
