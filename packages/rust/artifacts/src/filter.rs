//! Name-based exclusion of engine binaries, caches, and templates.

use demoindex_shared::BuildConfig;

/// Names dropped regardless of configuration.
const ALWAYS_EXCLUDED: &[&str] = &[".import", "build_cache.json", ".godot"];
const ALWAYS_EXCLUDED_SUFFIXES: &[&str] = &[".tmp", ".log"];

const BINARY_NAMES: &[&str] = &["godot", "godot.exe"];
const BINARY_SUFFIXES: &[&str] = &[".dmg", ".app"];

const TEMPLATE_NAMES: &[&str] = &["export_templates"];
const TEMPLATE_SUFFIXES: &[&str] = &[".tpz"];

/// Decides which files and directories stay out of a deployable artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionFilter {
    /// Drop engine executables and installers.
    pub exclude_binaries: bool,
    /// Drop export templates.
    pub exclude_templates: bool,
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self {
            exclude_binaries: true,
            exclude_templates: true,
        }
    }
}

impl From<&BuildConfig> for ExclusionFilter {
    fn from(config: &BuildConfig) -> Self {
        Self {
            exclude_binaries: config.deployment.exclude_godot_binaries,
            exclude_templates: config.deployment.exclude_templates,
        }
    }
}

impl ExclusionFilter {
    /// Whether a file or directory with this name is excluded.
    pub fn is_excluded(&self, name: &str) -> bool {
        if name.starts_with(".git")
            || ALWAYS_EXCLUDED.contains(&name)
            || ALWAYS_EXCLUDED_SUFFIXES.iter().any(|s| name.ends_with(s))
        {
            return true;
        }

        if self.exclude_binaries && is_engine_binary(name) {
            return true;
        }

        self.exclude_templates && is_template(name)
    }
}

fn is_engine_binary(name: &str) -> bool {
    if BINARY_NAMES.contains(&name)
        || BINARY_SUFFIXES.iter().any(|s| name.ends_with(s))
        || name.starts_with("Godot_v")
    {
        return true;
    }
    let lower = name.to_lowercase();
    lower.starts_with("godot") && (lower.ends_with(".exe") || !lower.contains('.'))
}

fn is_template(name: &str) -> bool {
    TEMPLATE_NAMES.contains(&name)
        || TEMPLATE_SUFFIXES.iter().any(|s| name.ends_with(s))
        || name.to_lowercase().contains("template")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_excluded_names() {
        let filter = ExclusionFilter {
            exclude_binaries: false,
            exclude_templates: false,
        };
        for name in [".git", ".gitignore", ".gitmodules", ".import", ".godot", "build_cache.json", "export.log", "scratch.tmp"] {
            assert!(filter.is_excluded(name), "{name} should be excluded");
        }
        for name in ["project.godot", "README.md", "index.wasm", "godot", "web.tpz"] {
            assert!(!filter.is_excluded(name), "{name} should be kept");
        }
    }

    #[test]
    fn binaries_when_enabled() {
        let filter = ExclusionFilter::default();
        for name in ["godot", "godot.exe", "Godot_v4.5-beta1_linux.x86_64", "Godot.app", "installer.dmg", "godot4"] {
            assert!(filter.is_excluded(name), "{name} should be excluded");
        }
        assert!(!filter.is_excluded("project.godot"));
        assert!(!filter.is_excluded("icon.svg"));
    }

    #[test]
    fn templates_when_enabled() {
        let filter = ExclusionFilter::default();
        assert!(filter.is_excluded("export_templates"));
        assert!(filter.is_excluded("Godot_v4.5-stable_export_templates.tpz"));
        assert!(filter.is_excluded("web_template_debug.zip"));

        let keep_templates = ExclusionFilter {
            exclude_templates: false,
            ..ExclusionFilter::default()
        };
        assert!(!keep_templates.is_excluded("web_template_debug.zip"));
    }

    #[test]
    fn from_config_flags() {
        let mut config = BuildConfig::default();
        config.deployment.exclude_godot_binaries = false;
        let filter = ExclusionFilter::from(&config);
        assert!(!filter.exclude_binaries);
        assert!(filter.exclude_templates);
    }
}
