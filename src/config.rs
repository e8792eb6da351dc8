//! Configuration management for fragpatch
//!
//! fragpatch reads configuration from ~/.fragpatch/config.toml unless
//! --config points somewhere else. A missing file means defaults.

use crate::error_helpers;
use crate::pattern::{Pattern, PatternMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_CONTEXT_LINES: usize = 10;

/// fragpatch configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Output settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Extra recipes on top of the built-in ones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipes: Vec<RecipeConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write a debug log to ~/.fragpatch/fragpatch.log
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Allow colored dry-run output
    #[serde(default = "default_color")]
    pub color: bool,

    /// Context lines around the change in dry-run diffs
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            context_lines: default_context_lines(),
        }
    }
}

/// A recipe declared in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Target file, relative to the root directory
    pub target: PathBuf,

    /// Fragment text (or regex in "regex" mode)
    pub find: String,

    /// Literal replacement text
    pub replace: String,

    /// "tolerant" (default) or "regex"
    #[serde(default = "default_mode")]
    pub mode: String,
}

impl RecipeConfig {
    pub fn pattern_mode(&self) -> Result<PatternMode> {
        PatternMode::parse(&self.mode).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid mode for recipe '{}': {} (must be 'tolerant' or 'regex')",
                self.name,
                self.mode
            )
        })
    }
}

fn default_color() -> bool { true }
fn default_context_lines() -> usize { 3 }
fn default_mode() -> String { "tolerant".to_string() }

/// Get the default configuration file path
pub fn config_file_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;

    Ok(home_dir.join(".fragpatch").join("config.toml"))
}

/// Get the default configuration file content with comments
fn get_default_config_content() -> &'static str {
    r#"# fragpatch Configuration File
#
# Values set here can be overridden by command-line flags.

[logging]
# Write a debug log to ~/.fragpatch/fragpatch.log (default: false)
# Same as passing --debug. RUST_LOG overrides the log filter.
debug = false

[display]
# Allow colored dry-run diffs (default: true)
# Color is still disabled when stdout is not a terminal or NO_COLOR is set.
color = true

# Context lines around the change in dry-run diffs (default: 3, max: 10)
context_lines = 3

# Extra one-shot recipes. Each one replaces the first match of `find` in
# `target` (relative to --root) with `replace`, written only on change.
#
#[[recipes]]
#name = "readme-banner"
#description = "Swap the README build badge"
#target = "README.md"
#find = "[![build](old.svg)]"
#replace = "[![build](new.svg)]"
#mode = "tolerant"   # or "regex"
"#
}

/// Write the default commented configuration file
pub fn save_default_config(config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!(error_helpers::dir_create_error(parent, &e)))?;
    }

    fs::write(config_path, get_default_config_content()).with_context(|| {
        format!("Failed to write default config file: {}", config_path.display())
    })?;

    Ok(())
}

/// Load and validate configuration from an explicit path
///
/// A missing file yields the defaults; a malformed one is an error.
pub fn load_config_from(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        return Ok(Config::default());
    }

    let config_str = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    let config: Config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    validate_config(&config)
        .with_context(|| format!("Invalid config file: {}", config_path.display()))?;

    Ok(config)
}

/// Load configuration from `--config` if given, else the default location
pub fn load_config(override_path: Option<&Path>) -> Result<Config> {
    match override_path {
        Some(path) => load_config_from(path),
        None => load_config_from(&config_file_path()?),
    }
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    if config.display.context_lines > MAX_CONTEXT_LINES {
        anyhow::bail!(
            "Invalid context_lines: {} (max {})",
            config.display.context_lines,
            MAX_CONTEXT_LINES
        );
    }

    let builtin_names: Vec<&str> = crate::recipes::builtin_recipes()
        .iter()
        .map(|r| r.name)
        .collect();
    let mut seen: Vec<&str> = Vec::new();

    for recipe in &config.recipes {
        let name = recipe.name.trim();
        if name.is_empty() {
            anyhow::bail!("Recipe name must not be empty");
        }
        if builtin_names.contains(&name) {
            anyhow::bail!("Recipe '{}' shadows a built-in recipe", name);
        }
        if seen.contains(&name) {
            anyhow::bail!("Duplicate recipe name: {}", name);
        }
        seen.push(name);

        let mode = recipe.pattern_mode()?;
        Pattern::build(mode, &recipe.find)
            .with_context(|| format!("Invalid find text for recipe '{}'", name))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn recipe(name: &str, find: &str, mode: &str) -> RecipeConfig {
        RecipeConfig {
            name: name.to_string(),
            description: String::new(),
            target: PathBuf::from("file.txt"),
            find: find.to_string(),
            replace: "x".to_string(),
            mode: mode.to_string(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.logging.debug);
        assert!(config.display.color);
        assert_eq!(config.display.context_lines, 3);
        assert!(config.recipes.is_empty());
    }

    #[test]
    fn test_default_config_content_parses() {
        let config: Config = toml::from_str(get_default_config_content()).unwrap();
        assert!(validate_config(&config).is_ok());
        assert!(config.recipes.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.display.context_lines, 3);
    }

    #[test]
    fn test_load_with_recipes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[display]
context_lines = 1

[[recipes]]
name = "bump"
target = "VERSION"
find = "1.0.0"
replace = "1.0.1"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.display.context_lines, 1);
        assert!(config.display.color);
        assert_eq!(config.recipes.len(), 1);
        assert_eq!(config.recipes[0].mode, "tolerant");
        assert_eq!(config.recipes[0].target, PathBuf::from("VERSION"));
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[display\ncolor = ").unwrap();
        assert!(load_config_from(&path).is_err());
    }

    #[test]
    fn test_save_default_config_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        save_default_config(&path).unwrap();
        assert!(path.exists());
        assert!(load_config_from(&path).is_ok());
    }

    #[test]
    fn test_validate_context_lines_limit() {
        let mut config = Config::default();
        config.display.context_lines = 11;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_builtin_shadowing() {
        let mut config = Config::default();
        config.recipes.push(recipe("script-generator-grid", "a", "tolerant"));
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("shadows a built-in"));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_bad_regex() {
        let mut config = Config::default();
        config.recipes.push(recipe("one", "a", "tolerant"));
        config.recipes.push(recipe("one", "b", "tolerant"));
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.recipes.push(recipe("bad", "(open", "regex"));
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.recipes.push(recipe("mode", "a", "pcre"));
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[logging]"));
        assert!(toml_str.contains("[display]"));
    }
}
