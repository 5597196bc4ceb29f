//! Pipeline configuration management for `pagepack.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build] (+ [build.alias], [build.templates])
//! │   ├── purge      # [purge] (+ [purge.safelist])
//! │   └── serve      # [serve]
//! ├── types/         # Diagnostics, field paths, global handle
//! ├── util.rs        # Config file discovery
//! └── mod.rs         # PipelineConfig (this file)
//! ```
//!
//! The config file is optional: without one every section takes its
//! defaults and the project root is the current directory.

pub mod section;
pub mod types;
mod util;

pub use section::{BuildSectionConfig, PurgeConfig, SafelistConfig, ServeConfig, TemplatesConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config, reload_config};

use crate::cli::{BuildArgs, Cli, Commands};
use crate::core::BuildMode;
use crate::{debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use util::find_config_file;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing pagepack.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Build mode. CLI `--mode` wins; otherwise the command decides.
    #[serde(default)]
    pub mode: Option<BuildMode>,

    #[serde(default)]
    pub build: BuildSectionConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub purge: PurgeConfig,
}

impl PipelineConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is
    /// the config file's directory, or cwd when no file exists.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (config_path, mut config) = match find_config_file(&cli.config) {
            Some(path) => {
                let config = Self::from_path(&path)?;
                (path, config)
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                (cwd.join(&cli.config), Self::default())
            }
        };

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);

        config.config_path = config_path;
        config.cli = Some(cli);
        config.normalize_paths(&root);
        config.apply_command_options(cli);
        config.validate()?;

        Ok(config)
    }

    /// Defaults rooted at `root`, with paths normalized.
    #[cfg(test)]
    pub fn for_root(root: &Path) -> Self {
        let mut config = Self::default();
        config.config_path = root.join("pagepack.toml");
        config.normalize_paths(root);
        config
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "unknown fields in {} ignored: {}", display_path, ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Effective build mode.
    pub fn build_mode(&self) -> BuildMode {
        self.mode.unwrap_or_default()
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => {
                self.apply_build_args(build_args, BuildMode::Production);
            }
            Commands::Serve {
                build_args,
                interface,
                port,
                watch,
            } => {
                self.apply_build_args(build_args, BuildMode::Development);
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
            }
        }
    }

    /// Mode precedence: `--mode`, then `mode` in the file, then the command default.
    fn apply_build_args(&mut self, args: &BuildArgs, command_default: BuildMode) {
        crate::logger::set_verbose(args.verbose);

        self.mode = Some(args.mode.or(self.mode).unwrap_or(command_default));
        self.build.clean = args.clean;
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to the root directory.
    fn normalize_paths(&mut self, root: &Path) {
        let root = crate::utils::path::normalize_path(root);
        self.config_path = crate::utils::path::normalize_path(&self.config_path);
        self.build.normalize(&root);
        self.purge.normalize(&root, &self.build.source);
        self.root = root;
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting all errors at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&mut diag);
        self.serve.validate(&mut diag);
        self.purge.validate(&mut diag);

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from a TOML snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PipelineConfig {
    let (parsed, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(PipelineConfig::from_str("[build\nsource = \"src\"").is_err());
    }

    #[test]
    fn test_mode_in_file() {
        let config = test_parse_config("mode = \"development\"");
        assert_eq!(config.mode, Some(BuildMode::Development));
        assert_eq!(config.build_mode(), BuildMode::Development);
    }

    #[test]
    fn test_mode_defaults_to_production() {
        let config = test_parse_config("");
        assert_eq!(config.mode, None);
        assert_eq!(config.build_mode(), BuildMode::Production);
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[build]\nsource = \"pages\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.build.source, PathBuf::from("pages"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_for_root_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let root = crate::utils::path::normalize_path(dir.path());
        let config = PipelineConfig::for_root(dir.path());

        assert_eq!(config.root, root);
        assert_eq!(config.build.source, root.join("src"));
        assert_eq!(config.build.output, root.join("dist"));
        assert_eq!(config.build.entry, root.join("src/js/main.js"));
        assert_eq!(config.purge.content.len(), 1);
    }

    #[test]
    fn test_validate_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::for_root(dir.path());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ok() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        let config = PipelineConfig::for_root(dir.path());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_root_relative() {
        let config = PipelineConfig {
            root: PathBuf::from("/site"),
            ..Default::default()
        };
        assert_eq!(
            config.root_relative("/site/src/index.html"),
            PathBuf::from("src/index.html")
        );
        assert_eq!(config.root_relative("/other/x"), PathBuf::from("/other/x"));
    }
}
