//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"                  # Template directory (flat listing)
//! entry = "src/js/main.js"        # JavaScript entry point
//! output = "dist"                 # Output directory
//! styles = []                     # Extra stylesheet entries (after JS-imported ones)
//! targets = ["defaults"]          # Browserslist queries for vendor prefixing
//! load_paths = ["node_modules"]   # SCSS load paths (default: node_modules if present)
//!
//! [build.alias]
//! bootstrap = "node_modules/bootstrap/dist/js/bootstrap.esm.js"
//!
//! [build.templates]
//! extensions = ["html"]
//! inject = "body"                 # Where <script> tags go: body | head
//! overrides = { "legacy.html" = "head" }
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::page::InjectionPoint;
use lightningcss::targets::Browsers;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Directory scanned for page templates.
    pub source: PathBuf,

    /// JavaScript entry point.
    pub entry: PathBuf,

    /// Build output directory.
    pub output: PathBuf,

    /// Stylesheet entries compiled after the ones imported from JavaScript.
    pub styles: Vec<PathBuf>,

    /// Browserslist queries for vendor prefixing.
    pub targets: Vec<String>,

    /// Extra SCSS load paths, searched after the entry and source directories.
    pub load_paths: Vec<PathBuf>,

    /// Bare import specifier → file.
    pub alias: BTreeMap<String, PathBuf>,

    /// Page template discovery and injection.
    pub templates: TemplatesConfig,

    /// Remove the output directory before writing (CLI only).
    #[serde(skip)]
    pub clean: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            source: "src".into(),
            entry: "src/js/main.js".into(),
            output: "dist".into(),
            styles: Vec::new(),
            targets: vec!["defaults".into()],
            load_paths: Vec::new(),
            alias: BTreeMap::new(),
            templates: TemplatesConfig::default(),
            clean: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Recognized template extensions (without the dot).
    pub extensions: Vec<String>,

    /// Default script injection point.
    pub inject: InjectionPoint,

    /// Per-file injection point, keyed by template file name.
    pub overrides: BTreeMap<String, InjectionPoint>,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["html".into()],
            inject: InjectionPoint::Body,
            overrides: BTreeMap::new(),
        }
    }
}

impl TemplatesConfig {
    /// Injection point for a template file name.
    pub fn injection_for(&self, file_name: &str) -> InjectionPoint {
        self.overrides.get(file_name).copied().unwrap_or(self.inject)
    }

    /// Whether `path` carries a recognized template extension.
    pub fn is_template(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}

impl BuildSectionConfig {
    const SOURCE: FieldPath = FieldPath::new("build.source");
    const ENTRY: FieldPath = FieldPath::new("build.entry");
    const TARGETS: FieldPath = FieldPath::new("build.targets");
    const EXTENSIONS: FieldPath = FieldPath::new("build.templates.extensions");
    const STYLES: FieldPath = FieldPath::new("build.styles");
    const LOAD_PATHS: FieldPath = FieldPath::new("build.load_paths");

    /// Resolve every path against the project root.
    pub fn normalize(&mut self, root: &Path) {
        use crate::utils::path::normalize_path;

        self.source = normalize_path(&root.join(&self.source));
        self.entry = normalize_path(&root.join(&self.entry));
        self.output = normalize_path(&root.join(&self.output));
        self.styles = self
            .styles
            .iter()
            .map(|p| normalize_path(&root.join(p)))
            .collect();
        for target in self.alias.values_mut() {
            *target = normalize_path(&root.join(&*target));
        }

        if self.load_paths.is_empty() {
            let modules = root.join("node_modules");
            if modules.is_dir() {
                self.load_paths.push(normalize_path(&modules));
            }
        } else {
            self.load_paths = self
                .load_paths
                .iter()
                .map(|p| normalize_path(&root.join(p)))
                .collect();
        }
    }

    /// Parse `targets` into lightningcss browser versions.
    pub fn browsers(&self) -> Result<Option<Browsers>, String> {
        if self.targets.is_empty() {
            return Ok(None);
        }
        Browsers::from_browserslist(self.targets.iter().map(String::as_str))
            .map_err(|e| e.to_string())
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.source.is_dir() {
            diag.error_with_hint(
                Self::SOURCE,
                format!("directory not found: {}", self.source.display()),
                "create it or point `build.source` at your templates",
            );
        }

        if !self.entry.is_file() {
            diag.warn(
                Self::ENTRY,
                format!("entry not found, no script bundle: {}", self.entry.display()),
            );
        }

        if let Err(e) = self.browsers() {
            diag.error(Self::TARGETS, format!("invalid browserslist query: {e}"));
        }

        if self.templates.extensions.is_empty() {
            diag.error(Self::EXTENSIONS, "at least one template extension is required");
        }

        for style in &self.styles {
            if !style.is_file() {
                diag.warn(
                    Self::STYLES,
                    format!("stylesheet entry not found: {}", style.display()),
                );
            }
        }

        for dir in &self.load_paths {
            if !dir.is_dir() {
                diag.warn(
                    Self::LOAD_PATHS,
                    format!("load path not found: {}", dir.display()),
                );
            }
        }
    }
}
