//! `[purge]` section configuration.
//!
//! Only consulted in production mode.
//!
//! # Example
//!
//! ```toml
//! [purge]
//! content = ["src/**/*.html", "src/js/**/*.js"]   # Default: "<source>/**/*"
//! variables = false                               # Also drop unused custom properties
//!
//! [purge.safelist]
//! standard = ["active", "btn-*", "/^col-/"]       # exact, prefix/suffix with `*`, /regex/
//! deep = ["^modal"]                               # protects the match and its descendants
//! greedy = ["^tooltip"]                           # protects every class in a matching selector
//! keyframes = ["spin"]
//! variables = ["--brand"]
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::purge::Safelist;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PurgeConfig {
    /// Glob patterns selecting the files scanned for tokens.
    pub content: Vec<String>,

    /// Remove unused custom properties.
    pub variables: bool,

    pub safelist: SafelistConfig,
}

/// Raw safelist entries as written in the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SafelistConfig {
    pub standard: Vec<String>,
    pub deep: Vec<String>,
    pub greedy: Vec<String>,
    pub keyframes: Vec<String>,
    pub variables: Vec<String>,
}

impl PurgeConfig {
    const SAFELIST: FieldPath = FieldPath::new("purge.safelist");

    /// Resolve relative content globs against the project root,
    /// defaulting to everything under `source`.
    ///
    /// Directory names are escaped, so a root like `site[v2]` is matched
    /// literally.
    pub fn normalize(&mut self, root: &Path, source: &Path) {
        if self.content.is_empty() {
            let pattern = literal_dir(source).join("**").join("*");
            self.content.push(pattern.to_string_lossy().into_owned());
            return;
        }
        for pattern in &mut self.content {
            if Path::new(pattern.as_str()).is_relative() {
                let joined = literal_dir(root).join(pattern.as_str());
                *pattern = joined.to_string_lossy().into_owned();
            }
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Err(e) = Safelist::from_config(&self.safelist) {
            diag.error_with_hint(
                Self::SAFELIST,
                format!("invalid pattern: {e}"),
                "regex entries in `standard` are written as /pattern/",
            );
        }
        for pattern in &self.content {
            if let Err(e) = glob::Pattern::new(pattern) {
                diag.error(
                    FieldPath::new("purge.content"),
                    format!("invalid glob `{pattern}`: {e}"),
                );
            }
        }
    }
}

/// `dir` with glob metacharacters escaped.
fn literal_dir(dir: &Path) -> PathBuf {
    PathBuf::from(glob::Pattern::escape(&dir.to_string_lossy()))
}
