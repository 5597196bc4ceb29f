//! Import specifier resolution.
//!
//! | Specifier        | Resolved against        |
//! |------------------|-------------------------|
//! | `./x`, `../x`    | the importing file      |
//! | `/x`             | the project root        |
//! | `name`, `name/x` | `build.alias` only      |

use super::BundleError;
use crate::utils::path::clean_path;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Suffixes tried, in order, after the literal path.
const SUFFIXES: &[&str] = &["", ".js", ".mjs", "/index.js"];

/// Maps import specifiers to files.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    root: &'a Path,
    alias: &'a BTreeMap<String, PathBuf>,
}

impl<'a> Resolver<'a> {
    pub fn new(root: &'a Path, alias: &'a BTreeMap<String, PathBuf>) -> Self {
        Self { root, alias }
    }

    pub fn resolve(&self, specifier: &str, importer: &Path) -> Result<PathBuf, BundleError> {
        let unresolved = || BundleError::Unresolved {
            specifier: specifier.to_string(),
            importer: importer.to_path_buf(),
        };

        let base = if specifier.starts_with("./") || specifier.starts_with("../") {
            let dir = importer.parent().ok_or_else(unresolved)?;
            dir.join(specifier)
        } else if let Some(rest) = specifier.strip_prefix('/') {
            self.root.join(rest)
        } else {
            self.alias_target(specifier).ok_or_else(unresolved)?
        };

        first_existing(&clean_path(&base)).ok_or_else(unresolved)
    }

    /// Exact alias key first, then the longest `key/` prefix.
    fn alias_target(&self, specifier: &str) -> Option<PathBuf> {
        if let Some(target) = self.alias.get(specifier) {
            return Some(target.clone());
        }
        self.alias
            .iter()
            .filter_map(|(key, target)| {
                let rest = specifier.strip_prefix(key.as_str())?.strip_prefix('/')?;
                Some((key.len(), target.join(rest)))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, path)| path)
    }
}

fn first_existing(base: &Path) -> Option<PathBuf> {
    SUFFIXES.iter().find_map(|suffix| {
        let mut candidate = base.as_os_str().to_owned();
        candidate.push(suffix);
        let candidate = PathBuf::from(candidate);
        candidate.is_file().then_some(candidate)
    })
}
