//! Role → hashed file name mapping.
//!
//! Roles are `main.css`, `main.js` and `chunk.<n>.js`. Each role is
//! written exactly once per build.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("manifest role `{role}` already maps to `{existing}`")]
    DuplicateRole { role: String, existing: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    entries: BTreeMap<String, String>,
}

impl AssetManifest {
    pub const MAIN_CSS: &'static str = "main.css";
    pub const MAIN_JS: &'static str = "main.js";

    pub fn new() -> Self {
        Self::default()
    }

    /// Role of the n-th async chunk.
    pub fn chunk_role(index: usize) -> String {
        format!("chunk.{index}.js")
    }

    /// Record `role → path`. A second write for the same role is an error.
    pub fn insert(&mut self, role: impl Into<String>, path: impl Into<String>) -> Result<(), ManifestError> {
        use std::collections::btree_map::Entry;

        match self.entries.entry(role.into()) {
            Entry::Occupied(e) => Err(ManifestError::DuplicateRole {
                role: e.key().clone(),
                existing: e.get().clone(),
            }),
            Entry::Vacant(e) => {
                e.insert(path.into());
                Ok(())
            }
        }
    }

    pub fn get(&self, role: &str) -> Option<&str> {
        self.entries.get(role).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stylesheets to link from every page.
    pub fn stylesheets(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(role, _)| role.ends_with(".css"))
            .map(|(_, path)| path)
    }

    /// Scripts to load from every page. Async chunks are fetched by the runtime.
    pub fn entry_scripts(&self) -> impl Iterator<Item = &str> {
        self.get(Self::MAIN_JS).into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_once() {
        let mut manifest = AssetManifest::new();
        manifest
            .insert(AssetManifest::MAIN_CSS, "assets/css/a.css")
            .unwrap();
        assert_eq!(manifest.get("main.css"), Some("assets/css/a.css"));

        let err = manifest
            .insert(AssetManifest::MAIN_CSS, "assets/css/b.css")
            .unwrap_err();
        assert_eq!(
            err,
            ManifestError::DuplicateRole {
                role: "main.css".into(),
                existing: "assets/css/a.css".into()
            }
        );
        assert_eq!(manifest.get("main.css"), Some("assets/css/a.css"));
    }

    #[test]
    fn test_roles() {
        let mut manifest = AssetManifest::new();
        manifest.insert("main.js", "assets/js/m.js").unwrap();
        manifest.insert(AssetManifest::chunk_role(0), "assets/js/c0.js").unwrap();
        manifest.insert("main.css", "assets/css/s.css").unwrap();

        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest.stylesheets().collect::<Vec<_>>(), ["assets/css/s.css"]);
        assert_eq!(manifest.entry_scripts().collect::<Vec<_>>(), ["assets/js/m.js"]);
        assert_eq!(manifest.get("chunk.0.js"), Some("assets/js/c0.js"));
    }
}
