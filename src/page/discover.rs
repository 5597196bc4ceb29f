//! Template discovery.
//!
//! A single, non-recursive listing of the source directory.

use super::PageDescriptor;
use crate::config::TemplatesConfig;
use crate::debug;
use rustc_hash::FxHashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot read template directory `{}`", dir.display())]
    Unreadable {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{}` and `{}` would both be written to `{output}`", first.display(), second.display())]
    Collision {
        output: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// One descriptor per template file in `dir`, in listing order.
///
/// Subdirectories and files with other extensions are skipped.
pub fn discover(dir: &Path, templates: &TemplatesConfig) -> Result<Vec<PageDescriptor>, DiscoveryError> {
    let unreadable = |source| DiscoveryError::Unreadable {
        dir: dir.to_path_buf(),
        source,
    };

    let mut pages = Vec::new();
    let mut seen: FxHashMap<String, PathBuf> = FxHashMap::default();

    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let path = entry.path();
        // follows symlinks, so linked templates count as files
        if !path.is_file() || !templates.is_template(&path) {
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let output_filename = Path::new(file_name)
            .with_extension("html")
            .to_string_lossy()
            .into_owned();

        if let Some(first) = seen.get(&output_filename) {
            return Err(DiscoveryError::Collision {
                output: output_filename,
                first: first.clone(),
                second: path,
            });
        }
        seen.insert(output_filename.clone(), path.clone());

        pages.push(PageDescriptor {
            injection_point: templates.injection_for(file_name),
            source_path: path,
            output_filename,
        });
    }

    debug!("discover"; "{} template(s) in {}", pages.len(), dir.display());
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::InjectionPoint;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn templates(extensions: &[&str]) -> TemplatesConfig {
        TemplatesConfig {
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_discover_flat() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("about.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("notes.md"), "# notes").unwrap();
        fs::create_dir_all(dir.path().join("partials")).unwrap();
        fs::write(dir.path().join("partials/nav.html"), "<nav></nav>").unwrap();

        let pages = discover(dir.path(), &templates(&["html"])).unwrap();
        let names: BTreeSet<_> = pages.iter().map(|p| p.output_filename.as_str()).collect();
        assert_eq!(names, BTreeSet::from(["about.html", "index.html"]));
        assert!(pages.iter().all(|p| p.injection_point == InjectionPoint::Body));
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_follows_symlinks() {
        let dir = TempDir::new().unwrap();
        let shared = TempDir::new().unwrap();
        fs::write(shared.path().join("layout.html"), "<html></html>").unwrap();
        fs::create_dir(shared.path().join("partials.html")).unwrap();
        std::os::unix::fs::symlink(shared.path().join("layout.html"), dir.path().join("index.html"))
            .unwrap();
        std::os::unix::fs::symlink(shared.path().join("partials.html"), dir.path().join("dir.html"))
            .unwrap();
        std::os::unix::fs::symlink(shared.path().join("gone.html"), dir.path().join("broken.html"))
            .unwrap();

        let pages = discover(dir.path(), &templates(&["html"])).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].output_filename, "index.html");
    }

    #[test]
    fn test_discover_normalizes_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("legacy.htm"), "").unwrap();

        let pages = discover(dir.path(), &templates(&["html", "htm"])).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].output_filename, "legacy.html");
        assert_eq!(pages[0].source_path, dir.path().join("legacy.htm"));
    }

    #[test]
    fn test_discover_collision() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();
        fs::write(dir.path().join("index.htm"), "").unwrap();

        let err = discover(dir.path(), &templates(&["html", "htm"])).unwrap_err();
        assert!(matches!(err, DiscoveryError::Collision { ref output, .. } if output == "index.html"));
    }

    #[test]
    fn test_discover_override() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("legacy.html"), "").unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();

        let mut config = templates(&["html"]);
        config
            .overrides
            .insert("legacy.html".into(), InjectionPoint::Head);

        let pages = discover(dir.path(), &config).unwrap();
        for page in pages {
            let expected = if page.output_filename == "legacy.html" {
                InjectionPoint::Head
            } else {
                InjectionPoint::Body
            };
            assert_eq!(page.injection_point, expected);
        }
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = TempDir::new().unwrap();
        let err = discover(&dir.path().join("nope"), &templates(&["html"])).unwrap_err();
        assert!(matches!(err, DiscoveryError::Unreadable { .. }));
    }

    #[test]
    fn test_discover_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(discover(dir.path(), &templates(&["html"])).unwrap().is_empty());
    }
}
