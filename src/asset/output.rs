//! In-memory build results.
//!
//! A build never touches the output directory: it yields a [`BuildOutput`]
//! that `pagepack build` writes out and the dev server serves from memory.

use super::{AssetManifest, AssetRef};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Two different files would be copied to the same output path.
#[derive(Debug, Error)]
#[error("`{}` and `{}` both map to `{output}`", first.display(), second.display())]
pub struct AssetCollision {
    pub output: String,
    pub first: PathBuf,
    pub second: PathBuf,
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Collision(#[from] AssetCollision),
}

/// Binary assets keyed by output path.
#[derive(Debug, Default)]
pub struct BinaryAssets {
    entries: BTreeMap<String, (PathBuf, Vec<u8>)>,
}

impl BinaryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and record `asset`.
    ///
    /// The same base name may be referenced repeatedly as long as the
    /// bytes match.
    pub fn add(&mut self, asset: &AssetRef) -> Result<(), AssetError> {
        let output = asset.output_path();
        if let Some((first, _)) = self.entries.get(&output)
            && *first == asset.source
        {
            return Ok(());
        }

        let bytes = fs::read(&asset.source).map_err(|source| AssetError::Read {
            path: asset.source.clone(),
            source,
        })?;
        match self.entries.get(&output) {
            Some((_, existing)) if *existing == bytes => Ok(()),
            Some((first, _)) => Err(AssetCollision {
                output,
                first: first.clone(),
                second: asset.source.clone(),
            }
            .into()),
            None => {
                self.entries.insert(output, (asset.source.clone(), bytes));
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn into_files(self) -> impl Iterator<Item = (String, Vec<u8>)> {
        self.entries
            .into_iter()
            .map(|(path, (_, bytes))| (path, bytes))
    }
}

/// Output-relative path → bytes, plus the manifest and the source files
/// the build read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    files: BTreeMap<String, Vec<u8>>,
    manifest: AssetManifest,
    sources: BTreeSet<PathBuf>,
}

impl BuildOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    pub fn extend_binary(&mut self, assets: BinaryAssets) {
        self.files.extend(assets.into_files());
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    pub fn manifest_mut(&mut self) -> &mut AssetManifest {
        &mut self.manifest
    }

    pub fn add_sources<'a>(&mut self, paths: impl IntoIterator<Item = &'a PathBuf>) {
        self.sources.extend(paths.into_iter().cloned());
    }

    /// Modules, stylesheets and binary assets this output was built from.
    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.sources.iter().map(PathBuf::as_path)
    }

    /// Write every file under `dir`, creating parents as needed.
    pub fn write_to(&self, dir: &Path) -> io::Result<()> {
        for (path, bytes) in &self.files {
            let target = dir.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_binary_assets_same_bytes() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("icon.woff2"), b"font").unwrap();
        fs::write(b.join("icon.woff2"), b"font").unwrap();

        let mut assets = BinaryAssets::new();
        let first = AssetRef::binary(a.join("icon.woff2")).unwrap();
        let second = AssetRef::binary(b.join("icon.woff2")).unwrap();
        assets.add(&first).unwrap();
        assets.add(&second).unwrap();
        assert_eq!(assets.len(), 1);
    }

    #[test]
    fn test_binary_assets_collision() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("logo.png"), b"one").unwrap();
        fs::write(b.join("logo.png"), b"two").unwrap();

        let mut assets = BinaryAssets::new();
        assets.add(&AssetRef::binary(a.join("logo.png")).unwrap()).unwrap();
        let err = assets
            .add(&AssetRef::binary(b.join("logo.png")).unwrap())
            .unwrap_err();
        match err {
            AssetError::Collision(c) => assert_eq!(c.output, "assets/images/logo.png"),
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn test_binary_assets_missing_file() {
        let mut assets = BinaryAssets::new();
        let missing = AssetRef::binary(PathBuf::from("/nonexistent/icon.woff")).unwrap();
        assert!(matches!(assets.add(&missing), Err(AssetError::Read { .. })));
    }

    #[test]
    fn test_write_to() {
        let dir = TempDir::new().unwrap();
        let mut output = BuildOutput::new();
        output.insert("index.html", "<html></html>");
        output.insert("assets/css/abc.css", ".btn{}");
        output.write_to(dir.path()).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("index.html")).unwrap(), "<html></html>");
        assert!(dir.path().join("assets/css/abc.css").is_file());
    }
}
