use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

/// Keeps the wanted watch roots attached.
///
/// Roots missing at startup, or removed and recreated later, are attached
/// on the next `maintain`. Files are watched non-recursively, directories
/// recursively.
pub(super) struct WatchRoots {
    desired: Vec<PathBuf>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    pub(super) fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            desired: paths,
            attached: FxHashSet::default(),
        }
    }

    pub(super) fn attach_existing(
        &mut self,
        watcher: &mut RecommendedWatcher,
    ) -> notify::Result<()> {
        for path in &self.desired {
            if !path.exists() {
                continue;
            }
            watcher.watch(path, mode(path))?;
            self.attached.insert(path.clone());
        }

        Ok(())
    }

    /// Add files no root covers yet, e.g. stylesheets imported from
    /// outside the source tree. They are attached on the next `maintain`.
    pub(super) fn follow<'a>(&mut self, files: impl IntoIterator<Item = &'a Path>) {
        for file in files {
            if !self.covers(file) {
                crate::debug!("watch"; "following {}", file.display());
                self.desired.push(file.to_path_buf());
            }
        }
    }

    fn covers(&self, path: &Path) -> bool {
        self.desired.iter().any(|root| path.starts_with(root))
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        self.attached.retain(|path| path.exists());

        for path in &self.desired {
            if self.attached.contains(path) || !path.exists() {
                continue;
            }

            if watcher.watch(path, mode(path)).is_ok() {
                self.attached.insert(path.clone());
                crate::debug!("watch"; "re-attached watch: {}", path.display());
            }
        }
    }
}

fn mode(path: &Path) -> RecursiveMode {
    if path.is_dir() {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_skips_covered_files() {
        let mut roots = WatchRoots::new(vec![PathBuf::from("/site/src")]);
        let inside = PathBuf::from("/site/src/css/app.css");
        let outside = PathBuf::from("/site/vendor/reset.css");

        roots.follow([inside.as_path(), outside.as_path(), outside.as_path()]);
        assert_eq!(
            roots.desired,
            vec![PathBuf::from("/site/src"), outside.clone()]
        );
    }
}
