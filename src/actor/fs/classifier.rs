use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::types::{ChangeKind, DebouncedEvents};
use crate::config::PipelineConfig;

/// Turns raw debounced changes into the ones worth a rebuild.
///
/// Pipeline: correct_by_existence → drop_output → sort
pub(super) struct EventClassifier;

impl EventClassifier {
    pub(super) fn classify(
        raw: FxHashMap<PathBuf, ChangeKind>,
        config: &PipelineConfig,
    ) -> Option<DebouncedEvents> {
        let mut changes = raw;

        Self::correct_by_existence(&mut changes);
        Self::drop_output(&mut changes, &config.build.output);

        if changes.is_empty() {
            return None;
        }

        let mut changes: Vec<_> = changes.into_iter().collect();
        changes.sort_by(|a, b| a.0.cmp(&b.0));
        let config_changed = changes.iter().any(|(p, _)| *p == config.config_path);

        Some(DebouncedEvents {
            changes,
            config_changed,
        })
    }

    /// The watcher may report stale kinds, e.g. `Removed` for a file an
    /// atomic save has already put back.
    fn correct_by_existence(changes: &mut FxHashMap<PathBuf, ChangeKind>) {
        changes.retain(|path, kind| {
            let exists = path.exists();
            match *kind {
                ChangeKind::Created if !exists => false,
                ChangeKind::Modified if !exists => {
                    *kind = ChangeKind::Removed;
                    true
                }
                ChangeKind::Removed if exists => {
                    *kind = ChangeKind::Modified;
                    true
                }
                _ => true,
            }
        });
    }

    /// Our own writes under the output directory must not trigger builds.
    fn drop_output(changes: &mut FxHashMap<PathBuf, ChangeKind>, output: &Path) {
        changes.retain(|path, _| !path.starts_with(output));
    }
}
