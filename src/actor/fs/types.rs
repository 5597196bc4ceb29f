use std::path::PathBuf;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Actionable changes after classification, sorted by path.
#[derive(Debug)]
pub(super) struct DebouncedEvents {
    pub(super) changes: Vec<(PathBuf, ChangeKind)>,
    /// `pagepack.toml` is among the changes
    pub(super) config_changed: bool,
}

impl DebouncedEvents {
    pub(super) fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.changes.iter().map(|(path, _)| path)
    }
}
