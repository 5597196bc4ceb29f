//! Asset kind classification.

use crate::utils::mime;
use std::path::{Path, PathBuf};

/// Kind of file reachable from the entry or a stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetKind {
    /// JavaScript module, part of the graph.
    Script,
    /// `.scss` / `.sass` / `.css`, fed to the style pipeline.
    Stylesheet,
    /// Copied to `assets/fonts/` unhashed.
    Font,
    /// Copied to `assets/images/` unhashed.
    Image,
}

impl AssetKind {
    /// Classify by extension. Unknown extensions are treated as scripts.
    pub fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let mime = mime::from_extension(ext.as_deref());
        match ext.as_deref() {
            Some("scss" | "sass" | "css") => Self::Stylesheet,
            _ if mime::is_font(mime) => Self::Font,
            _ if mime::is_image(mime) => Self::Image,
            _ => Self::Script,
        }
    }

    /// Output directory for copied binary assets.
    pub const fn output_dir(self) -> Option<&'static str> {
        match self {
            Self::Font => Some("assets/fonts"),
            Self::Image => Some("assets/images"),
            Self::Script | Self::Stylesheet => None,
        }
    }

    pub const fn is_binary(self) -> bool {
        matches!(self, Self::Font | Self::Image)
    }
}

/// A binary asset referenced by a stylesheet or a module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AssetRef {
    pub source: PathBuf,
    pub kind: AssetKind,
}

impl AssetRef {
    /// `None` unless `source` is a font or an image.
    pub fn binary(source: PathBuf) -> Option<Self> {
        let kind = AssetKind::of(&source);
        kind.is_binary().then_some(Self { source, kind })
    }

    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Path under the output directory, e.g. `assets/fonts/icon.woff2`.
    pub fn output_path(&self) -> String {
        let dir = self.kind.output_dir().unwrap_or("assets");
        format!("{dir}/{}", self.file_name())
    }

    /// Reference from a file in `assets/css/` or `assets/js/`.
    pub fn sibling_url(&self) -> String {
        let dir = match self.kind {
            AssetKind::Image => "images",
            _ => "fonts",
        };
        format!("../{dir}/{}", self.file_name())
    }
}
