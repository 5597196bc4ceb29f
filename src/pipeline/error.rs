//! Build errors. Every variant aborts the build attempt.

use crate::asset::minify::MinifyError;
use crate::asset::{AssetError, ManifestError};
use crate::bundle::BundleError;
use crate::page::{CompositionError, DiscoveryError};
use crate::purge::{PurgeError, ScanError};
use crate::style::StyleCompileError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    StyleCompile(#[from] StyleCompileError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Minify(#[from] MinifyError),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error("asset manifest: {0}")]
    Manifest(#[from] ManifestError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Build settings rejected after configuration loading.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BuildError {
    /// File the error points at, when known.
    pub fn path(&self) -> Option<PathBuf> {
        match self {
            Self::StyleCompile(e) => Some(e.file.clone()),
            Self::Bundle(BundleError::Parse { file, .. }) => Some(file.clone()),
            Self::Bundle(BundleError::Unresolved { importer, .. }) => Some(importer.clone()),
            Self::Bundle(BundleError::Read { path, .. }) | Self::Io { path, .. } => {
                Some(path.clone())
            }
            _ => None,
        }
    }
}

impl From<AssetError> for BuildError {
    fn from(err: AssetError) -> Self {
        Self::Bundle(err.into())
    }
}

impl From<PurgeError> for BuildError {
    fn from(err: PurgeError) -> Self {
        match err {
            PurgeError::Scan(ScanError::Read { path, source }) => Self::Io { path, source },
            PurgeError::Scan(e @ ScanError::Pattern { .. }) => Self::Config(e.to_string()),
            PurgeError::Css(message) => Self::StyleCompile(StyleCompileError {
                file: PathBuf::from(crate::asset::AssetManifest::MAIN_CSS),
                line: None,
                message,
            }),
        }
    }
}
