//! JavaScript bundler.
//!
//! ```text
//! resolve (graph) → plan (chunks) → rewrite (per module) → emit (per chunk)
//! ```
//!
//! Modules are wrapped into factories of a small registry runtime; see
//! `embed/bundle/runtime.js`.

mod chunk;
mod graph;
mod resolve;
mod rewrite;
mod syntax;

pub use chunk::emit;
pub use graph::ModuleGraph;
pub use resolve::Resolver;

use crate::asset::{AssetCollision, AssetError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("cannot resolve `{specifier}` imported from `{}`", importer.display())]
    Unresolved { specifier: String, importer: PathBuf },

    #[error("{}: {message}", file.display())]
    Parse { file: PathBuf, message: String },

    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    AssetCollision(#[from] AssetCollision),
}

impl From<AssetError> for BundleError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::Read { path, source } => Self::Read { path, source },
            AssetError::Collision(collision) => Self::AssetCollision(collision),
        }
    }
}
