//! Emitted assets: content hashing, the role manifest, minification and
//! the in-memory build output.

pub mod hash;
mod kind;
mod manifest;
pub mod minify;
mod output;

pub use kind::{AssetKind, AssetRef};
pub use manifest::{AssetManifest, ManifestError};
pub use output::{AssetCollision, AssetError, BinaryAssets, BuildOutput};
