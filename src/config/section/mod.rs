//! Configuration section definitions.
//!
//! Each module corresponds to a section in `pagepack.toml`:
//!
//! | Module  | TOML Section | Purpose                                    |
//! |---------|--------------|--------------------------------------------|
//! | `build` | `[build]`    | Source/entry/output paths, targets, pages  |
//! | `purge` | `[purge]`    | Unused-rule elimination and safelist       |
//! | `serve` | `[serve]`    | Development server                         |

pub mod build;
pub mod purge;
mod serve;

pub use build::{BuildSectionConfig, TemplatesConfig};
pub use purge::{PurgeConfig, SafelistConfig};
pub use serve::ServeConfig;
