//! Page templates: discovery and asset-tag composition.

mod compose;
mod discover;

pub use compose::{CompositionError, compose_all};
pub use discover::{DiscoveryError, discover};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where `<script>` tags are inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectionPoint {
    Head,
    #[default]
    Body,
}

impl InjectionPoint {
    /// Closing tag the scripts are placed before.
    pub const fn closing_tag(self) -> &'static str {
        match self {
            Self::Head => "</head>",
            Self::Body => "</body>",
        }
    }
}

/// One template file and where its composed page goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    pub source_path: PathBuf,
    /// Template file name with its extension normalized to `.html`.
    pub output_filename: String,
    pub injection_point: InjectionPoint,
}
