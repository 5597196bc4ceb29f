//! Build mode selection for production/development builds.

use serde::{Deserialize, Serialize};

/// Build mode, fixed for the whole build invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Readable output, no rule elimination, no minification.
    Development,
    /// Unused-rule elimination and minification of every JS/CSS asset.
    #[default]
    Production,
}

impl BuildMode {
    /// Whether the unused-rule eliminator runs.
    #[inline]
    pub const fn purges_css(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Whether JS chunks and CSS outputs are minified.
    #[inline]
    pub const fn minifies(self) -> bool {
        matches!(self, Self::Production)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_stages() {
        assert!(BuildMode::Production.purges_css());
        assert!(BuildMode::Production.minifies());
        assert!(!BuildMode::Development.purges_css());
        assert!(!BuildMode::Development.minifies());
    }

    #[test]
    fn test_mode_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: BuildMode,
        }
        let parsed: Wrapper = toml::from_str("mode = \"development\"").unwrap();
        assert_eq!(parsed.mode, BuildMode::Development);
        assert_eq!(BuildMode::default(), BuildMode::Production);
    }
}
