//! Content scanning: every `[A-Za-z0-9_-]+` run of every content file.
//!
//! Stylesheets are never content: every selector would name itself.

use crate::asset::AssetKind;
use rayon::prelude::*;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9_-]+").unwrap());

/// Bytes inspected for a NUL when deciding a file is binary.
const BINARY_SNIFF_LEN: usize = 8192;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid content glob `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read content file `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Tokens gathered from the content files.
#[derive(Debug, Default)]
pub struct ContentTokens {
    tokens: FxHashSet<String>,
    files: usize,
}

impl ContentTokens {
    #[cfg(test)]
    pub fn from_text<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut out = Self::default();
        for text in texts {
            out.tokens.extend(tokenize(text));
            out.files += 1;
        }
        out
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Number of files scanned (binary files excluded).
    pub fn file_count(&self) -> usize {
        self.files
    }
}

/// Scan every regular file matched by `patterns`, stylesheets excluded.
pub fn scan_content(patterns: &[String]) -> Result<ContentTokens, ScanError> {
    let mut paths = BTreeSet::new();
    for pattern in patterns {
        let matches = glob::glob(pattern).map_err(|source| ScanError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        // Unreadable directory entries are skipped like any other non-file.
        paths.extend(
            matches
                .filter_map(Result::ok)
                .filter(|p| p.is_file() && AssetKind::of(p) != AssetKind::Stylesheet),
        );
    }

    let scanned = paths
        .par_iter()
        .map(|path| {
            let bytes = fs::read(path).map_err(|source| ScanError::Read {
                path: path.clone(),
                source,
            })?;
            if is_binary(&bytes) {
                return Ok(None);
            }
            Ok(Some(tokenize(&String::from_utf8_lossy(&bytes)).collect::<Vec<_>>()))
        })
        .collect::<Result<Vec<_>, ScanError>>()?;

    let mut out = ContentTokens::default();
    for tokens in scanned.into_iter().flatten() {
        out.tokens.extend(tokens);
        out.files += 1;
    }
    Ok(out)
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN.find_iter(text).map(|m| m.as_str().to_string())
}

fn is_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(BINARY_SNIFF_LEN)].contains(&0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn glob_in(dir: &TempDir, pattern: &str) -> String {
        dir.path().join(pattern).to_string_lossy().into_owned()
    }

    #[test]
    fn test_scan_tokens() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), r#"<a class="btn btn-primary">Go</a>"#).unwrap();
        fs::create_dir_all(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js/main.js"), "el.classList.add('is_open')").unwrap();

        let tokens = scan_content(&[glob_in(&dir, "**/*")]).unwrap();
        assert_eq!(tokens.file_count(), 2);
        assert!(tokens.contains("btn"));
        assert!(tokens.contains("btn-primary"));
        assert!(tokens.contains("is_open"));
        assert!(!tokens.contains("btn btn-primary"));
    }

    #[test]
    fn test_scan_skips_binary() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("font.woff2"), b"wOF2\0\0secret").unwrap();
        fs::write(dir.path().join("index.html"), "hello").unwrap();

        let tokens = scan_content(&[glob_in(&dir, "*")]).unwrap();
        assert_eq!(tokens.file_count(), 1);
        assert!(!tokens.contains("secret"));
    }

    #[test]
    fn test_scan_skips_stylesheets() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("styles.scss"), ".unused { color: blue; }").unwrap();
        fs::write(dir.path().join("index.html"), "<p class=\"btn\">").unwrap();

        let tokens = scan_content(&[glob_in(&dir, "*")]).unwrap();
        assert_eq!(tokens.file_count(), 1);
        assert!(!tokens.contains("unused"));
    }

    #[test]
    fn test_scan_no_matches() {
        let dir = TempDir::new().unwrap();
        let tokens = scan_content(&[glob_in(&dir, "*.html")]).unwrap();
        assert_eq!(tokens.file_count(), 0);
        assert!(tokens.tokens.is_empty());
    }

    #[test]
    fn test_scan_invalid_pattern() {
        assert!(matches!(
            scan_content(&["[".to_string()]),
            Err(ScanError::Pattern { .. })
        ));
    }

    #[test]
    fn test_overlapping_patterns_count_once() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "x").unwrap();
        let tokens = scan_content(&[glob_in(&dir, "*"), glob_in(&dir, "*.html")]).unwrap();
        assert_eq!(tokens.file_count(), 1);
    }

    #[test]
    fn test_from_text() {
        let tokens = ContentTokens::from_text(["<p class=\"lead\">", "x"]);
        assert_eq!(tokens.file_count(), 2);
        assert!(tokens.contains("lead"));
    }
}
