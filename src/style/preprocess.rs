//! SCSS compilation with grass.

use super::{StyleCompileError, StyleUnit};
use grass::{Fs, StdFs};
use parking_lot::Mutex;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// First frame of a grass stack trace: `  main.scss 3:5  root stylesheet`.
static TRACE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]+\S+[ \t]+(\d+):\d+[ \t]+\S").unwrap());

/// Compile one entry. Plain `.css` entries pass through unchanged.
///
/// `@import`/`@use` look in the entry's directory first, then `load_paths`
/// in order. Every partial read lands in [`StyleUnit::imports`].
pub fn preprocess(entry: &Path, load_paths: &[&Path]) -> Result<StyleUnit, StyleCompileError> {
    let is_plain_css = entry
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("css"));

    if is_plain_css {
        let text = fs::read_to_string(entry)
            .map_err(|e| StyleCompileError::new(entry, None, format!("cannot read: {e}")))?;
        return Ok(StyleUnit::new(text, entry));
    }

    let recording = RecordingFs::default();
    let mut options = grass::Options::default().fs(&recording);
    if let Some(dir) = entry.parent() {
        options = options.load_path(dir);
    }
    let options = options.load_paths(load_paths);
    let text =
        grass::from_path(entry, &options).map_err(|e| compile_error(entry, &e.to_string()))?;

    let mut unit = StyleUnit::new(text, entry);
    unit.imports = recording.read.into_inner();
    unit.imports.retain(|p| p != entry);
    unit.imports.sort();
    unit.imports.dedup();
    Ok(unit)
}

/// [`StdFs`] that remembers every file grass reads.
#[derive(Debug, Default)]
struct RecordingFs {
    read: Mutex<Vec<PathBuf>>,
}

impl Fs for RecordingFs {
    fn is_dir(&self, path: &Path) -> bool {
        StdFs.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        StdFs.is_file(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let bytes = StdFs.read(path)?;
        self.read.lock().push(path.to_path_buf());
        Ok(bytes)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        StdFs.canonicalize(path)
    }
}

fn compile_error(entry: &Path, rendered: &str) -> StyleCompileError {
    let line = TRACE_LINE
        .captures(rendered)
        .and_then(|c| c[1].parse().ok());
    let message = rendered
        .lines()
        .next()
        .unwrap_or(rendered)
        .trim_start_matches("Error: ")
        .to_string();
    StyleCompileError::new(entry, line, message)
}
