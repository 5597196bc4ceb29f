//! `@import` resolution with the lightningcss bundler.
//!
//! Imported files are inlined into the entry. Each imported file gets its
//! `url()` references rewritten against its own directory before inlining,
//! so the bundle runs twice: once to find the files, once over the
//! rewritten text.

use super::{StyleCompileError, StyleUnit, rewrite_urls};
use crate::utils::path::clean_path;
use lightningcss::bundler::{Bundler, FileProvider, ResolveResult, SourceProvider};
use lightningcss::error::Error;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Inline every local `@import` of `unit`. Remote imports are kept.
pub fn resolve_imports(mut unit: StyleUnit) -> Result<StyleUnit, StyleCompileError> {
    if !unit.text.contains("@import") {
        return Ok(unit);
    }

    let found = {
        let provider = Discover {
            entry: &unit.origin,
            text: &unit.text,
            files: FileProvider::new(),
            imports: Mutex::new(Vec::new()),
        };
        bundle(&provider, &unit.origin)?;
        provider.imports.into_inner()
    };
    if found.is_empty() {
        return Ok(unit);
    }

    let mut files = FxHashMap::default();
    for path in found {
        if files.contains_key(&path) {
            continue;
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|e| StyleCompileError::new(&path, None, format!("cannot read: {e}")))?;
        let imported = rewrite_urls(StyleUnit::new(text, &path))?;
        unit.references.extend(imported.references);
        unit.imports.push(path.clone());
        files.insert(path, imported.text);
    }
    files.insert(unit.origin.clone(), std::mem::take(&mut unit.text));

    unit.text = bundle(&Preloaded { files }, &unit.origin)?;
    Ok(unit)
}

fn bundle<P: SourceProvider>(provider: &P, entry: &Path) -> Result<String, StyleCompileError> {
    let mut bundler = Bundler::new(provider, None, ParserOptions::default());
    let stylesheet = bundler.bundle(entry).map_err(|e| bundle_error(entry, &e))?;
    let printed = stylesheet
        .to_css(PrinterOptions::default())
        .map_err(|e| StyleCompileError::new(entry, None, e.kind.to_string()))?;
    Ok(printed.code)
}

fn bundle_error<K: fmt::Display>(entry: &Path, err: &Error<K>) -> StyleCompileError {
    match &err.loc {
        Some(loc) => StyleCompileError::new(&loc.filename, Some(loc.line + 1), err.kind.to_string()),
        None => StyleCompileError::new(entry, None, err.kind.to_string()),
    }
}

/// Import specifier → file next to the importing one.
fn resolve(specifier: &str, originating_file: &Path) -> ResolveResult {
    if specifier.contains("://") || specifier.starts_with("//") || specifier.starts_with("data:") {
        ResolveResult::External(specifier.to_string())
    } else {
        ResolveResult::File(clean_path(&originating_file.with_file_name(specifier)))
    }
}

/// First pass: serves the entry from memory and records every other read.
struct Discover<'u> {
    entry: &'u Path,
    text: &'u str,
    files: FileProvider,
    imports: Mutex<Vec<PathBuf>>,
}

impl SourceProvider for Discover<'_> {
    type Error = io::Error;

    fn read<'a>(&'a self, file: &Path) -> Result<&'a str, Self::Error> {
        if file == self.entry {
            return Ok(self.text);
        }
        let text = self
            .files
            .read(file)
            .map_err(|e| io::Error::new(e.kind(), format!("cannot import `{}`: {e}", file.display())))?;
        self.imports.lock().push(file.to_path_buf());
        Ok(text)
    }

    fn resolve(&self, specifier: &str, originating_file: &Path) -> Result<ResolveResult, Self::Error> {
        Ok(resolve(specifier, originating_file))
    }
}

/// Second pass: every file already read and rewritten.
struct Preloaded {
    files: FxHashMap<PathBuf, String>,
}

impl SourceProvider for Preloaded {
    type Error = io::Error;

    fn read<'a>(&'a self, file: &Path) -> Result<&'a str, Self::Error> {
        self.files.get(file).map(String::as_str).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("`{}` changed during the build", file.display()),
            )
        })
    }

    fn resolve(&self, specifier: &str, originating_file: &Path) -> Result<ResolveResult, Self::Error> {
        Ok(resolve(specifier, originating_file))
    }
}
