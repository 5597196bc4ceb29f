//! Stylesheet pipeline.
//!
//! Every stage takes and returns a [`StyleUnit`]:
//!
//! ```text
//! per entry:  preprocess → rewrite_urls → resolve_imports → prefix
//! combined:   purge (production) → minify (production) → extract
//! ```

mod error;
mod extract;
mod imports;
mod prefix;
mod preprocess;
mod urls;

pub use error::StyleCompileError;
pub use extract::extract;
pub use imports::resolve_imports;
pub use prefix::prefix;
pub use preprocess::preprocess;
pub use urls::rewrite_urls;

use crate::asset::minify::minify_css;
use crate::asset::{AssetManifest, AssetRef, BuildOutput};
use crate::pipeline::{BuildContext, BuildError};
use crate::purge::{Eliminator, scan_content};
use crate::{debug, log};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Stylesheet text with the file it came from, the binary assets it
/// references and the other files compiled into it (SCSS partials and
/// `@import`ed CSS).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleUnit {
    pub text: String,
    pub origin: PathBuf,
    pub references: Vec<AssetRef>,
    pub imports: Vec<PathBuf>,
}

impl StyleUnit {
    pub fn new(text: String, origin: impl Into<PathBuf>) -> Self {
        Self {
            text,
            origin: origin.into(),
            references: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Join units in order.
    pub fn concat(units: Vec<StyleUnit>) -> Self {
        let mut combined = Self::new(String::new(), AssetManifest::MAIN_CSS);
        for unit in units {
            if !combined.text.is_empty() && !combined.text.ends_with('\n') {
                combined.text.push('\n');
            }
            combined.text.push_str(&unit.text);
            combined.references.extend(unit.references);
            combined.imports.extend(unit.imports);
        }
        combined
    }
}

/// What the compiled stylesheets pulled in besides their entries.
#[derive(Debug, Default)]
pub struct StyleInputs {
    /// Fonts and images referenced through `url()`.
    pub assets: Vec<AssetRef>,
    /// SCSS partials and `@import`ed CSS files.
    pub imports: Vec<PathBuf>,
}

/// Compile `entries` into `main.css`.
///
/// No entries means no stylesheet and no `main.css` role.
pub fn compile(
    entries: &[PathBuf],
    ctx: &BuildContext<'_>,
    output: &mut BuildOutput,
) -> Result<StyleInputs, BuildError> {
    if entries.is_empty() {
        return Ok(StyleInputs::default());
    }

    let build = &ctx.config.build;
    let load_paths: Vec<&Path> = std::iter::once(build.source.as_path())
        .chain(build.load_paths.iter().map(PathBuf::as_path))
        .collect();
    let units = entries
        .par_iter()
        .map(|entry| compile_entry(entry, &load_paths, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    let mut unit = StyleUnit::concat(units);

    if ctx.mode.purges_css() {
        unit = purge(unit, ctx)?;
    }

    let css = if ctx.mode.minifies() {
        minify_css(AssetManifest::MAIN_CSS, &unit.text)?
    } else {
        unit.text
    };

    let path = extract(css, output)?;
    debug!("style"; "{} stylesheet(s) → {}", entries.len(), path);
    Ok(StyleInputs {
        assets: unit.references,
        imports: unit.imports,
    })
}

fn compile_entry(
    entry: &Path,
    load_paths: &[&Path],
    ctx: &BuildContext<'_>,
) -> Result<StyleUnit, StyleCompileError> {
    let unit = preprocess(entry, load_paths)?;
    let unit = rewrite_urls(unit)?;
    let unit = resolve_imports(unit)?;
    prefix(unit, ctx.targets)
}

/// Production-only elimination stage.
fn purge(mut unit: StyleUnit, ctx: &BuildContext<'_>) -> Result<StyleUnit, BuildError> {
    let tokens = scan_content(&ctx.config.purge.content).map_err(crate::purge::PurgeError::from)?;
    if tokens.file_count() == 0 {
        log!("purge"; "no content files matched, keeping every rule");
        return Ok(unit);
    }

    let eliminator = Eliminator {
        tokens: &tokens,
        safelist: &ctx.safelist,
        targets: ctx.targets,
        variables: ctx.config.purge.variables,
    };
    let (css, report) = eliminator.run(&unit.text)?;
    debug!(
        "purge";
        "{} file(s) scanned, removed {} class(es), {} keyframe(s), {} variable(s)",
        tokens.file_count(),
        report.classes.len(),
        report.keyframes.len(),
        report.variables.len()
    );

    unit.text = css;
    Ok(unit)
}
