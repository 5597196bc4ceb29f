//! `url()` rewriting for fonts and images.
//!
//! References are resolved against the entry's directory and rewritten
//! relative to `assets/css/`. Remote, data and root-absolute URLs are left
//! alone, as are references to anything that is not a font or an image.

use super::{StyleCompileError, StyleUnit};
use crate::asset::AssetRef;
use crate::utils::path::{clean_path, split_suffix};
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*(["']?)([^"')]+)["']?\s*\)"#).unwrap());

pub fn rewrite_urls(mut unit: StyleUnit) -> Result<StyleUnit, StyleCompileError> {
    let base = unit
        .origin
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut error = None;
    let mut references = Vec::new();

    let text = URL.replace_all(&unit.text, |caps: &Captures<'_>| {
        let original = caps[0].to_string();
        let quote = &caps[1];
        let reference = caps[2].trim();
        if error.is_some() || is_external(reference) {
            return original;
        }

        let (path, suffix) = split_suffix(reference);
        let Some(asset) = AssetRef::binary(clean_path(&base.join(path))) else {
            return original;
        };
        if !asset.source.is_file() {
            error = Some(StyleCompileError::new(
                &unit.origin,
                None,
                format!("url({reference}) does not resolve to a file"),
            ));
            return original;
        }

        let rewritten = format!("url({quote}{}{suffix}{quote})", asset.sibling_url());
        references.push(asset);
        rewritten
    });

    if let Some(error) = error {
        return Err(error);
    }
    unit.text = text.into_owned();
    unit.references.extend(references);
    Ok(unit)
}

fn is_external(reference: &str) -> bool {
    reference.starts_with('/')
        || reference.starts_with('#')
        || reference.starts_with("data:")
        || reference.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn unit_in(dir: &Path, text: &str) -> StyleUnit {
        StyleUnit::new(text.to_string(), dir.join("scss/main.scss"))
    }

    #[test]
    fn test_font_rewritten() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("fonts")).unwrap();
        fs::create_dir_all(dir.path().join("scss")).unwrap();
        fs::write(dir.path().join("fonts/icon.woff2"), b"font").unwrap();

        let unit = unit_in(
            dir.path(),
            "@font-face { src: url('../fonts/icon.woff2?v=1.2.3#iefix') format('woff2'); }",
        );
        let unit = rewrite_urls(unit).unwrap();
        assert_eq!(
            unit.text,
            "@font-face { src: url('../fonts/icon.woff2?v=1.2.3#iefix') format('woff2'); }"
        );
        assert_eq!(unit.references.len(), 1);
        assert_eq!(unit.references[0].output_path(), "assets/fonts/icon.woff2");
    }

    #[test]
    fn test_image_rewritten() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("scss/img")).unwrap();
        fs::write(dir.path().join("scss/img/bg.png"), b"png").unwrap();

        let unit = rewrite_urls(unit_in(dir.path(), ".hero { background: url(img/bg.png); }")).unwrap();
        assert_eq!(unit.text, ".hero { background: url(../images/bg.png); }");
        assert_eq!(unit.references[0].output_path(), "assets/images/bg.png");
    }

    #[test]
    fn test_external_untouched() {
        let dir = TempDir::new().unwrap();
        let css = ".a { background: url(https://cdn.example.com/x.png) } \
                   .b { background: url(\"data:image/png;base64,AAAA\") } \
                   .c { background: url(/static/logo.png) }";
        let unit = rewrite_urls(unit_in(dir.path(), css)).unwrap();
        assert_eq!(unit.text, css);
        assert!(unit.references.is_empty());
    }

    #[test]
    fn test_missing_asset_is_error() {
        let dir = TempDir::new().unwrap();
        let err = rewrite_urls(unit_in(dir.path(), ".a { background: url(missing.png) }")).unwrap_err();
        assert!(err.message.contains("missing.png"));
    }
}
