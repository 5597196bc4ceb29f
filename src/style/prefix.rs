//! Vendor prefixing with lightningcss.

use super::{StyleCompileError, StyleUnit};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::Targets;

/// Parse, apply `targets` and print unminified.
///
/// This is also where plain CSS syntax errors surface.
pub fn prefix(mut unit: StyleUnit, targets: Targets) -> Result<StyleUnit, StyleCompileError> {
    let origin = unit.origin.clone();
    let options = ParserOptions {
        filename: origin.display().to_string(),
        ..ParserOptions::default()
    };

    let mut sheet = StyleSheet::parse(&unit.text, options).map_err(|e| {
        StyleCompileError::new(&origin, e.loc.as_ref().map(|loc| loc.line + 1), e.kind.to_string())
    })?;
    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| StyleCompileError::new(&origin, None, e.to_string()))?;
    let printed = sheet
        .to_css(PrinterOptions {
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| StyleCompileError::new(&origin, None, e.to_string()))?;

    drop(sheet);
    unit.text = printed.code;
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightningcss::targets::Browsers;

    fn old_safari() -> Targets {
        Targets::from(Browsers {
            safari: Some(8 << 16),
            ..Browsers::default()
        })
    }

    #[test]
    fn test_adds_prefixes() {
        let unit = StyleUnit::new(".a { user-select: none; }".into(), "main.css");
        let out = prefix(unit, old_safari()).unwrap();
        assert!(out.text.contains("-webkit-user-select"));
        assert!(out.text.contains(".a {"));
    }

    #[test]
    fn test_no_targets_no_prefixes() {
        let unit = StyleUnit::new(".a { user-select: none; }".into(), "main.css");
        let out = prefix(unit, Targets::default()).unwrap();
        assert!(!out.text.contains("-webkit-"));
    }

    #[test]
    fn test_syntax_error_location() {
        let unit = StyleUnit::new(".a { color: red; }\n..b { color: red; }".into(), "main.css");
        let err = prefix(unit, Targets::default()).unwrap_err();
        assert_eq!(err.line, Some(2));
        assert_eq!(err.file, std::path::PathBuf::from("main.css"));
    }
}
