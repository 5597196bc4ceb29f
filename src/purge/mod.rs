//! Unused-rule elimination for production builds.
//!
//! # Passes
//!
//! 1. Classes that are neither content tokens nor safelisted (directly or
//!    through a `deep`/`greedy` pattern of their selector) are handed to
//!    lightningcss as unused symbols. A rule is dropped only when every
//!    selector of its list is unused.
//! 2. Keyframes no surviving `animation` references, no content token names
//!    and the safelist does not cover are dropped.
//! 3. Optionally, custom properties never read through `var()`.

mod safelist;
mod scan;
mod selectors;

pub use safelist::{Safelist, Symbol};
pub use scan::{ContentTokens, ScanError, scan_content};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::Targets;
use rustc_hash::FxHashSet;
use selectors::{CssSymbols, animation_names, remove_variables, variable_uses};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PurgeError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("failed to prune stylesheet: {0}")]
    Css(String),
}

/// What a purge run removed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PurgeReport {
    pub classes: BTreeSet<String>,
    pub keyframes: BTreeSet<String>,
    pub variables: BTreeSet<String>,
}

impl PurgeReport {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.keyframes.is_empty() && self.variables.is_empty()
    }
}

pub struct Eliminator<'a> {
    pub tokens: &'a ContentTokens,
    pub safelist: &'a Safelist,
    pub targets: Targets,
    /// Also remove unused custom properties.
    pub variables: bool,
}

impl Eliminator<'_> {
    /// Remove unused rules from lightningcss-printed `css`.
    pub fn run(&self, css: &str) -> Result<(String, PurgeReport), PurgeError> {
        let symbols = CssSymbols::extract(css);
        let mut report = PurgeReport::default();

        let mut kept: FxHashSet<String> = symbols
            .classes
            .iter()
            .filter(|class| self.tokens.contains(class) || self.safelist.protects(&Symbol::class(class)))
            .cloned()
            .collect();
        for selector in &symbols.selectors {
            self.safelist.expand_selector(selector, &mut kept);
        }

        // Names shared with a @keyframes are settled in the keyframe pass,
        // since unused symbols apply to both.
        report.classes = symbols
            .classes
            .iter()
            .filter(|class| !kept.contains(*class) && !symbols.keyframes.contains(*class))
            .cloned()
            .collect();
        let css = self.prune(css, &report.classes)?;

        let animated = animation_names(&css);
        report.keyframes = symbols
            .keyframes
            .iter()
            .filter(|name| {
                !animated.contains(*name)
                    && !self.tokens.contains(name)
                    && !kept.contains(*name)
                    && !self.safelist.protects(&Symbol::keyframe(name))
            })
            .cloned()
            .collect();
        let css = self.prune(&css, &report.keyframes)?;

        if !self.variables {
            return Ok((css, report));
        }

        let used = variable_uses(&css);
        report.variables = CssSymbols::extract(&css)
            .variables
            .into_iter()
            .filter(|name| {
                !used.contains(name)
                    && !self.tokens.contains(name)
                    && !self.tokens.contains(name.trim_start_matches("--"))
                    && !self.safelist.protects(&Symbol::variable(name))
            })
            .collect();
        let css = remove_variables(&css, &report.variables);

        Ok((css, report))
    }

    fn prune(&self, css: &str, unused: &BTreeSet<String>) -> Result<String, PurgeError> {
        if unused.is_empty() {
            return Ok(css.to_string());
        }

        let css_error = |e: &dyn std::fmt::Display| PurgeError::Css(e.to_string());
        let mut sheet =
            StyleSheet::parse(css, ParserOptions::default()).map_err(|e| css_error(&e))?;
        sheet
            .minify(MinifyOptions {
                targets: self.targets,
                unused_symbols: unused.iter().cloned().collect(),
            })
            .map_err(|e| css_error(&e))?;
        let printed = sheet
            .to_css(PrinterOptions {
                targets: self.targets,
                ..PrinterOptions::default()
            })
            .map_err(|e| css_error(&e))?;
        Ok(printed.code)
    }
}

#[cfg(test)]
mod tests {
    use super::safelist::{PatternScope, SafelistRule};
    use super::*;

    fn run(css: &str, content: &str, safelist: Safelist, variables: bool) -> (String, PurgeReport) {
        let tokens = ContentTokens::from_text([content]);
        Eliminator {
            tokens: &tokens,
            safelist: &safelist,
            targets: Targets::default(),
            variables,
        }
        .run(css)
        .unwrap()
    }

    fn exact(names: &[&str]) -> Safelist {
        Safelist::new(
            names
                .iter()
                .map(|n| SafelistRule::Exact(n.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_unused_class_removed() {
        let (css, report) = run(
            ".btn {\n  color: red;\n}\n\n.unused {\n  color: #00f;\n}\n",
            r#"<a class="btn">"#,
            Safelist::default(),
            false,
        );
        assert!(css.contains(".btn"));
        assert!(!css.contains(".unused"));
        assert!(report.classes.contains("unused"));
    }

    #[test]
    fn test_safelisted_class_kept() {
        let (css, report) = run(
            ".btn {\n  color: red;\n}\n\n.unused {\n  color: #00f;\n}\n",
            r#"<a class="btn">"#,
            exact(&["unused"]),
            false,
        );
        assert!(css.contains(".unused"));
        assert!(report.is_empty());
    }

    #[test]
    fn test_partially_used_selector_list_kept() {
        let (css, _) = run(
            ".btn, .ghost {\n  color: red;\n}\n",
            "btn",
            Safelist::default(),
            false,
        );
        assert!(css.contains(".btn"));
    }

    #[test]
    fn test_deep_pattern_protects_descendants() {
        let safelist = Safelist::new(vec![SafelistRule::Pattern {
            regex: regex::Regex::new("^modal$").unwrap(),
            scope: PatternScope::Deep,
        }]);
        let (css, _) = run(
            ".modal .modal-title {\n  color: red;\n}\n\n.other {\n  color: #00f;\n}\n",
            "",
            safelist,
            false,
        );
        assert!(css.contains(".modal-title"));
        assert!(!css.contains(".other"));
    }

    #[test]
    fn test_keyframes_kept_when_animated() {
        let css = "@keyframes spin {\n  from {\n    opacity: 0;\n  }\n}\n\n\
                   @keyframes gone {\n  from {\n    opacity: 0;\n  }\n}\n\n\
                   .loader {\n  animation: spin 1s;\n}\n";
        let (out, report) = run(css, "loader", Safelist::default(), false);
        assert!(out.contains("spin"));
        assert!(!out.contains("gone"));
        assert_eq!(report.keyframes, BTreeSet::from(["gone".to_string()]));
    }

    #[test]
    fn test_keyframes_dropped_with_their_rule() {
        let css = "@keyframes spin {\n  from {\n    opacity: 0;\n  }\n}\n\n\
                   .loader {\n  animation: spin 1s;\n}\n";
        let (out, _) = run(css, "nothing", Safelist::default(), false);
        assert!(!out.contains("loader"));
        assert!(!out.contains("spin"));
    }

    #[test]
    fn test_keyframe_safelist() {
        let css = "@keyframes fade {\n  from {\n    opacity: 0;\n  }\n}\n";
        let safelist = Safelist::new(vec![SafelistRule::Keyframe("fade".into())]);
        let (out, _) = run(css, "", safelist, false);
        assert!(out.contains("fade"));
    }

    #[test]
    fn test_variables_only_when_enabled() {
        let css = ":root {\n  --brand: red;\n  --unused: blue;\n}\n\n.btn {\n  color: var(--brand);\n}\n";
        let (kept, _) = run(css, "btn", Safelist::default(), false);
        assert!(kept.contains("--unused"));

        let (purged, report) = run(css, "btn", Safelist::default(), true);
        assert!(purged.contains("--brand"));
        assert!(!purged.contains("--unused"));
        assert_eq!(report.variables, BTreeSet::from(["--unused".to_string()]));
    }

    #[test]
    fn test_variable_safelist() {
        let css = ":root {\n  --unused: blue;\n}\n";
        let safelist = Safelist::new(vec![SafelistRule::Variable("--unused".into())]);
        let (out, _) = run(css, "", safelist, true);
        assert!(out.contains("--unused"));
    }
}
