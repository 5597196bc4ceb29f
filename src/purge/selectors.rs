//! Symbol extraction from printed CSS.
//!
//! Works on lightningcss output, where every prelude ends at `{` and every
//! declaration at `;` or `}`.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(-?[_a-zA-Z][_a-zA-Z0-9-]*)").unwrap());
static KEYFRAMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(?:-[a-z]+-)?keyframes\s+([_a-zA-Z-][_a-zA-Z0-9-]*)").unwrap()
});
static ANIMATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"animation(?:-name)?\s*:\s*([^;}]+)").unwrap());
static IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?[_a-zA-Z][_a-zA-Z0-9-]*").unwrap());
static VARIABLE_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[{;\s])(--[_a-zA-Z0-9-]+)\s*:").unwrap());
static VARIABLE_USE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\(\s*(--[_a-zA-Z0-9-]+)").unwrap());

/// Classes, keyframes and custom properties found in a stylesheet.
#[derive(Debug, Default)]
pub struct CssSymbols {
    /// Class names of each selector, in selector order.
    pub selectors: Vec<Vec<String>>,
    pub classes: BTreeSet<String>,
    pub keyframes: BTreeSet<String>,
    pub variables: BTreeSet<String>,
}

impl CssSymbols {
    pub fn extract(css: &str) -> Self {
        let mut symbols = Self::default();

        for prelude in preludes(css) {
            if prelude.starts_with('@') {
                continue;
            }
            for selector in split_selector_list(&prelude) {
                let classes: Vec<String> = CLASS
                    .captures_iter(&strip_attributes(selector))
                    .map(|c| c[1].to_string())
                    .collect();
                if classes.is_empty() {
                    continue;
                }
                symbols.classes.extend(classes.iter().cloned());
                symbols.selectors.push(classes);
            }
        }

        symbols.keyframes = KEYFRAMES
            .captures_iter(css)
            .map(|c| c[1].to_string())
            .collect();
        symbols.variables = VARIABLE_DECL
            .captures_iter(css)
            .map(|c| c[1].to_string())
            .collect();
        symbols
    }
}

/// Names referenced by `animation` / `animation-name` declarations.
pub fn animation_names(css: &str) -> BTreeSet<String> {
    ANIMATION
        .captures_iter(css)
        .flat_map(|c| {
            IDENT
                .find_iter(c.get(1).map_or("", |m| m.as_str()))
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Custom properties referenced through `var(--name)`.
pub fn variable_uses(css: &str) -> BTreeSet<String> {
    VARIABLE_USE
        .captures_iter(css)
        .map(|c| c[1].to_string())
        .collect()
}

/// Drop declarations of the given custom properties.
///
/// Expects one declaration per line, as lightningcss prints unminified.
pub fn remove_variables(css: &str, unused: &BTreeSet<String>) -> String {
    if unused.is_empty() {
        return css.to_string();
    }
    css.lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed
                .split_once(':')
                .is_some_and(|(name, _)| name.starts_with("--") && unused.contains(name.trim_end()))
        })
        .map(|line| format!("{line}\n"))
        .collect()
}

/// Text before each `{`, skipping quoted strings.
fn preludes(css: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in css.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '{' => {
                out.push(current.trim().to_string());
                current.clear();
            }
            '}' | ';' => current.clear(),
            _ => current.push(c),
        }
    }
    out
}

/// Split on top-level commas (not inside `:is(...)` and friends).
fn split_selector_list(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(list[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Blank out `[attr=value]` parts, whose values may contain dots.
fn strip_attributes(selector: &str) -> String {
    let mut out = String::with_capacity(selector.len());
    let mut depth = 0usize;
    for c in selector.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
