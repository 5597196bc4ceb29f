//! Safelist rule engine.
//!
//! A [`Safelist`] is an ordered set of rules; a symbol is protected when
//! any rule matches it.

use crate::config::SafelistConfig;
use regex::Regex;
use rustc_hash::FxHashSet;

/// What kind of CSS name a symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Class,
    Keyframe,
    Variable,
}

/// A name extracted from CSS, checked against the safelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol<'a> {
    pub kind: SymbolKind,
    pub name: &'a str,
}

impl<'a> Symbol<'a> {
    pub const fn class(name: &'a str) -> Self {
        Self { kind: SymbolKind::Class, name }
    }

    pub const fn keyframe(name: &'a str) -> Self {
        Self { kind: SymbolKind::Keyframe, name }
    }

    pub const fn variable(name: &'a str) -> Self {
        Self { kind: SymbolKind::Variable, name }
    }
}

/// How far a class pattern's protection reaches within a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternScope {
    /// Only the matching class.
    Standard,
    /// The matching class and every class after it in the selector.
    Deep,
    /// Every class in a selector containing a match.
    Greedy,
}

#[derive(Debug, Clone)]
pub enum SafelistRule {
    Exact(String),
    Affix { prefix: String, suffix: String },
    Pattern { regex: Regex, scope: PatternScope },
    Keyframe(String),
    Variable(String),
}

impl SafelistRule {
    pub fn matches(&self, symbol: &Symbol<'_>) -> bool {
        match (self, symbol.kind) {
            (Self::Exact(name), SymbolKind::Class) => name == symbol.name,
            (Self::Affix { prefix, suffix }, SymbolKind::Class) => {
                symbol.name.len() >= prefix.len() + suffix.len()
                    && symbol.name.starts_with(prefix.as_str())
                    && symbol.name.ends_with(suffix.as_str())
            }
            (Self::Pattern { regex, .. }, SymbolKind::Class) => regex.is_match(symbol.name),
            (Self::Keyframe(name), SymbolKind::Keyframe) => name == symbol.name,
            (Self::Variable(name), SymbolKind::Variable) => {
                name.trim_start_matches("--") == symbol.name.trim_start_matches("--")
            }
            _ => false,
        }
    }

    const fn scope(&self) -> PatternScope {
        match self {
            Self::Pattern { scope, .. } => *scope,
            _ => PatternScope::Standard,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Safelist {
    rules: Vec<SafelistRule>,
}

impl Safelist {
    pub fn new(rules: Vec<SafelistRule>) -> Self {
        Self { rules }
    }

    /// Build rules from the `[purge.safelist]` table.
    ///
    /// `standard` entries are exact names, `prefix*suffix` affixes, or
    /// `/regex/` patterns; `deep` and `greedy` entries are always regexes.
    pub fn from_config(config: &SafelistConfig) -> Result<Self, regex::Error> {
        let mut rules = Vec::new();

        for entry in &config.standard {
            rules.push(standard_rule(entry)?);
        }
        for pattern in &config.deep {
            rules.push(SafelistRule::Pattern {
                regex: Regex::new(pattern)?,
                scope: PatternScope::Deep,
            });
        }
        for pattern in &config.greedy {
            rules.push(SafelistRule::Pattern {
                regex: Regex::new(pattern)?,
                scope: PatternScope::Greedy,
            });
        }
        rules.extend(config.keyframes.iter().cloned().map(SafelistRule::Keyframe));
        rules.extend(config.variables.iter().cloned().map(SafelistRule::Variable));

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[SafelistRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn protects(&self, symbol: &Symbol<'_>) -> bool {
        self.rules.iter().any(|rule| rule.matches(symbol))
    }

    /// Add to `kept` the classes of one selector reached by `Deep` or
    /// `Greedy` patterns. `classes` is in selector order.
    pub fn expand_selector(&self, classes: &[String], kept: &mut FxHashSet<String>) {
        for rule in &self.rules {
            let scope = rule.scope();
            if scope == PatternScope::Standard {
                continue;
            }
            let Some(first) = classes
                .iter()
                .position(|class| rule.matches(&Symbol::class(class)))
            else {
                continue;
            };
            let reach = match scope {
                PatternScope::Greedy => &classes[..],
                _ => &classes[first..],
            };
            kept.extend(reach.iter().cloned());
        }
    }
}

fn standard_rule(entry: &str) -> Result<SafelistRule, regex::Error> {
    if entry.len() >= 2 && entry.starts_with('/') && entry.ends_with('/') {
        return Ok(SafelistRule::Pattern {
            regex: Regex::new(&entry[1..entry.len() - 1])?,
            scope: PatternScope::Standard,
        });
    }
    if let (Some(first), Some(last)) = (entry.find('*'), entry.rfind('*')) {
        return Ok(SafelistRule::Affix {
            prefix: entry[..first].to_string(),
            suffix: entry[last + 1..].to_string(),
        });
    }
    Ok(SafelistRule::Exact(entry.to_string()))
}
