//! Module graph resolution.
//!
//! Breadth-first from the entry. Each frontier is read and parsed in
//! parallel; ids are then assigned sequentially in discovery order so the
//! graph is identical across runs.

use super::syntax::ModuleSyntax;
use super::{BundleError, Resolver};
use crate::asset::{AssetKind, AssetRef};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Index into [`ModuleGraph::modules`].
pub type ModuleId = usize;

/// What an import specifier points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    Module(ModuleId),
    /// Compiled into `main.css`; the import is dropped from the script.
    Style(PathBuf),
    /// Copied unhashed; the import binding becomes its URL.
    Asset(AssetRef),
}

/// A parsed module. Its id is its index in [`ModuleGraph::modules`].
#[derive(Debug)]
pub struct Module {
    pub path: PathBuf,
    pub source: String,
    pub syntax: ModuleSyntax,
    /// Specifier → dependency, for every request in `syntax`.
    pub deps: FxHashMap<String, Dependency>,
}

impl Module {
    /// Modules this one imports statically.
    pub fn static_modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        let statics = self
            .syntax
            .imports
            .iter()
            .map(|i| i.source.as_str())
            .chain(self.syntax.exports.iter().filter_map(|e| e.source()));
        statics.filter_map(|s| match self.deps.get(s) {
            Some(Dependency::Module(id)) => Some(*id),
            _ => None,
        })
    }

    /// Modules this one loads through `import()`.
    pub fn dynamic_modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.syntax
            .dynamic
            .iter()
            .filter_map(|d| match self.deps.get(&d.source) {
                Some(Dependency::Module(id)) => Some(*id),
                _ => None,
            })
    }
}

/// Every module reachable from the entry.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    pub modules: Vec<Module>,
    /// Stylesheets imported anywhere in the graph, in discovery order.
    pub styles: Vec<PathBuf>,
    /// Fonts and images imported anywhere in the graph.
    pub assets: Vec<AssetRef>,
}

/// A module read and parsed, its specifiers resolved to paths.
struct Parsed {
    source: String,
    syntax: ModuleSyntax,
    resolved: Vec<(String, PathBuf)>,
}

impl ModuleGraph {
    /// Entry module id. Only meaningful when the graph is non-empty.
    pub const ENTRY: ModuleId = 0;

    /// Resolve the graph rooted at `entry`.
    pub fn resolve(entry: &Path, resolver: &Resolver<'_>) -> Result<Self, BundleError> {
        let mut graph = Self::default();
        let mut ids: FxHashMap<PathBuf, ModuleId> = FxHashMap::default();
        let mut seen_styles: FxHashSet<PathBuf> = FxHashSet::default();
        let mut seen_assets: FxHashSet<PathBuf> = FxHashSet::default();

        ids.insert(entry.to_path_buf(), Self::ENTRY);
        let mut frontier = vec![entry.to_path_buf()];

        while !frontier.is_empty() {
            let parsed = frontier
                .par_iter()
                .map(|path| parse_module(path, resolver))
                .collect::<Result<Vec<_>, _>>()?;

            let mut next = Vec::new();
            for (path, parsed) in frontier.into_iter().zip(parsed) {
                let mut deps = FxHashMap::default();
                for (specifier, target) in parsed.resolved {
                    let dep = match AssetKind::of(&target) {
                        AssetKind::Stylesheet => {
                            if seen_styles.insert(target.clone()) {
                                graph.styles.push(target.clone());
                            }
                            Dependency::Style(target)
                        }
                        AssetKind::Font | AssetKind::Image => {
                            let asset = AssetRef {
                                kind: AssetKind::of(&target),
                                source: target,
                            };
                            if seen_assets.insert(asset.source.clone()) {
                                graph.assets.push(asset.clone());
                            }
                            Dependency::Asset(asset)
                        }
                        AssetKind::Script => {
                            let next_id = ids.len();
                            let id = *ids.entry(target.clone()).or_insert_with(|| {
                                next.push(target);
                                next_id
                            });
                            Dependency::Module(id)
                        }
                    };
                    deps.insert(specifier, dep);
                }

                graph.modules.push(Module {
                    path,
                    source: parsed.source,
                    syntax: parsed.syntax,
                    deps,
                });
            }
            frontier = next;
        }

        Ok(graph)
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    /// `root` and every module it reaches through static imports.
    pub fn static_closure(&self, root: ModuleId) -> BTreeSet<ModuleId> {
        let mut closure = BTreeSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if closure.insert(id) {
                stack.extend(self.modules[id].static_modules());
            }
        }
        closure
    }
}

fn parse_module(path: &Path, resolver: &Resolver<'_>) -> Result<Parsed, BundleError> {
    let source = fs::read_to_string(path).map_err(|source| BundleError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let syntax = ModuleSyntax::parse(&source).map_err(|message| BundleError::Parse {
        file: path.to_path_buf(),
        message,
    })?;

    let mut resolved = Vec::new();
    let mut seen = FxHashSet::default();
    for specifier in syntax.requests() {
        if seen.insert(specifier) {
            resolved.push((specifier.to_string(), resolver.resolve(specifier, path)?));
        }
    }

    Ok(Parsed {
        source,
        syntax,
        resolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn resolve(root: &Path) -> Result<ModuleGraph, BundleError> {
        let alias = BTreeMap::new();
        let resolver = Resolver::new(root, &alias);
        ModuleGraph::resolve(&root.join("src/js/main.js"), &resolver)
    }

    #[test]
    fn test_discovery_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/js/main.js", "import a from './a';\nimport './b.js';\nimport('./lazy');\n");
        write(root, "src/js/a.js", "import './shared';\nexport default 1;\n");
        write(root, "src/js/b.js", "import './shared';\n");
        write(root, "src/js/shared.js", "");
        write(root, "src/js/lazy.js", "");

        let graph = resolve(root).unwrap();
        let names: Vec<_> = graph
            .modules
            .iter()
            .map(|m| m.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["main.js", "a.js", "b.js", "lazy.js", "shared.js"]);
        assert_eq!(graph.module(0).dynamic_modules().collect::<Vec<_>>(), [3]);
        assert_eq!(
            graph.static_closure(0).into_iter().collect::<Vec<_>>(),
            [0, 1, 2, 4]
        );
    }

    #[test]
    fn test_styles_and_assets() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "src/js/main.js",
            "import '../scss/main.scss';\nimport icon from '../fonts/icon.woff2';\nimport './other';\n",
        );
        write(root, "src/js/other.js", "import '../scss/main.scss';\nimport '../css/extra.css';\n");
        write(root, "src/scss/main.scss", ".btn { color: red; }");
        write(root, "src/css/extra.css", ".x {}");
        write(root, "src/fonts/icon.woff2", "font");

        let graph = resolve(root).unwrap();
        assert_eq!(graph.modules.len(), 2);
        assert_eq!(
            graph.styles,
            [root.join("src/scss/main.scss"), root.join("src/css/extra.css")]
        );
        assert_eq!(graph.assets.len(), 1);
        assert_eq!(graph.assets[0].output_path(), "assets/fonts/icon.woff2");
    }

    #[test]
    fn test_cycle_terminates() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/js/main.js", "import './a';\n");
        write(root, "src/js/a.js", "import './main';\n");

        let graph = resolve(root).unwrap();
        assert_eq!(graph.modules.len(), 2);
        assert_eq!(graph.static_closure(1).len(), 2);
    }

    #[test]
    fn test_errors() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/js/main.js", "import 'lodash';\n");
        assert!(matches!(resolve(root), Err(BundleError::Unresolved { .. })));

        write(root, "src/js/main.js", "import { from;\n");
        assert!(matches!(resolve(root), Err(BundleError::Parse { .. })));
    }
}
