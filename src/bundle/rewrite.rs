//! ES module syntax → registry factory.
//!
//! ```text
//! import a, { b as c } from "./x";   const __pagepack_m1 = __require(1);
//! a(c);                              (0, __pagepack_m1["default"])(__pagepack_m1["b"]);
//! export const d = 1;                __require.export(exports, { "d": () => d });
//! export default expr;               const __pagepack_default = expr;
//! import("./lazy")                   __require.load([1], 4)
//! ```
//!
//! Every use of an imported name reads through the exporter's `exports`
//! object, whose getters return the current binding. Importers therefore
//! see later assignments, and a cycle only fails where an ES module would
//! hit an uninitialized binding.

use super::graph::{Dependency, Module, ModuleId};
use super::syntax::{ExportRecord, ImportBinding, ReferenceKind};
use oxc::span::Span;
use rustc_hash::{FxHashMap, FxHashSet};

const DEFAULT_LOCAL: &str = "__pagepack_default";

/// A source range replaced by `text`. Empty ranges insert.
struct Edit {
    start: u32,
    end: u32,
    text: String,
}

impl Edit {
    fn remove(span: Span) -> Self {
        Self::replace(span, String::new())
    }

    fn replace(span: Span, text: String) -> Self {
        Self {
            start: span.start,
            end: span.end,
            text,
        }
    }

    fn insert(at: u32, text: &str) -> Self {
        Self {
            start: at,
            end: at,
            text: text.to_string(),
        }
    }
}

/// JavaScript string literal for `value`.
pub fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Render `module` as `function (module, exports, __require) {...}`.
///
/// `loads` maps a dynamic-import target to the async chunks it needs;
/// targets absent from it already live in the main chunk.
pub fn rewrite(module: &Module, loads: &FxHashMap<ModuleId, Vec<usize>>) -> String {
    let mut edits = Vec::new();
    // (source position, statement) so requires keep import order
    let mut prologue: Vec<(u32, String)> = Vec::new();
    let mut getters: Vec<(String, String)> = Vec::new();
    let mut required = FxHashSet::default();
    // import local → member expression on the exporter
    let mut live: FxHashMap<&str, String> = FxHashMap::default();

    for import in &module.syntax.imports {
        edits.push(Edit::remove(import.span));
        let stmt = match module.deps.get(&import.source) {
            Some(Dependency::Module(id)) => {
                for binding in &import.bindings {
                    if let Some(member) = member(*id, binding) {
                        live.insert(binding.local(), member);
                    }
                }
                import_statement(&import.bindings, *id, &mut required)
            }
            Some(Dependency::Style(_)) => bind_all(&import.bindings, "{}"),
            Some(Dependency::Asset(asset)) => bind_all(
                &import.bindings,
                &format!("__require.asset({})", js_string(&asset.sibling_url())),
            ),
            None => continue,
        };
        if !stmt.is_empty() {
            prologue.push((import.span.start, stmt));
        }
    }

    for reference in &module.syntax.references {
        let import = &module.syntax.imports[reference.import];
        let Some(member) = import
            .bindings
            .get(reference.binding)
            .and_then(|b| live.get(b.local()))
        else {
            continue;
        };
        let text = match reference.kind {
            ReferenceKind::Read => member.clone(),
            ReferenceKind::Shorthand => {
                format!("{}: {member}", import.bindings[reference.binding].local())
            }
            ReferenceKind::Callee => format!("(0, {member})"),
        };
        edits.push(Edit::replace(reference.span, text));
    }

    for export in &module.syntax.exports {
        match export {
            ExportRecord::Declaration { keyword, names } => {
                edits.push(Edit::remove(*keyword));
                getters.extend(names.iter().map(|n| (n.clone(), n.clone())));
            }
            ExportRecord::Local { span, names } => {
                edits.push(Edit::remove(*span));
                getters.extend(names.iter().map(|n| {
                    let expr = live.get(n.local.as_str()).unwrap_or(&n.local);
                    (n.exported.clone(), expr.clone())
                }));
            }
            ExportRecord::From { span, source, names } => {
                edits.push(Edit::remove(*span));
                if let Some(Dependency::Module(id)) = module.deps.get(source) {
                    prologue.push((span.start, format!("__require({id});")));
                    getters.extend(names.iter().map(|n| {
                        (n.exported.clone(), format!("__require({id})[{}]", js_string(&n.local)))
                    }));
                }
            }
            ExportRecord::All { span, source, alias } => {
                edits.push(Edit::remove(*span));
                if let Some(Dependency::Module(id)) = module.deps.get(source) {
                    match alias {
                        Some(alias) => {
                            prologue.push((span.start, format!("__require({id});")));
                            getters.push((alias.clone(), format!("__require({id})")));
                        }
                        None => prologue.push((
                            span.start,
                            format!("__require.reexport(exports, __require({id}));"),
                        )),
                    }
                }
            }
            ExportRecord::DefaultDeclaration { keyword, name } => {
                edits.push(Edit::remove(*keyword));
                getters.push(("default".to_string(), name.clone()));
            }
            ExportRecord::DefaultExpression { keyword, end } => {
                edits.push(Edit::replace(*keyword, format!("const {DEFAULT_LOCAL} = ")));
                edits.push(Edit::insert(*end, ";"));
                getters.push(("default".to_string(), DEFAULT_LOCAL.to_string()));
            }
        }
    }

    for import in &module.syntax.dynamic {
        let call = match module.deps.get(&import.source) {
            Some(Dependency::Module(id)) => {
                let chunks = loads.get(id).map(Vec::as_slice).unwrap_or_default();
                let list = chunks
                    .iter()
                    .map(usize::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("__require.load([{list}], {id})")
            }
            Some(Dependency::Style(_)) => "Promise.resolve({})".to_string(),
            Some(Dependency::Asset(asset)) => format!(
                "Promise.resolve({{ \"default\": __require.asset({}) }})",
                js_string(&asset.sibling_url())
            ),
            None => continue,
        };
        edits.push(Edit::replace(import.span, call));
    }

    prologue.sort_by_key(|(start, _)| *start);

    let mut out = String::with_capacity(module.source.len() + 256);
    out.push_str("function (module, exports, __require) {\n\"use strict\";\n");
    if !getters.is_empty() {
        let body = getters
            .iter()
            .map(|(name, expr)| format!("{}: () => {expr}", js_string(name)))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("__require.export(exports, {{ {body} }});\n"));
    }
    for (_, stmt) in prologue {
        out.push_str(&stmt);
        out.push('\n');
    }
    out.push_str(&apply(&module.source, edits));
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('}');
    out
}

fn module_local(id: ModuleId) -> String {
    format!("__pagepack_m{id}")
}

/// `__pagepack_m1["name"]` for default and named bindings.
fn member(id: ModuleId, binding: &ImportBinding) -> Option<String> {
    let imported = match binding {
        ImportBinding::Default(_) => "default",
        ImportBinding::Named { imported, .. } => imported,
        ImportBinding::Namespace(_) => return None,
    };
    Some(format!("{}[{}]", module_local(id), js_string(imported)))
}

/// Require statements for one import. Each exporter is bound once per module.
fn import_statement(
    bindings: &[ImportBinding],
    id: ModuleId,
    required: &mut FxHashSet<ModuleId>,
) -> String {
    if bindings.is_empty() {
        return format!("__require({id});");
    }

    let mut stmts = Vec::new();
    for binding in bindings {
        match binding {
            ImportBinding::Namespace(local) => {
                stmts.push(format!("const {local} = __require({id});"));
            }
            _ if required.insert(id) => {
                stmts.push(format!("const {} = __require({id});", module_local(id)));
            }
            _ => {}
        }
    }
    stmts.join("\n")
}

/// Bind every local of a non-script import to `value`.
fn bind_all(bindings: &[ImportBinding], value: &str) -> String {
    bindings
        .iter()
        .map(|b| format!("const {} = {value};", b.local()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Apply non-overlapping edits back to front.
fn apply(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| (e.start, e.end));
    let mut out = source.to_string();
    for edit in edits.iter().rev() {
        out.replace_range(edit.start as usize..edit.end as usize, &edit.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetRef;
    use crate::bundle::syntax::ModuleSyntax;
    use std::path::PathBuf;

    fn module(source: &str, deps: &[(&str, Dependency)]) -> Module {
        Module {
            path: PathBuf::from("/site/src/js/main.js"),
            source: source.to_string(),
            syntax: ModuleSyntax::parse(source).unwrap(),
            deps: deps
                .iter()
                .map(|(s, d)| (s.to_string(), d.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_imports_become_requires() {
        let m = module(
            "import def, { a, b as c } from './x';\nimport * as ns from './y';\nimport './z';\nconsole.log(def, a, c, ns);\n",
            &[
                ("./x", Dependency::Module(1)),
                ("./y", Dependency::Module(2)),
                ("./z", Dependency::Module(3)),
            ],
        );
        let out = rewrite(&m, &FxHashMap::default());
        assert!(out.starts_with("function (module, exports, __require) {"));
        assert!(out.contains("const __pagepack_m1 = __require(1);"));
        assert!(out.contains("const ns = __require(2);"));
        assert!(out.contains("__require(3);"));
        assert!(out.contains(
            "console.log(__pagepack_m1[\"default\"], __pagepack_m1[\"a\"], __pagepack_m1[\"b\"], ns);"
        ));
        assert!(!out.contains("import "));
        assert!(out.ends_with('}'));
    }

    #[test]
    fn test_imported_names_stay_live() {
        let m = module(
            "import { count, inc } from './counter';\ninc();\nconst snapshot = { count };\nfunction read(count) { return count; }\nexport { count as current };\n",
            &[("./counter", Dependency::Module(1))],
        );
        let out = rewrite(&m, &FxHashMap::default());
        assert_eq!(out.matches("__require(1)").count(), 1);
        assert!(out.contains("(0, __pagepack_m1[\"inc\"])();"));
        assert!(out.contains("{ count: __pagepack_m1[\"count\"] }"));
        assert!(out.contains("function read(count) { return count; }"));
        assert!(out.contains("\"current\": () => __pagepack_m1[\"count\"]"));
        assert!(!out.contains("const { "));
    }

    #[test]
    fn test_cycle_reads_exports_lazily() {
        // main ⇄ b: b is evaluated while main is still pending, so it may
        // only touch main's exports from inside functions called later.
        let b = module(
            "import { a } from './main';\nexport function readA() { return a; }\n",
            &[("./main", Dependency::Module(0))],
        );
        let out = rewrite(&b, &FxHashMap::default());
        assert!(out.contains("const __pagepack_m0 = __require(0);"));
        assert!(out.contains("function readA() { return __pagepack_m0[\"a\"]; }"));
        assert!(out.find("__require.export(").unwrap() < out.find("__require(0)").unwrap());
    }

    #[test]
    fn test_exports_become_getters() {
        let m = module(
            "export const one = 1;\nconst two = 2;\nexport { two as deux };\nexport default one + two;\n",
            &[],
        );
        let out = rewrite(&m, &FxHashMap::default());
        assert!(out.contains(
            "__require.export(exports, { \"one\": () => one, \"deux\": () => two, \"default\": () => __pagepack_default });"
        ));
        assert!(out.contains("\nconst one = 1;"));
        assert!(out.contains("const __pagepack_default = one + two;"));
        assert!(!out.contains("export "));
    }

    #[test]
    fn test_reexports() {
        let m = module(
            "export { a as b } from './x';\nexport * from './y';\nexport * as z from './z';\n",
            &[
                ("./x", Dependency::Module(1)),
                ("./y", Dependency::Module(2)),
                ("./z", Dependency::Module(3)),
            ],
        );
        let out = rewrite(&m, &FxHashMap::default());
        assert!(out.contains("\"b\": () => __require(1)[\"a\"]"));
        assert!(out.contains("\"z\": () => __require(3)"));
        assert!(out.contains("__require.reexport(exports, __require(2));"));
    }

    #[test]
    fn test_non_script_imports() {
        let font = AssetRef::binary(PathBuf::from("/site/src/fonts/icon.woff2")).unwrap();
        let m = module(
            "import '../scss/main.scss';\nimport icon from '../fonts/icon.woff2';\nuse(icon);\n",
            &[
                ("../scss/main.scss", Dependency::Style(PathBuf::from("/site/src/scss/main.scss"))),
                ("../fonts/icon.woff2", Dependency::Asset(font)),
            ],
        );
        let out = rewrite(&m, &FxHashMap::default());
        assert!(out.contains("const icon = __require.asset(\"../fonts/icon.woff2\");"));
        assert!(!out.contains("main.scss"));
    }

    #[test]
    fn test_dynamic_import() {
        let m = module(
            "button.onclick = () => import('./page').then(m => m.default());\nimport('./eager');\n",
            &[("./page", Dependency::Module(4)), ("./eager", Dependency::Module(1))],
        );
        let mut loads = FxHashMap::default();
        loads.insert(4, vec![1, 2]);
        let out = rewrite(&m, &loads);
        assert!(out.contains("__require.load([1, 2], 4).then(m => m.default())"));
        assert!(out.contains("__require.load([], 1);"));
    }

    #[test]
    fn test_default_function_keeps_hoisting() {
        let m = module("export default function setup() {}\n", &[]);
        let out = rewrite(&m, &FxHashMap::default());
        assert!(out.contains("\"default\": () => setup"));
        assert!(out.contains("\nfunction setup() {}"));
    }
}
