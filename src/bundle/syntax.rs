//! Module syntax records extracted with oxc.
//!
//! Parsing happens once per module; everything the graph and the rewriter
//! need is copied out of the arena into owned records. Uses of imported
//! names are resolved through oxc's scope analysis, so shadowed locals
//! are never mistaken for imports.

use oxc::allocator::Allocator;
use oxc::ast::ast::{
    CallExpression, Declaration, ExportDefaultDeclarationKind, ExportNamedDeclaration,
    Expression, IdentifierReference, ImportDeclarationSpecifier, ImportExpression,
    ObjectProperty, Program, Statement, TaggedTemplateExpression,
};
use oxc::ast_visit::{Visit, walk};
use oxc::parser::Parser;
use oxc::semantic::{Scoping, SemanticBuilder, SymbolId};
use oxc::span::{GetSpan, SourceType, Span};
use rustc_hash::FxHashMap;

/// One binding introduced by an `import` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import local from "x"`
    Default(String),
    /// `import { imported as local } from "x"`
    Named { imported: String, local: String },
    /// `import * as local from "x"`
    Namespace(String),
}

impl ImportBinding {
    pub fn local(&self) -> &str {
        match self {
            Self::Default(local) | Self::Namespace(local) => local,
            Self::Named { local, .. } => local,
        }
    }
}

/// A static `import` declaration.
#[derive(Debug, Clone)]
pub struct StaticImport {
    pub span: Span,
    pub source: String,
    /// Empty for side-effect imports.
    pub bindings: Vec<ImportBinding>,
}

/// Syntactic position of an imported name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Any expression position.
    Read,
    /// `{ a }` object literal shorthand.
    Shorthand,
    /// `a(...)` or ``a`...` ``, where the callee must not receive a `this`.
    Callee,
}

/// One use of a default or named import binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReference {
    pub span: Span,
    /// Index into [`ModuleSyntax::imports`].
    pub import: usize,
    /// Index into that import's bindings.
    pub binding: usize,
    pub kind: ReferenceKind,
}

/// `local as exported`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportName {
    pub local: String,
    pub exported: String,
}

/// Export forms. `keyword` spans cover `export ` / `export default `.
#[derive(Debug, Clone)]
pub enum ExportRecord {
    /// `export const a = 1, b = 2;` / `export function f() {}`
    Declaration { keyword: Span, names: Vec<String> },
    /// `export { a, b as c };`
    Local { span: Span, names: Vec<ExportName> },
    /// `export { a as b } from "x";`
    From {
        span: Span,
        source: String,
        names: Vec<ExportName>,
    },
    /// `export * from "x";` / `export * as ns from "x";`
    All {
        span: Span,
        source: String,
        alias: Option<String>,
    },
    /// `export default function name() {}` / `export default class Name {}`
    DefaultDeclaration { keyword: Span, name: String },
    /// `export default <expression>` and anonymous functions or classes.
    DefaultExpression { keyword: Span, end: u32 },
}

impl ExportRecord {
    /// Module the record re-exports from.
    pub fn source(&self) -> Option<&str> {
        match self {
            Self::From { source, .. } | Self::All { source, .. } => Some(source),
            _ => None,
        }
    }

    fn start(&self) -> u32 {
        match self {
            Self::Declaration { keyword, .. }
            | Self::DefaultDeclaration { keyword, .. }
            | Self::DefaultExpression { keyword, .. } => keyword.start,
            Self::Local { span, .. } | Self::From { span, .. } | Self::All { span, .. } => {
                span.start
            }
        }
    }
}

/// `import("literal")`
#[derive(Debug, Clone)]
pub struct DynamicImport {
    pub span: Span,
    pub source: String,
}

/// Module-level syntax of one JavaScript file.
#[derive(Debug, Clone, Default)]
pub struct ModuleSyntax {
    pub imports: Vec<StaticImport>,
    pub exports: Vec<ExportRecord>,
    pub dynamic: Vec<DynamicImport>,
    /// Uses of default and named import bindings. Namespace bindings stay
    /// plain locals.
    pub references: Vec<ImportReference>,
}

impl ModuleSyntax {
    /// Parse `source` as an ES module. The error is the first parser diagnostic.
    pub fn parse(source: &str) -> Result<Self, String> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
        if let Some(first) = ret.errors.first() {
            return Err(first.to_string());
        }

        let mut syntax = Self::default();
        for stmt in &ret.program.body {
            syntax.collect_statement(stmt);
        }

        let mut dynamic = DynamicImports::default();
        dynamic.visit_program(&ret.program);
        syntax.dynamic = dynamic.found;

        let semantic = SemanticBuilder::new().build(&ret.program).semantic;
        let mut references = ImportReferences {
            scoping: semantic.scoping(),
            bound: import_symbols(&ret.program),
            found: Vec::new(),
        };
        references.visit_program(&ret.program);
        syntax.references = references.found;
        Ok(syntax)
    }

    /// Static specifiers in source order, then dynamic ones.
    pub fn requests(&self) -> Vec<&str> {
        let mut statics: Vec<(u32, &str)> = self
            .imports
            .iter()
            .map(|i| (i.span.start, i.source.as_str()))
            .chain(
                self.exports
                    .iter()
                    .filter_map(|e| e.source().map(|s| (e.start(), s))),
            )
            .collect();
        statics.sort_by_key(|(start, _)| *start);

        statics
            .into_iter()
            .map(|(_, source)| source)
            .chain(self.dynamic.iter().map(|d| d.source.as_str()))
            .collect()
    }

    fn collect_statement(&mut self, stmt: &Statement<'_>) {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                let bindings = decl
                    .specifiers
                    .iter()
                    .flatten()
                    .map(|spec| match spec {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => ImportBinding::Named {
                            imported: s.imported.name().to_string(),
                            local: s.local.name.to_string(),
                        },
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            ImportBinding::Default(s.local.name.to_string())
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            ImportBinding::Namespace(s.local.name.to_string())
                        }
                    })
                    .collect();
                self.imports.push(StaticImport {
                    span: decl.span,
                    source: decl.source.value.to_string(),
                    bindings,
                });
            }
            Statement::ExportNamedDeclaration(decl) => {
                let names = || {
                    decl.specifiers
                        .iter()
                        .map(|s| ExportName {
                            local: s.local.name().to_string(),
                            exported: s.exported.name().to_string(),
                        })
                        .collect()
                };
                let record = if let Some(declaration) = &decl.declaration {
                    ExportRecord::Declaration {
                        keyword: Span::new(decl.span.start, declaration.span().start),
                        names: declared_names(declaration),
                    }
                } else if let Some(source) = &decl.source {
                    ExportRecord::From {
                        span: decl.span,
                        source: source.value.to_string(),
                        names: names(),
                    }
                } else {
                    ExportRecord::Local {
                        span: decl.span,
                        names: names(),
                    }
                };
                self.exports.push(record);
            }
            Statement::ExportDefaultDeclaration(decl) => {
                let inner = decl.declaration.span();
                let keyword = Span::new(decl.span.start, inner.start);
                let name = match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                        func.id.as_ref().map(|id| id.name.to_string())
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        class.id.as_ref().map(|id| id.name.to_string())
                    }
                    _ => None,
                };
                self.exports.push(match name {
                    Some(name) => ExportRecord::DefaultDeclaration { keyword, name },
                    None => ExportRecord::DefaultExpression {
                        keyword,
                        end: inner.end,
                    },
                });
            }
            Statement::ExportAllDeclaration(decl) => {
                self.exports.push(ExportRecord::All {
                    span: decl.span,
                    source: decl.source.value.to_string(),
                    alias: decl.exported.as_ref().map(|name| name.name().to_string()),
                });
            }
            _ => {}
        }
    }
}

/// Names bound by an exported declaration.
fn declared_names(declaration: &Declaration<'_>) -> Vec<String> {
    match declaration {
        Declaration::VariableDeclaration(var) => var
            .declarations
            .iter()
            .flat_map(|d| d.id.get_binding_identifiers())
            .map(|id| id.name.to_string())
            .collect(),
        Declaration::FunctionDeclaration(func) => {
            func.id.iter().map(|id| id.name.to_string()).collect()
        }
        Declaration::ClassDeclaration(class) => {
            class.id.iter().map(|id| id.name.to_string()).collect()
        }
        _ => Vec::new(),
    }
}

/// Symbol of each default or named import binding → (import, binding) index.
fn import_symbols(program: &Program<'_>) -> FxHashMap<SymbolId, (usize, usize)> {
    let declarations = program.body.iter().filter_map(|stmt| match stmt {
        Statement::ImportDeclaration(decl) => Some(decl),
        _ => None,
    });

    let mut bound = FxHashMap::default();
    for (import, decl) in declarations.enumerate() {
        for (binding, spec) in decl.specifiers.iter().flatten().enumerate() {
            if matches!(spec, ImportDeclarationSpecifier::ImportNamespaceSpecifier(_)) {
                continue;
            }
            if let Some(symbol) = spec.local().symbol_id.get() {
                bound.insert(symbol, (import, binding));
            }
        }
    }
    bound
}

/// Collects identifier references that resolve to an import binding.
struct ImportReferences<'s> {
    scoping: &'s Scoping,
    bound: FxHashMap<SymbolId, (usize, usize)>,
    found: Vec<ImportReference>,
}

impl ImportReferences<'_> {
    /// Record `ident` if it resolves to an import. Returns whether it did.
    fn record(&mut self, ident: &IdentifierReference<'_>, kind: ReferenceKind) -> bool {
        let Some(reference) = ident.reference_id.get() else {
            return false;
        };
        let Some(symbol) = self.scoping.get_reference(reference).symbol_id() else {
            return false;
        };
        let Some(&(import, binding)) = self.bound.get(&symbol) else {
            return false;
        };
        self.found.push(ImportReference {
            span: ident.span,
            import,
            binding,
            kind,
        });
        true
    }
}

impl<'a> Visit<'a> for ImportReferences<'_> {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        self.record(it, ReferenceKind::Read);
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        if it.shorthand
            && let Expression::Identifier(ident) = &it.value
        {
            self.record(ident, ReferenceKind::Shorthand);
            return;
        }
        walk::walk_object_property(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Expression::Identifier(ident) = &it.callee
            && self.record(ident, ReferenceKind::Callee)
        {
            self.visit_arguments(&it.arguments);
            return;
        }
        walk::walk_call_expression(self, it);
    }

    fn visit_tagged_template_expression(&mut self, it: &TaggedTemplateExpression<'a>) {
        if let Expression::Identifier(ident) = &it.tag
            && self.record(ident, ReferenceKind::Callee)
        {
            self.visit_template_literal(&it.quasi);
            return;
        }
        walk::walk_tagged_template_expression(self, it);
    }

    // `export { a }` names are handled by the export getters.
    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if let Some(declaration) = &it.declaration {
            self.visit_declaration(declaration);
        }
    }
}

/// Collects `import()` calls whose specifier is a literal.
#[derive(Default)]
struct DynamicImports {
    found: Vec<DynamicImport>,
}

impl<'a> Visit<'a> for DynamicImports {
    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        let literal = match &it.source {
            Expression::StringLiteral(lit) => Some(lit.value.to_string()),
            Expression::TemplateLiteral(tpl) if tpl.expressions.is_empty() => tpl
                .quasis
                .first()
                .and_then(|q| q.value.cooked.as_ref())
                .map(|cooked| cooked.to_string()),
            _ => None,
        };
        if let Some(source) = literal {
            self.found.push(DynamicImport {
                span: it.span,
                source,
            });
        }
        walk::walk_import_expression(self, it);
    }
}
