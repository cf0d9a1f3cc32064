//! Hand-rolled symbol resolution and reference lookup: for each file,
//! collect every top-level declaration and import, and resolve identifier
//! references back to the declaration they name.
//!
//! This binder is intentionally lexical and shallow rather than a full
//! scope-graph: name resolution only needs to chase single-assignment
//! variables and forward parameters one hop at a time, so a two-tier
//! resolution (innermost enclosing function, then file top level, then one
//! hop through an import) covers every case this analysis needs.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use oxc_ast::ast::{
    BindingPatternKind, Class, ClassElement, Declaration, Expression, Function,
    ImportDeclarationSpecifier, ModuleExportName, PropertyKey, Statement, TSEnumDeclaration,
    TSEnumMemberName, TSInterfaceDeclaration, TSType, TSTypeAliasDeclaration, TSTypeAnnotation,
};

use crate::ast::Source;

#[derive(Debug, Clone)]
pub enum ImportedName {
    Named(String),
    Default,
    Namespace,
}

#[derive(Debug, Clone)]
pub struct ImportRef {
    pub module_specifier: String,
    pub imported: ImportedName,
}

/// A module-scope (or class-scope, for methods) declaration reachable by
/// name without going through a function's own parameters/locals.
pub enum TopLevelBinding<'a> {
    Function(&'a Function<'a>),
    VariableWithInit(&'a Expression<'a>, usize),
    VariableNoInit(usize),
    Class(&'a Class<'a>),
    Enum(&'a TSEnumDeclaration<'a>),
}

/// A type-level declaration — interfaces and object-shaped type aliases —
/// consulted by `types.rs` to resolve the "expected object type" of a
/// call/JSX argument for missing-property synthesis.
pub enum TypeDecl<'a> {
    Interface(&'a TSInterfaceDeclaration<'a>),
    Alias(&'a TSType<'a>),
}

pub struct FileScope<'a> {
    pub top_level: HashMap<String, TopLevelBinding<'a>>,
    pub exported: HashSet<String>,
    pub imports: HashMap<String, ImportRef>,
    pub type_decls: HashMap<String, TypeDecl<'a>>,
}

impl<'a> FileScope<'a> {
    pub fn build(source: &Source<'a>) -> Self {
        let mut top_level = HashMap::new();
        let mut exported = HashSet::new();
        let mut imports = HashMap::new();
        let mut type_decls = HashMap::new();

        for stmt in &source.program.body {
            collect_statement(
                stmt,
                source,
                &mut top_level,
                &mut exported,
                &mut imports,
                &mut type_decls,
                true,
            );
        }

        Self {
            top_level,
            exported,
            imports,
            type_decls,
        }
    }
}

fn collect_statement<'a>(
    stmt: &'a Statement<'a>,
    source: &Source<'a>,
    top_level: &mut HashMap<String, TopLevelBinding<'a>>,
    exported: &mut HashSet<String>,
    imports: &mut HashMap<String, ImportRef>,
    type_decls: &mut HashMap<String, TypeDecl<'a>>,
    at_module_top: bool,
) {
    match stmt {
        Statement::FunctionDeclaration(f) => {
            if let Some(id) = &f.id {
                top_level.insert(id.name.to_string(), TopLevelBinding::Function(f));
            }
        }
        Statement::ClassDeclaration(c) => {
            if let Some(id) = &c.id {
                top_level.insert(id.name.to_string(), TopLevelBinding::Class(c));
            }
        }
        Statement::TSEnumDeclaration(e) => {
            top_level.insert(e.id.name.to_string(), TopLevelBinding::Enum(e));
        }
        Statement::TSInterfaceDeclaration(i) => {
            type_decls.insert(i.id.name.to_string(), TypeDecl::Interface(i));
        }
        Statement::TSTypeAliasDeclaration(a) => {
            type_decls.insert(a.id.name.to_string(), TypeDecl::Alias(&a.type_annotation));
        }
        Statement::VariableDeclaration(decl) => {
            for d in &decl.declarations {
                if let BindingPatternKind::BindingIdentifier(id) = &d.id.kind {
                    let line = source.line_of(d.span.start);
                    let binding = match &d.init {
                        Some(init) => TopLevelBinding::VariableWithInit(init, line),
                        None => TopLevelBinding::VariableNoInit(line),
                    };
                    top_level.insert(id.name.to_string(), binding);
                }
            }
        }
        Statement::ImportDeclaration(imp) => {
            let module_specifier = imp.source.value.to_string();
            if let Some(specifiers) = &imp.specifiers {
                for spec in specifiers {
                    match spec {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            let imported_name = match &s.imported {
                                ModuleExportName::IdentifierName(n) => n.name.to_string(),
                                ModuleExportName::IdentifierReference(n) => n.name.to_string(),
                                ModuleExportName::StringLiteral(n) => n.value.to_string(),
                            };
                            imports.insert(
                                s.local.name.to_string(),
                                ImportRef {
                                    module_specifier: module_specifier.clone(),
                                    imported: ImportedName::Named(imported_name),
                                },
                            );
                        }
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            imports.insert(
                                s.local.name.to_string(),
                                ImportRef {
                                    module_specifier: module_specifier.clone(),
                                    imported: ImportedName::Default,
                                },
                            );
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            imports.insert(
                                s.local.name.to_string(),
                                ImportRef {
                                    module_specifier: module_specifier.clone(),
                                    imported: ImportedName::Namespace,
                                },
                            );
                        }
                    }
                }
            }
        }
        Statement::ExportNamedDeclaration(exp) => {
            if let Some(decl) = &exp.declaration {
                record_export_names(decl, exported);
                collect_declaration(decl, source, top_level);
                collect_type_decl(decl, type_decls);
            }
            for spec in &exp.specifiers {
                if let ModuleExportName::IdentifierName(n) = &spec.exported {
                    exported.insert(n.name.to_string());
                } else if let ModuleExportName::IdentifierReference(n) = &spec.exported {
                    exported.insert(n.name.to_string());
                }
            }
        }
        Statement::ExportDefaultDeclaration(_) => {
            // Default exports have no stable name to key a declaration id
            // on in this analyzer's "file:name" scheme, so they are
            // dropped silently rather than classified.
        }
        _ if at_module_top => {
            // Ignore other top-level statements (bare expressions, etc.)
        }
        _ => {}
    }
}

fn record_export_names(decl: &Declaration, exported: &mut HashSet<String>) {
    match decl {
        Declaration::FunctionDeclaration(f) => {
            if let Some(id) = &f.id {
                exported.insert(id.name.to_string());
            }
        }
        Declaration::ClassDeclaration(c) => {
            if let Some(id) = &c.id {
                exported.insert(id.name.to_string());
            }
        }
        Declaration::TSEnumDeclaration(e) => {
            exported.insert(e.id.name.to_string());
        }
        Declaration::VariableDeclaration(v) => {
            for d in &v.declarations {
                if let BindingPatternKind::BindingIdentifier(id) = &d.id.kind {
                    exported.insert(id.name.to_string());
                }
            }
        }
        _ => {}
    }
}

fn collect_type_decl<'a>(decl: &'a Declaration<'a>, type_decls: &mut HashMap<String, TypeDecl<'a>>) {
    match decl {
        Declaration::TSInterfaceDeclaration(i) => {
            type_decls.insert(i.id.name.to_string(), TypeDecl::Interface(i));
        }
        Declaration::TSTypeAliasDeclaration(a) => {
            type_decls.insert(a.id.name.to_string(), TypeDecl::Alias(&a.type_annotation));
        }
        _ => {}
    }
}

fn collect_declaration<'a>(
    decl: &'a Declaration<'a>,
    source: &Source<'a>,
    top_level: &mut HashMap<String, TopLevelBinding<'a>>,
) {
    match decl {
        Declaration::FunctionDeclaration(f) => {
            if let Some(id) = &f.id {
                top_level.insert(id.name.to_string(), TopLevelBinding::Function(f));
            }
        }
        Declaration::ClassDeclaration(c) => {
            if let Some(id) = &c.id {
                top_level.insert(id.name.to_string(), TopLevelBinding::Class(c));
            }
        }
        Declaration::TSEnumDeclaration(e) => {
            top_level.insert(e.id.name.to_string(), TopLevelBinding::Enum(e));
        }
        Declaration::VariableDeclaration(v) => {
            for d in &v.declarations {
                if let BindingPatternKind::BindingIdentifier(id) = &d.id.kind {
                    let line = source.line_of(d.span.start);
                    let binding = match &d.init {
                        Some(init) => TopLevelBinding::VariableWithInit(init, line),
                        None => TopLevelBinding::VariableNoInit(line),
                    };
                    top_level.insert(id.name.to_string(), binding);
                }
            }
        }
        _ => {}
    }
}

/// Parameter/local-variable bindings of one function-like declaration,
/// collected once when the reference walker / call-site collector enters
/// it. `enclosing_name` is used to qualify a forwarded-parameter reference
/// with the function it was forwarded from.
#[derive(Clone)]
pub struct FunctionScope<'a> {
    pub enclosing_name: String,
    pub params: HashSet<String>,
    pub locals_with_init: HashMap<String, &'a Expression<'a>>,
    pub locals_no_init: HashSet<String>,
}

impl<'a> FunctionScope<'a> {
    pub fn for_function(enclosing_name: String, func: &'a Function<'a>) -> Self {
        let mut params = HashSet::new();
        for p in &func.params.items {
            collect_pattern_names(&p.pattern.kind, &mut params);
        }
        let mut locals_with_init = HashMap::new();
        let mut locals_no_init = HashSet::new();
        if let Some(body) = &func.body {
            for stmt in &body.statements {
                collect_locals(stmt, &mut locals_with_init, &mut locals_no_init);
            }
        }
        Self {
            enclosing_name,
            params,
            locals_with_init,
            locals_no_init,
        }
    }

    pub fn for_params_and_body(
        enclosing_name: String,
        param_patterns: impl Iterator<Item = &'a BindingPatternKind<'a>>,
        body_statements: &'a [Statement<'a>],
    ) -> Self {
        let mut params = HashSet::new();
        for p in param_patterns {
            collect_pattern_names(p, &mut params);
        }
        let mut locals_with_init = HashMap::new();
        let mut locals_no_init = HashSet::new();
        for stmt in body_statements {
            collect_locals(stmt, &mut locals_with_init, &mut locals_no_init);
        }
        Self {
            enclosing_name,
            params,
            locals_with_init,
            locals_no_init,
        }
    }
}

/// The simple identifier a `const`/`let` declarator binds its initializer
/// to, if any (destructured bindings have no single name to offer).
pub fn declarator_binding_name(kind: &BindingPatternKind) -> Option<String> {
    match kind {
        BindingPatternKind::BindingIdentifier(id) => Some(id.name.to_string()),
        _ => None,
    }
}

fn collect_pattern_names(kind: &BindingPatternKind, out: &mut HashSet<String>) {
    match kind {
        BindingPatternKind::BindingIdentifier(id) => {
            out.insert(id.name.to_string());
        }
        BindingPatternKind::ObjectPattern(obj) => {
            for prop in &obj.properties {
                if let PropertyKey::StaticIdentifier(id) = &prop.key {
                    out.insert(id.name.to_string());
                }
                collect_pattern_names(&prop.value.kind, out);
            }
            if let Some(rest) = &obj.rest {
                collect_pattern_names(&rest.argument.kind, out);
            }
        }
        BindingPatternKind::ArrayPattern(arr) => {
            for el in arr.elements.iter().flatten() {
                collect_pattern_names(&el.kind, out);
            }
        }
        BindingPatternKind::AssignmentPattern(ap) => {
            collect_pattern_names(&ap.left.kind, out);
        }
    }
}

fn collect_locals<'a>(
    stmt: &'a Statement<'a>,
    with_init: &mut HashMap<String, &'a Expression<'a>>,
    no_init: &mut HashSet<String>,
) {
    match stmt {
        Statement::VariableDeclaration(decl) => {
            for d in &decl.declarations {
                if let BindingPatternKind::BindingIdentifier(id) = &d.id.kind {
                    match &d.init {
                        Some(init) => {
                            with_init.insert(id.name.to_string(), init);
                        }
                        None => {
                            no_init.insert(id.name.to_string());
                        }
                    }
                }
            }
        }
        Statement::BlockStatement(block) => {
            for s in &block.body {
                collect_locals(s, with_init, no_init);
            }
        }
        Statement::IfStatement(if_stmt) => {
            collect_locals(&if_stmt.consequent, with_init, no_init);
            if let Some(alt) = &if_stmt.alternate {
                collect_locals(alt, with_init, no_init);
            }
        }
        _ => {}
    }
}

/// A loaded, cross-referenced set of files. Built once per run.
pub struct Workspace<'a> {
    pub paths: Vec<PathBuf>,
    pub scopes: Vec<FileScope<'a>>,
}

impl<'a> Workspace<'a> {
    pub fn build(sources: &[Source<'a>]) -> Self {
        let paths = sources.iter().map(|s| s.path.to_path_buf()).collect();
        let scopes = sources.iter().map(FileScope::build).collect();
        Self { paths, scopes }
    }

    pub fn index_of(&self, path: &Path) -> Option<usize> {
        self.paths.iter().position(|p| p == path)
    }

    /// Resolves a relative import specifier against `from_file`'s directory
    /// by probing common TS/JS extensions and `/index.*`. Bare specifiers
    /// (package imports) never resolve within the analyzed set.
    pub fn resolve_module(&self, from_file: &Path, specifier: &str) -> Option<usize> {
        if !(specifier.starts_with('.') || specifier.starts_with('/')) {
            return None;
        }
        let base = from_file.parent().unwrap_or_else(|| Path::new(""));
        let joined = base.join(specifier);

        let candidates = [
            joined.clone(),
            joined.with_extension("ts"),
            joined.with_extension("tsx"),
            joined.with_extension("js"),
            joined.with_extension("jsx"),
            joined.join("index.ts"),
            joined.join("index.tsx"),
            joined.join("index.js"),
        ];

        for candidate in candidates {
            if let Some(idx) = self
                .paths
                .iter()
                .position(|p| paths_match(p, &candidate))
            {
                return Some(idx);
            }
        }
        None
    }
}

fn paths_match(a: &Path, b: &Path) -> bool {
    // Loaded file paths and resolved import targets may differ in leading
    // `./`; compare the normalized tail components instead of raw equality.
    let norm = |p: &Path| -> Vec<String> {
        p.components()
            .filter_map(|c| c.as_os_str().to_str())
            .filter(|s| *s != "." )
            .map(|s| s.to_string())
            .collect()
    };
    norm(a) == norm(b)
}

/// Resolution of a plain identifier reference against the enclosing
/// function scope, the file's own top-level scope, or one hop through an
/// import.
pub enum IdentResolution<'a> {
    Parameter,
    EnumDecl { file: String, decl: &'a TSEnumDeclaration<'a> },
    FunctionLike,
    VariableWithInit(&'a Expression<'a>),
    VariableNoInit { file: String, line: usize },
    Unresolved,
}

/// Resolves `name` starting from the innermost function scope (if any),
/// then the current file's top level, then one hop through an import.
pub fn resolve_ident<'a>(
    name: &str,
    file_idx: usize,
    function_scope: Option<&FunctionScope<'a>>,
    workspace: &Workspace<'a>,
) -> IdentResolution<'a> {
    if let Some(scope) = function_scope {
        if scope.params.contains(name) {
            return IdentResolution::Parameter;
        }
        if let Some(init) = scope.locals_with_init.get(name) {
            return IdentResolution::VariableWithInit(init);
        }
        if scope.locals_no_init.contains(name) {
            // Local `let x;` without init: file/line not tracked separately
            // since it's scoped to this function; approximate with the
            // owning file and line 0 (spec treats this as a VariableLiteral
            // either way, equality keys on decl file + text + line).
            let file = workspace.paths[file_idx].to_string_lossy().into_owned();
            return IdentResolution::VariableNoInit { file, line: 0 };
        }
    }

    resolve_top_level(name, file_idx, workspace, true)
}

fn resolve_top_level<'a>(
    name: &str,
    file_idx: usize,
    workspace: &Workspace<'a>,
    allow_import_hop: bool,
) -> IdentResolution<'a> {
    let scope = &workspace.scopes[file_idx];
    let file = workspace.paths[file_idx].to_string_lossy().into_owned();

    match scope.top_level.get(name) {
        Some(TopLevelBinding::Enum(e)) => {
            return IdentResolution::EnumDecl { file, decl: e };
        }
        Some(TopLevelBinding::Function(_)) => return IdentResolution::FunctionLike,
        Some(TopLevelBinding::Class(_)) => return IdentResolution::Unresolved,
        Some(TopLevelBinding::VariableWithInit(init, _)) => {
            return IdentResolution::VariableWithInit(init);
        }
        Some(TopLevelBinding::VariableNoInit(line)) => {
            return IdentResolution::VariableNoInit { file, line: *line };
        }
        None => {}
    }

    if allow_import_hop {
        if let Some(import_ref) = scope.imports.get(name) {
            if let Some(target_idx) = workspace.resolve_module(
                &workspace.paths[file_idx],
                &import_ref.module_specifier,
            ) {
                let imported_name = match &import_ref.imported {
                    ImportedName::Named(n) => n.clone(),
                    ImportedName::Default | ImportedName::Namespace => return IdentResolution::Unresolved,
                };
                // Only one hop: do not chase re-exports within the target file.
                return resolve_top_level(&imported_name, target_idx, workspace, false);
            }
        }
    }

    IdentResolution::Unresolved
}

/// Resolves `name` (a call's callee identifier) to a function-like
/// declaration, local or one import hop away, and returns its return-type
/// annotation, if any. With no type checker available, a literal-typed
/// *return annotation* is the only syntactic stand-in for "the expression's
/// type is a literal type" that is reachable without full inference.
pub fn resolve_return_type<'a>(
    name: &str,
    file_idx: usize,
    workspace: &Workspace<'a>,
) -> Option<&'a TSTypeAnnotation<'a>> {
    let scope = &workspace.scopes[file_idx];
    if let Some(ann) = top_level_return_type(scope, name) {
        return Some(ann);
    }
    let import_ref = scope.imports.get(name)?;
    let target_idx = workspace.resolve_module(&workspace.paths[file_idx], &import_ref.module_specifier)?;
    let imported_name = match &import_ref.imported {
        ImportedName::Named(n) => n.as_str(),
        ImportedName::Default | ImportedName::Namespace => return None,
    };
    top_level_return_type(&workspace.scopes[target_idx], imported_name)
}

fn top_level_return_type<'a>(scope: &FileScope<'a>, name: &str) -> Option<&'a TSTypeAnnotation<'a>> {
    match scope.top_level.get(name)? {
        TopLevelBinding::Function(f) => f.return_type.as_ref().map(|ann| &**ann),
        TopLevelBinding::VariableWithInit(init, _) => match init {
            Expression::ArrowFunctionExpression(f) => f.return_type.as_ref().map(|ann| &**ann),
            Expression::FunctionExpression(f) => f.return_type.as_ref().map(|ann| &**ann),
            _ => None,
        },
        _ => None,
    }
}

/// Finds the value and source location of an enum member by name.
pub fn enum_member_value(decl: &TSEnumDeclaration, member_name: &str) -> Option<String> {
    decl.members.iter().find_map(|m| {
        let matches = match &m.id {
            TSEnumMemberName::Identifier(id) => id.name.as_str() == member_name,
            TSEnumMemberName::String(s) => s.value.as_str() == member_name,
        };
        if !matches {
            return None;
        }
        Some(match &m.initializer {
            Some(Expression::StringLiteral(s)) => s.value.to_string(),
            Some(Expression::NumericLiteral(n)) => n.value.to_string(),
            _ => member_name.to_string(),
        })
    })
}

/// Collects the names on a class, keyed by method name, for classification.
pub fn class_methods<'a>(class: &'a Class<'a>) -> Vec<(&'a str, &'a Function<'a>)> {
    class
        .body
        .body
        .iter()
        .filter_map(|el| match el {
            ClassElement::MethodDefinition(m) => {
                let name = match &m.key {
                    PropertyKey::StaticIdentifier(id) => id.name.as_str(),
                    _ => return None,
                };
                Some((name, m.value.as_ref()))
            }
            _ => None,
        })
        .collect()
}
