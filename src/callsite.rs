//! The call-site collector.
//!
//! One whole-program pass that records, for every JSX element and every
//! plain function call whose callee resolves inside the analyzed set, the
//! `ArgValue` passed for each named parameter. The result seeds both the
//! constancy engine's usage counts and the parameter-reference resolver.

use oxc_ast::ast::{
    BindingPatternKind, Expression, ForStatementInit, JSXElementName, Statement,
};

use crate::ast::Source;
use crate::binder::{declarator_binding_name, resolve_ident, FunctionScope, IdentResolution, Workspace};
use crate::model::{CallSiteArg, CallSiteMap};
use crate::value::{extract_argument, extract_jsx_attribute, ExtractCtx};

/// One pass over all non-excluded files. `excluded[i]` mirrors
/// `sources[i]` — test/story files contribute no call-site data, the same
/// way the reference walker drops references that live in them.
pub fn collect<'a>(sources: &[Source<'a>], workspace: &Workspace<'a>, excluded: &[bool]) -> CallSiteMap {
    let mut map = CallSiteMap::new();
    for (file_idx, source) in sources.iter().enumerate() {
        if excluded[file_idx] {
            continue;
        }
        collect_file(file_idx, source, workspace, &mut map);
    }
    map
}

fn collect_file<'a>(
    file_idx: usize,
    source: &Source<'a>,
    workspace: &Workspace<'a>,
    map: &mut CallSiteMap,
) {
    for stmt in &source.program.body {
        walk_statement(stmt, file_idx, source, workspace, None, map);
    }
}

fn walk_statement<'a>(
    stmt: &'a Statement<'a>,
    file_idx: usize,
    source: &Source<'a>,
    workspace: &Workspace<'a>,
    scope: Option<&FunctionScope<'a>>,
    map: &mut CallSiteMap,
) {
    use oxc_ast::ast::Statement::*;
    match stmt {
        ExpressionStatement(s) => walk_expr(&s.expression, file_idx, source, workspace, scope, map),
        VariableDeclaration(decl) => {
            for d in &decl.declarations {
                if let Some(init) = &d.init {
                    let name_hint = declarator_binding_name(&d.id.kind);
                    walk_named_init(init, name_hint.as_deref(), file_idx, source, workspace, scope, map);
                }
            }
        }
        ReturnStatement(s) => {
            if let Some(expr) = &s.argument {
                walk_expr(expr, file_idx, source, workspace, scope, map);
            }
        }
        BlockStatement(b) => {
            for s in &b.body {
                walk_statement(s, file_idx, source, workspace, scope, map);
            }
        }
        IfStatement(s) => {
            walk_expr(&s.test, file_idx, source, workspace, scope, map);
            walk_statement(&s.consequent, file_idx, source, workspace, scope, map);
            if let Some(alt) = &s.alternate {
                walk_statement(alt, file_idx, source, workspace, scope, map);
            }
        }
        FunctionDeclaration(f) => {
            let name = f.id.as_ref().map(|i| i.name.to_string()).unwrap_or_else(|| "anonymous".to_string());
            let inner_scope = FunctionScope::for_function(name, f);
            if let Some(body) = &f.body {
                for s in &body.statements {
                    walk_statement(s, file_idx, source, workspace, Some(&inner_scope), map);
                }
            }
        }
        ExportNamedDeclaration(exp) => {
            if let Some(decl) = &exp.declaration {
                walk_decl(decl, file_idx, source, workspace, map);
            }
        }
        ExportDefaultDeclaration(_) => {}
        ForStatement(s) => {
            if let Some(ForStatementInit::VariableDeclaration(decl)) = &s.init {
                for d in &decl.declarations {
                    if let Some(init) = &d.init {
                        walk_expr(init, file_idx, source, workspace, scope, map);
                    }
                }
            }
            if let Some(test) = &s.test {
                walk_expr(test, file_idx, source, workspace, scope, map);
            }
            if let Some(update) = &s.update {
                walk_expr(update, file_idx, source, workspace, scope, map);
            }
            walk_statement(&s.body, file_idx, source, workspace, scope, map);
        }
        ForInStatement(s) => {
            walk_expr(&s.right, file_idx, source, workspace, scope, map);
            walk_statement(&s.body, file_idx, source, workspace, scope, map);
        }
        ForOfStatement(s) => {
            walk_expr(&s.right, file_idx, source, workspace, scope, map);
            walk_statement(&s.body, file_idx, source, workspace, scope, map);
        }
        WhileStatement(s) => {
            walk_expr(&s.test, file_idx, source, workspace, scope, map);
            walk_statement(&s.body, file_idx, source, workspace, scope, map);
        }
        DoWhileStatement(s) => {
            walk_statement(&s.body, file_idx, source, workspace, scope, map);
            walk_expr(&s.test, file_idx, source, workspace, scope, map);
        }
        SwitchStatement(s) => {
            walk_expr(&s.discriminant, file_idx, source, workspace, scope, map);
            for case in &s.cases {
                if let Some(test) = &case.test {
                    walk_expr(test, file_idx, source, workspace, scope, map);
                }
                for stmt in &case.consequent {
                    walk_statement(stmt, file_idx, source, workspace, scope, map);
                }
            }
        }
        TryStatement(s) => {
            for stmt in &s.block.body {
                walk_statement(stmt, file_idx, source, workspace, scope, map);
            }
            if let Some(handler) = &s.handler {
                for stmt in &handler.body.body {
                    walk_statement(stmt, file_idx, source, workspace, scope, map);
                }
            }
            if let Some(finalizer) = &s.finalizer {
                for stmt in &finalizer.body {
                    walk_statement(stmt, file_idx, source, workspace, scope, map);
                }
            }
        }
        _ => {}
    }
}

fn walk_decl<'a>(
    decl: &'a oxc_ast::ast::Declaration<'a>,
    file_idx: usize,
    source: &Source<'a>,
    workspace: &Workspace<'a>,
    map: &mut CallSiteMap,
) {
    use oxc_ast::ast::Declaration::*;
    match decl {
        FunctionDeclaration(f) => {
            let name = f.id.as_ref().map(|i| i.name.to_string()).unwrap_or_else(|| "anonymous".to_string());
            let inner_scope = FunctionScope::for_function(name, f);
            if let Some(body) = &f.body {
                for s in &body.statements {
                    walk_statement(s, file_idx, source, workspace, Some(&inner_scope), map);
                }
            }
        }
        VariableDeclaration(v) => {
            for d in &v.declarations {
                if let Some(init) = &d.init {
                    let name_hint = declarator_binding_name(&d.id.kind);
                    walk_named_init(init, name_hint.as_deref(), file_idx, source, workspace, None, map);
                }
            }
        }
        ClassDeclaration(c) => {
            for (name, method) in crate::binder::class_methods(c) {
                let class_name = c.id.as_ref().map(|i| i.name.as_str()).unwrap_or("anonymous");
                let scope_name = format!("{class_name}.{name}");
                let inner_scope = FunctionScope::for_function(scope_name, method);
                if let Some(body) = &method.body {
                    for s in &body.statements {
                        walk_statement(s, file_idx, source, workspace, Some(&inner_scope), map);
                    }
                }
            }
        }
        _ => {}
    }
}

fn walk_expr<'a>(
    expr: &'a Expression<'a>,
    file_idx: usize,
    source: &Source<'a>,
    workspace: &Workspace<'a>,
    scope: Option<&FunctionScope<'a>>,
    map: &mut CallSiteMap,
) {
    match expr {
        Expression::CallExpression(call) => {
            walk_call(call, file_idx, source, workspace, scope, map);
        }
        Expression::BinaryExpression(b) => {
            walk_expr(&b.left, file_idx, source, workspace, scope, map);
            walk_expr(&b.right, file_idx, source, workspace, scope, map);
        }
        Expression::LogicalExpression(l) => {
            walk_expr(&l.left, file_idx, source, workspace, scope, map);
            walk_expr(&l.right, file_idx, source, workspace, scope, map);
        }
        Expression::AssignmentExpression(a) => {
            walk_expr(&a.right, file_idx, source, workspace, scope, map);
        }
        Expression::UnaryExpression(u) => {
            walk_expr(&u.argument, file_idx, source, workspace, scope, map);
        }
        Expression::AwaitExpression(a) => {
            walk_expr(&a.argument, file_idx, source, workspace, scope, map);
        }
        Expression::SequenceExpression(s) => {
            for e in &s.expressions {
                walk_expr(e, file_idx, source, workspace, scope, map);
            }
        }
        Expression::TemplateLiteral(t) => {
            for e in &t.expressions {
                walk_expr(e, file_idx, source, workspace, scope, map);
            }
        }
        Expression::ObjectExpression(obj) => {
            use oxc_ast::ast::ObjectPropertyKind;
            for prop in &obj.properties {
                match prop {
                    ObjectPropertyKind::ObjectProperty(p) => {
                        walk_expr(&p.value, file_idx, source, workspace, scope, map);
                    }
                    ObjectPropertyKind::SpreadProperty(s) => {
                        walk_expr(&s.argument, file_idx, source, workspace, scope, map);
                    }
                }
            }
        }
        Expression::ArrayExpression(arr) => {
            use oxc_ast::ast::ArrayExpressionElement;
            for el in &arr.elements {
                if let Some(e) = el.as_expression() {
                    walk_expr(e, file_idx, source, workspace, scope, map);
                } else if let ArrayExpressionElement::SpreadElement(s) = el {
                    walk_expr(&s.argument, file_idx, source, workspace, scope, map);
                }
            }
        }
        Expression::ChainExpression(chain) => {
            walk_chain_element(&chain.expression, file_idx, source, workspace, scope, map);
        }
        Expression::ArrowFunctionExpression(f) => {
            let inner_scope = FunctionScope::for_params_and_body(
                "anonymous".to_string(),
                f.params.items.iter().map(|p| &p.pattern.kind),
                &f.body.statements,
            );
            // Concise arrow bodies (`expression: true`) are represented by
            // oxc as a single `ExpressionStatement`, already handled by the
            // loop above — no separate traversal needed.
            for s in &f.body.statements {
                walk_statement(s, file_idx, source, workspace, Some(&inner_scope), map);
            }
        }
        Expression::ConditionalExpression(c) => {
            walk_expr(&c.test, file_idx, source, workspace, scope, map);
            walk_expr(&c.consequent, file_idx, source, workspace, scope, map);
            walk_expr(&c.alternate, file_idx, source, workspace, scope, map);
        }
        Expression::JSXElement(jsx) => {
            record_jsx_element(jsx, file_idx, source, workspace, scope, map);
            for child in &jsx.children {
                walk_jsx_child(child, file_idx, source, workspace, scope, map);
            }
        }
        Expression::JSXFragment(frag) => {
            for child in &frag.children {
                walk_jsx_child(child, file_idx, source, workspace, scope, map);
            }
        }
        Expression::ParenthesizedExpression(p) => {
            walk_expr(&p.expression, file_idx, source, workspace, scope, map)
        }
        _ => {}
    }
}

/// Walks a `const`/`let` declarator's initializer, naming the scope after
/// the bound identifier rather than always falling back to `"anonymous"` —
/// this is what lets a forwarded-parameter reference inside
/// `export const Comp = (props) => <Child n={props.n} />` resolve back
/// through the call-site map keyed under `Comp`.
fn walk_named_init<'a>(
    expr: &'a Expression<'a>,
    name_hint: Option<&str>,
    file_idx: usize,
    source: &Source<'a>,
    workspace: &Workspace<'a>,
    scope: Option<&FunctionScope<'a>>,
    map: &mut CallSiteMap,
) {
    let name = || name_hint.map(str::to_string).unwrap_or_else(|| "anonymous".to_string());
    match expr {
        Expression::ArrowFunctionExpression(f) => {
            let inner_scope = FunctionScope::for_params_and_body(
                name(),
                f.params.items.iter().map(|p| &p.pattern.kind),
                &f.body.statements,
            );
            for s in &f.body.statements {
                walk_statement(s, file_idx, source, workspace, Some(&inner_scope), map);
            }
        }
        Expression::FunctionExpression(f) => {
            let inner_scope = FunctionScope::for_function(name(), f);
            if let Some(body) = &f.body {
                for s in &body.statements {
                    walk_statement(s, file_idx, source, workspace, Some(&inner_scope), map);
                }
            }
        }
        _ => walk_expr(expr, file_idx, source, workspace, scope, map),
    }
}

fn walk_call<'a>(
    call: &'a oxc_ast::ast::CallExpression<'a>,
    file_idx: usize,
    source: &Source<'a>,
    workspace: &Workspace<'a>,
    scope: Option<&FunctionScope<'a>>,
    map: &mut CallSiteMap,
) {
    if let Expression::Identifier(callee) = &call.callee {
        record_function_call(callee.name.as_str(), call, file_idx, source, workspace, scope, map);
    }
    for arg in &call.arguments {
        if let Some(e) = arg.as_expression() {
            walk_expr(e, file_idx, source, workspace, scope, map);
        }
    }
}

/// `a?.b()`/`a?.()`-style chains: oxc represents the optional-chaining root
/// as a `ChainElement` rather than a plain `Expression`, so a call or member
/// access reached only through `?.` needs its own entry point here.
fn walk_chain_element<'a>(
    elem: &'a oxc_ast::ast::ChainElement<'a>,
    file_idx: usize,
    source: &Source<'a>,
    workspace: &Workspace<'a>,
    scope: Option<&FunctionScope<'a>>,
    map: &mut CallSiteMap,
) {
    use oxc_ast::ast::ChainElement;
    match elem {
        ChainElement::CallExpression(call) => walk_call(call, file_idx, source, workspace, scope, map),
        ChainElement::StaticMemberExpression(m) => {
            walk_expr(&m.object, file_idx, source, workspace, scope, map)
        }
        ChainElement::ComputedMemberExpression(m) => {
            walk_expr(&m.object, file_idx, source, workspace, scope, map);
            walk_expr(&m.expression, file_idx, source, workspace, scope, map);
        }
        ChainElement::PrivateFieldExpression(m) => {
            walk_expr(&m.object, file_idx, source, workspace, scope, map)
        }
        ChainElement::TSNonNullExpression(m) => {
            walk_expr(&m.expression, file_idx, source, workspace, scope, map)
        }
    }
}

fn walk_jsx_child<'a>(
    child: &'a oxc_ast::ast::JSXChild<'a>,
    file_idx: usize,
    source: &Source<'a>,
    workspace: &Workspace<'a>,
    scope: Option<&FunctionScope<'a>>,
    map: &mut CallSiteMap,
) {
    use oxc_ast::ast::JSXChild;
    match child {
        JSXChild::Element(e) => {
            record_jsx_element(e, file_idx, source, workspace, scope, map);
            for c in &e.children {
                walk_jsx_child(c, file_idx, source, workspace, scope, map);
            }
        }
        JSXChild::Fragment(f) => {
            for c in &f.children {
                walk_jsx_child(c, file_idx, source, workspace, scope, map);
            }
        }
        JSXChild::ExpressionContainer(c) => {
            if let Some(expr) = c.expression.as_expression() {
                walk_expr(expr, file_idx, source, workspace, scope, map);
            }
        }
        _ => {}
    }
}

fn record_jsx_element<'a>(
    elt: &'a oxc_ast::ast::JSXElement<'a>,
    file_idx: usize,
    source: &Source<'a>,
    workspace: &Workspace<'a>,
    scope: Option<&FunctionScope<'a>>,
    map: &mut CallSiteMap,
) {
    let JSXElementName::Identifier(tag) = &elt.opening_element.name else {
        return;
    };
    let tag_name = tag.name.as_str();
    let Some((decl_file, _decl_line)) = resolve_declaration_name(tag_name, file_idx, workspace) else {
        return;
    };
    let decl_id = CallSiteMap::declaration_id(&decl_file, tag_name);
    let caller_line = source.line_of(elt.opening_element.span.start);
    let ctx = ExtractCtx::new(file_idx, source, workspace, scope);

    for attr in &elt.opening_element.attributes {
        if let oxc_ast::ast::JSXAttributeItem::Attribute(a) = attr {
            let oxc_ast::ast::JSXAttributeName::Identifier(name) = &a.name else {
                continue;
            };
            let value = extract_jsx_attribute(attr, &ctx);
            map.record(
                &decl_id,
                CallSiteArg {
                    name: name.name.to_string(),
                    value,
                    caller_file: source.path_string(),
                    caller_line,
                },
            );
        }
    }
}

fn record_function_call<'a>(
    callee_name: &str,
    call: &'a oxc_ast::ast::CallExpression<'a>,
    file_idx: usize,
    source: &Source<'a>,
    workspace: &Workspace<'a>,
    scope: Option<&FunctionScope<'a>>,
    map: &mut CallSiteMap,
) {
    let Some((decl_file, param_names)) = resolve_callable(callee_name, file_idx, workspace) else {
        return;
    };
    let decl_id = CallSiteMap::declaration_id(&decl_file, callee_name);
    let caller_line = source.line_of(call.span.start);
    let ctx = ExtractCtx::new(file_idx, source, workspace, scope);

    for (i, name) in param_names.iter().enumerate() {
        let value = match call.arguments.get(i) {
            Some(arg) => extract_argument(arg, &ctx),
            None => crate::value::ArgValue::UndefinedArgValue,
        };
        map.record(
            &decl_id,
            CallSiteArg {
                name: name.clone(),
                value,
                caller_file: source.path_string(),
                caller_line,
            },
        );
    }
}

/// Resolves `name` to its declaring file, for JSX tags (any kind of
/// declaration: function, variable, or class all qualify as a tag target).
/// Also reused by `walker.rs`, which needs the same "does this identifier
/// name a declaration in the analyzed set" check for both JSX tags and
/// plain call callees — the classifier has already decided the shape by
/// the time the walker runs, so only the declaring file matters here.
pub(crate) fn resolve_declaration_name(name: &str, file_idx: usize, workspace: &Workspace) -> Option<(String, usize)> {
    match resolve_ident(name, file_idx, None, workspace) {
        IdentResolution::FunctionLike => Some((workspace.paths[file_idx].to_string_lossy().into_owned(), 0)),
        _ => resolve_across_imports(name, file_idx, workspace),
    }
}

fn resolve_across_imports(name: &str, file_idx: usize, workspace: &Workspace) -> Option<(String, usize)> {
    let scope = &workspace.scopes[file_idx];
    if scope.top_level.contains_key(name) {
        return Some((workspace.paths[file_idx].to_string_lossy().into_owned(), 0));
    }
    let import_ref = scope.imports.get(name)?;
    let target_idx = workspace.resolve_module(&workspace.paths[file_idx], &import_ref.module_specifier)?;
    if workspace.scopes[target_idx].top_level.contains_key(name) {
        Some((workspace.paths[target_idx].to_string_lossy().into_owned(), 0))
    } else {
        None
    }
}

/// Accepts a call if the callee's first declaration is a function
/// declaration or a variable initialized with an arrow/function expression;
/// returns the declaring file and the formal parameter names.
fn resolve_callable(name: &str, file_idx: usize, workspace: &Workspace) -> Option<(String, Vec<String>)> {
    let (target_idx, decl_file) = locate_declaring_file(name, file_idx, workspace)?;
    let scope = &workspace.scopes[target_idx];
    match scope.top_level.get(name)? {
        crate::binder::TopLevelBinding::Function(f) => {
            Some((decl_file, param_names(f.params.items.iter().map(|p| &p.pattern.kind))))
        }
        crate::binder::TopLevelBinding::VariableWithInit(init, _) => match init {
            Expression::ArrowFunctionExpression(f) => {
                Some((decl_file, param_names(f.params.items.iter().map(|p| &p.pattern.kind))))
            }
            Expression::FunctionExpression(f) => {
                Some((decl_file, param_names(f.params.items.iter().map(|p| &p.pattern.kind))))
            }
            _ => None,
        },
        _ => None,
    }
}

fn locate_declaring_file(name: &str, file_idx: usize, workspace: &Workspace) -> Option<(usize, String)> {
    let scope = &workspace.scopes[file_idx];
    if scope.top_level.contains_key(name) {
        return Some((file_idx, workspace.paths[file_idx].to_string_lossy().into_owned()));
    }
    let import_ref = scope.imports.get(name)?;
    let target_idx = workspace.resolve_module(&workspace.paths[file_idx], &import_ref.module_specifier)?;
    if workspace.scopes[target_idx].top_level.contains_key(name) {
        Some((target_idx, workspace.paths[target_idx].to_string_lossy().into_owned()))
    } else {
        None
    }
}

fn param_names<'a>(patterns: impl Iterator<Item = &'a BindingPatternKind<'a>>) -> Vec<String> {
    patterns
        .map(|p| match p {
            BindingPatternKind::BindingIdentifier(id) => id.name.to_string(),
            BindingPatternKind::ObjectPattern(_) => "<destructured>".to_string(),
            _ => "<pattern>".to_string(),
        })
        .collect()
}
