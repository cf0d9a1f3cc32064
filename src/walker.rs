//! The Reference Walker.
//!
//! `findReferences` is the one host-provided primitive this crate has no
//! ready-made equivalent for. Since `binder.rs` builds a forward symbol
//! table rather than a reverse reference index, the walker inverts it on
//! demand: for a given declaration it scans every non-excluded file's AST,
//! keeping only three accepted shapes — a JSX tag, a call callee, or the
//! property part of a `obj.method()` call — whose resolved declaration is
//! the one being analyzed.

use oxc_ast::ast::{
    CallExpression, Expression, ForStatementInit, JSXElementName, JSXOpeningElement, Statement,
};

use crate::ast::Source;
use crate::binder::{declarator_binding_name, FunctionScope, Workspace};
use crate::callsite::resolve_declaration_name;

/// One accepted reference to a declaration, carrying the scope enclosing
/// the reference site (used by `usage.rs` to resolve parameter-forwarding
/// through the *caller's* own parameters).
pub struct AcceptedRef<'a> {
    pub file_idx: usize,
    pub kind: RefKind<'a>,
    pub scope: Option<FunctionScope<'a>>,
}

pub enum RefKind<'a> {
    Jsx(&'a JSXOpeningElement<'a>),
    Call(&'a CallExpression<'a>),
}

/// Component case / Function case: accepts a reference iff the reference
/// node is a JSX tag-name or a call's callee-expression.
pub fn walk_function_or_component<'a>(
    export_name: &str,
    decl_file: &str,
    sources: &[Source<'a>],
    workspace: &Workspace<'a>,
    excluded: &[bool],
) -> Vec<AcceptedRef<'a>> {
    let mut out = Vec::new();
    for (file_idx, source) in sources.iter().enumerate() {
        if excluded[file_idx] {
            continue;
        }
        let mut visitor = Visitor {
            export_name,
            decl_file,
            file_idx,
            workspace,
            method: None,
            out: &mut out,
        };
        for stmt in &source.program.body {
            visitor.walk_statement(stmt, None);
        }
    }
    out
}

/// Method case: accepts a reference iff it is the property part of an
/// `obj.method(...)` call whose receiver is (as best this binder can tell,
/// with no full type checker available) an instance of `class_name`.
pub fn walk_method<'a>(
    class_name: &str,
    method_name: &str,
    sources: &[Source<'a>],
    workspace: &Workspace<'a>,
    excluded: &[bool],
) -> Vec<AcceptedRef<'a>> {
    let mut out = Vec::new();
    for (file_idx, source) in sources.iter().enumerate() {
        if excluded[file_idx] {
            continue;
        }
        let mut visitor = Visitor {
            export_name: method_name,
            decl_file: "",
            file_idx,
            workspace,
            method: Some(class_name),
            out: &mut out,
        };
        for stmt in &source.program.body {
            visitor.walk_statement(stmt, None);
        }
    }
    out
}

struct Visitor<'a, 'b> {
    export_name: &'b str,
    decl_file: &'b str,
    file_idx: usize,
    workspace: &'b Workspace<'a>,
    /// `Some(class_name)` switches the visitor into method-reference mode.
    method: Option<&'b str>,
    out: &'b mut Vec<AcceptedRef<'a>>,
}

impl<'a, 'b> Visitor<'a, 'b> {
    fn walk_statement(&mut self, stmt: &'a Statement<'a>, scope: Option<&FunctionScope<'a>>) {
        use Statement::*;
        match stmt {
            ExpressionStatement(s) => self.walk_expr(&s.expression, scope),
            VariableDeclaration(decl) => {
                for d in &decl.declarations {
                    if let Some(init) = &d.init {
                        let name_hint = declarator_binding_name(&d.id.kind);
                        self.walk_named_init(init, name_hint.as_deref(), scope);
                    }
                }
            }
            ReturnStatement(s) => {
                if let Some(expr) = &s.argument {
                    self.walk_expr(expr, scope);
                }
            }
            BlockStatement(b) => {
                for s in &b.body {
                    self.walk_statement(s, scope);
                }
            }
            IfStatement(s) => {
                self.walk_expr(&s.test, scope);
                self.walk_statement(&s.consequent, scope);
                if let Some(alt) = &s.alternate {
                    self.walk_statement(alt, scope);
                }
            }
            FunctionDeclaration(f) => {
                let name = f
                    .id
                    .as_ref()
                    .map(|i| i.name.to_string())
                    .unwrap_or_else(|| "anonymous".to_string());
                let inner = FunctionScope::for_function(name, f);
                if let Some(body) = &f.body {
                    for s in &body.statements {
                        self.walk_statement(s, Some(&inner));
                    }
                }
            }
            ExportNamedDeclaration(exp) => {
                if let Some(decl) = &exp.declaration {
                    self.walk_decl(decl);
                }
            }
            ClassDeclaration(c) => {
                for (name, method) in crate::binder::class_methods(c) {
                    let class_name = c.id.as_ref().map(|i| i.name.as_str()).unwrap_or("anonymous");
                    let inner = FunctionScope::for_function(format!("{class_name}.{name}"), method);
                    if let Some(body) = &method.body {
                        for s in &body.statements {
                            self.walk_statement(s, Some(&inner));
                        }
                    }
                }
            }
            ForStatement(s) => {
                if let Some(ForStatementInit::VariableDeclaration(decl)) = &s.init {
                    for d in &decl.declarations {
                        if let Some(init) = &d.init {
                            self.walk_expr(init, scope);
                        }
                    }
                }
                if let Some(test) = &s.test {
                    self.walk_expr(test, scope);
                }
                if let Some(update) = &s.update {
                    self.walk_expr(update, scope);
                }
                self.walk_statement(&s.body, scope);
            }
            ForInStatement(s) => {
                self.walk_expr(&s.right, scope);
                self.walk_statement(&s.body, scope);
            }
            ForOfStatement(s) => {
                self.walk_expr(&s.right, scope);
                self.walk_statement(&s.body, scope);
            }
            WhileStatement(s) => {
                self.walk_expr(&s.test, scope);
                self.walk_statement(&s.body, scope);
            }
            DoWhileStatement(s) => {
                self.walk_statement(&s.body, scope);
                self.walk_expr(&s.test, scope);
            }
            SwitchStatement(s) => {
                self.walk_expr(&s.discriminant, scope);
                for case in &s.cases {
                    if let Some(test) = &case.test {
                        self.walk_expr(test, scope);
                    }
                    for stmt in &case.consequent {
                        self.walk_statement(stmt, scope);
                    }
                }
            }
            TryStatement(s) => {
                for stmt in &s.block.body {
                    self.walk_statement(stmt, scope);
                }
                if let Some(handler) = &s.handler {
                    for stmt in &handler.body.body {
                        self.walk_statement(stmt, scope);
                    }
                }
                if let Some(finalizer) = &s.finalizer {
                    for stmt in &finalizer.body {
                        self.walk_statement(stmt, scope);
                    }
                }
            }
            _ => {}
        }
    }

    fn walk_decl(&mut self, decl: &'a oxc_ast::ast::Declaration<'a>) {
        use oxc_ast::ast::Declaration::*;
        match decl {
            FunctionDeclaration(f) => {
                let name = f
                    .id
                    .as_ref()
                    .map(|i| i.name.to_string())
                    .unwrap_or_else(|| "anonymous".to_string());
                let inner = FunctionScope::for_function(name, f);
                if let Some(body) = &f.body {
                    for s in &body.statements {
                        self.walk_statement(s, Some(&inner));
                    }
                }
            }
            VariableDeclaration(v) => {
                for d in &v.declarations {
                    if let Some(init) = &d.init {
                        let name_hint = declarator_binding_name(&d.id.kind);
                        self.walk_named_init(init, name_hint.as_deref(), None);
                    }
                }
            }
            ClassDeclaration(c) => {
                for (name, method) in crate::binder::class_methods(c) {
                    let class_name = c.id.as_ref().map(|i| i.name.as_str()).unwrap_or("anonymous");
                    let inner = FunctionScope::for_function(format!("{class_name}.{name}"), method);
                    if let Some(body) = &method.body {
                        for s in &body.statements {
                            self.walk_statement(s, Some(&inner));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn walk_expr(&mut self, expr: &'a Expression<'a>, scope: Option<&FunctionScope<'a>>) {
        match expr {
            Expression::CallExpression(call) => {
                self.walk_call(call, scope);
            }
            Expression::BinaryExpression(b) => {
                self.walk_expr(&b.left, scope);
                self.walk_expr(&b.right, scope);
            }
            Expression::LogicalExpression(l) => {
                self.walk_expr(&l.left, scope);
                self.walk_expr(&l.right, scope);
            }
            Expression::AssignmentExpression(a) => {
                self.walk_expr(&a.right, scope);
            }
            Expression::UnaryExpression(u) => {
                self.walk_expr(&u.argument, scope);
            }
            Expression::AwaitExpression(a) => {
                self.walk_expr(&a.argument, scope);
            }
            Expression::SequenceExpression(s) => {
                for e in &s.expressions {
                    self.walk_expr(e, scope);
                }
            }
            Expression::TemplateLiteral(t) => {
                for e in &t.expressions {
                    self.walk_expr(e, scope);
                }
            }
            Expression::ObjectExpression(obj) => {
                use oxc_ast::ast::ObjectPropertyKind;
                for prop in &obj.properties {
                    match prop {
                        ObjectPropertyKind::ObjectProperty(p) => self.walk_expr(&p.value, scope),
                        ObjectPropertyKind::SpreadProperty(s) => self.walk_expr(&s.argument, scope),
                    }
                }
            }
            Expression::ArrayExpression(arr) => {
                use oxc_ast::ast::ArrayExpressionElement;
                for el in &arr.elements {
                    if let Some(e) = el.as_expression() {
                        self.walk_expr(e, scope);
                    } else if let ArrayExpressionElement::SpreadElement(s) = el {
                        self.walk_expr(&s.argument, scope);
                    }
                }
            }
            Expression::ChainExpression(chain) => {
                self.walk_chain_element(&chain.expression, scope);
            }
            Expression::ArrowFunctionExpression(f) => {
                let inner = FunctionScope::for_params_and_body(
                    "anonymous".to_string(),
                    f.params.items.iter().map(|p| &p.pattern.kind),
                    &f.body.statements,
                );
                // Concise arrow bodies (`expression: true`) are represented
                // by oxc as a single `ExpressionStatement`, already handled
                // by the loop above — no separate traversal needed.
                for s in &f.body.statements {
                    self.walk_statement(s, Some(&inner));
                }
            }
            Expression::ConditionalExpression(c) => {
                self.walk_expr(&c.test, scope);
                self.walk_expr(&c.consequent, scope);
                self.walk_expr(&c.alternate, scope);
            }
            Expression::JSXElement(jsx) => {
                self.visit_jsx(jsx, scope);
                for child in &jsx.children {
                    self.walk_jsx_child(child, scope);
                }
            }
            Expression::JSXFragment(frag) => {
                for child in &frag.children {
                    self.walk_jsx_child(child, scope);
                }
            }
            Expression::ParenthesizedExpression(p) => self.walk_expr(&p.expression, scope),
            _ => {}
        }
    }

    /// Walks a `const`/`let` declarator's initializer, naming the scope
    /// after the bound identifier rather than always falling back to
    /// `"anonymous"` — this is what lets a forwarded-parameter reference
    /// inside `export const Comp = (props) => <Child n={props.n} />`
    /// resolve back through the call-site map keyed under `Comp`.
    fn walk_named_init(
        &mut self,
        expr: &'a Expression<'a>,
        name_hint: Option<&str>,
        scope: Option<&FunctionScope<'a>>,
    ) {
        let name = || name_hint.map(str::to_string).unwrap_or_else(|| "anonymous".to_string());
        match expr {
            Expression::ArrowFunctionExpression(f) => {
                let inner = FunctionScope::for_params_and_body(
                    name(),
                    f.params.items.iter().map(|p| &p.pattern.kind),
                    &f.body.statements,
                );
                for s in &f.body.statements {
                    self.walk_statement(s, Some(&inner));
                }
            }
            Expression::FunctionExpression(f) => {
                let inner = FunctionScope::for_function(name(), f);
                if let Some(body) = &f.body {
                    for s in &body.statements {
                        self.walk_statement(s, Some(&inner));
                    }
                }
            }
            _ => self.walk_expr(expr, scope),
        }
    }

    fn walk_call(&mut self, call: &'a CallExpression<'a>, scope: Option<&FunctionScope<'a>>) {
        self.visit_call(call, scope);
        for arg in &call.arguments {
            if let Some(e) = arg.as_expression() {
                self.walk_expr(e, scope);
            }
        }
    }

    /// `a?.b()`/`a?.()`-style chains: oxc represents the optional-chaining
    /// root as a `ChainElement` rather than a plain `Expression`, so a call
    /// or member access reached only through `?.` needs its own entry point.
    fn walk_chain_element(&mut self, elem: &'a oxc_ast::ast::ChainElement<'a>, scope: Option<&FunctionScope<'a>>) {
        use oxc_ast::ast::ChainElement;
        match elem {
            ChainElement::CallExpression(call) => self.walk_call(call, scope),
            ChainElement::StaticMemberExpression(m) => self.walk_expr(&m.object, scope),
            ChainElement::ComputedMemberExpression(m) => {
                self.walk_expr(&m.object, scope);
                self.walk_expr(&m.expression, scope);
            }
            ChainElement::PrivateFieldExpression(m) => self.walk_expr(&m.object, scope),
            ChainElement::TSNonNullExpression(m) => self.walk_expr(&m.expression, scope),
        }
    }

    fn walk_jsx_child(&mut self, child: &'a oxc_ast::ast::JSXChild<'a>, scope: Option<&FunctionScope<'a>>) {
        use oxc_ast::ast::JSXChild;
        match child {
            JSXChild::Element(e) => {
                self.visit_jsx(e, scope);
                for c in &e.children {
                    self.walk_jsx_child(c, scope);
                }
            }
            JSXChild::Fragment(f) => {
                for c in &f.children {
                    self.walk_jsx_child(c, scope);
                }
            }
            JSXChild::ExpressionContainer(c) => {
                if let Some(expr) = c.expression.as_expression() {
                    self.walk_expr(expr, scope);
                }
            }
            _ => {}
        }
    }

    fn visit_jsx(&mut self, elt: &'a oxc_ast::ast::JSXElement<'a>, scope: Option<&FunctionScope<'a>>) {
        if self.method.is_some() {
            return; // JSX tags are never method references
        }
        let JSXElementName::Identifier(tag) = &elt.opening_element.name else {
            return;
        };
        if tag.name.as_str() != self.export_name {
            return;
        }
        let Some((decl_file, _)) = resolve_declaration_name(tag.name.as_str(), self.file_idx, self.workspace) else {
            return;
        };
        if decl_file != self.decl_file {
            return;
        }
        self.out.push(AcceptedRef {
            file_idx: self.file_idx,
            kind: RefKind::Jsx(&elt.opening_element),
            scope: scope.cloned(),
        });
    }

    fn visit_call(&mut self, call: &'a CallExpression<'a>, scope: Option<&FunctionScope<'a>>) {
        match self.method {
            None => self.visit_plain_call(call, scope),
            Some(class_name) => self.visit_method_call(call, class_name, scope),
        }
    }

    fn visit_plain_call(&mut self, call: &'a CallExpression<'a>, scope: Option<&FunctionScope<'a>>) {
        let Expression::Identifier(callee) = &call.callee else {
            return;
        };
        if callee.name.as_str() != self.export_name {
            return;
        }
        let Some((decl_file, _)) = resolve_declaration_name(callee.name.as_str(), self.file_idx, self.workspace) else {
            return;
        };
        if decl_file != self.decl_file {
            return;
        }
        self.out.push(AcceptedRef {
            file_idx: self.file_idx,
            kind: RefKind::Call(call),
            scope: scope.cloned(),
        });
    }

    fn visit_method_call(&mut self, call: &'a CallExpression<'a>, class_name: &str, scope: Option<&FunctionScope<'a>>) {
        let Expression::StaticMemberExpression(member) = &call.callee else {
            return;
        };
        if member.property.name.as_str() != self.export_name {
            return;
        }
        let Expression::Identifier(obj) = &member.object else {
            return;
        };
        if !object_is_instance_of(obj.name.as_str(), class_name, scope, self.file_idx, self.workspace) {
            return;
        }
        self.out.push(AcceptedRef {
            file_idx: self.file_idx,
            kind: RefKind::Call(call),
            scope: scope.cloned(),
        });
    }
}

/// Best-effort "is `obj_name` an instance of `class_name`" check: looks at
/// the nearest `const obj_name = new ClassName(...)` binding, in the
/// enclosing function scope first and then the file's top level. This is
/// the syntactic stand-in for implementations without full type inference;
/// it only chases a single assignment, in keeping with this analyzer's
/// single-assignment variable chasing limit.
fn object_is_instance_of(
    obj_name: &str,
    class_name: &str,
    scope: Option<&FunctionScope>,
    file_idx: usize,
    workspace: &Workspace,
) -> bool {
    if let Some(scope) = scope {
        if let Some(init) = scope.locals_with_init.get(obj_name) {
            return new_expression_names(init, class_name);
        }
        if scope.params.contains(obj_name) {
            return false; // parameter's runtime type is unknown here
        }
    }
    match workspace.scopes[file_idx].top_level.get(obj_name) {
        Some(crate::binder::TopLevelBinding::VariableWithInit(init, _)) => {
            new_expression_names(init, class_name)
        }
        _ => false,
    }
}

fn new_expression_names(expr: &Expression, class_name: &str) -> bool {
    if let Expression::NewExpression(new_expr) = expr {
        if let Expression::Identifier(callee) = &new_expr.callee {
            return callee.name.as_str() == class_name;
        }
    }
    false
}
