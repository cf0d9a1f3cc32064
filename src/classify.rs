//! The declaration classifier.
//!
//! Partitions each exported declaration into `Component`, `Function`, or
//! `Class`. A component is any function-shaped export whose body contains
//! JSX, including one level through a wrapper call like `memo(fn)`.

use oxc_ast::ast::{
    ArrowFunctionExpression, BindingPatternKind, Class, Expression, FormalParameters, Function,
    FunctionBody, Statement, TSType,
};

use crate::ast::Source;
use crate::binder::{class_methods, Workspace};
use crate::model::{formal_definitions, Definition};
use crate::types::{property_key_name, resolve_object_type};

/// A function-shaped callable, abstracting over oxc's two distinct node
/// types for it (`function` declarations/expressions vs. arrow functions)
/// so the rest of the classifier and the reference walker/usage extractor
/// can treat components and plain functions uniformly.
#[derive(Clone, Copy)]
pub enum Callable<'a> {
    Fn(&'a Function<'a>),
    Arrow(&'a ArrowFunctionExpression<'a>),
}

impl<'a> Callable<'a> {
    pub fn params(&self) -> &'a FormalParameters<'a> {
        match self {
            Callable::Fn(f) => &f.params,
            Callable::Arrow(f) => &f.params,
        }
    }

    pub fn body_statements(&self) -> &'a [Statement<'a>] {
        match self {
            Callable::Fn(f) => f
                .body
                .as_ref()
                .map(|b| b.statements.as_slice())
                .unwrap_or(&[]),
            Callable::Arrow(f) => f.body.statements.as_slice(),
        }
    }

    /// `Definition`s for a plain function/method: one per formal
    /// parameter, in signature order.
    pub fn definitions(&self) -> Vec<Definition> {
        formal_definitions(self.params())
    }

    /// The type annotation of the formal at `index`, used by `usage.rs` as
    /// the "expected type" for `flatten`'s missing-property synthesis on a
    /// plain function call's object-literal argument.
    pub fn param_type(&self, index: usize) -> Option<&'a TSType<'a>> {
        self.params()
            .items
            .get(index)?
            .pattern
            .type_annotation
            .as_ref()
            .map(|ann| &ann.type_annotation)
    }

    /// A component's usages are keyed over its *props*, not its raw formal
    /// parameter list (a component has exactly one
    /// parameter: the props object). Definitions here are therefore the
    /// named properties of the resolved props type if one is available
    /// (interface, type alias, or inline object type annotation),
    /// falling back to the destructured binding names when the parameter
    /// carries no resolvable type. Returns the definitions plus the
    /// resolved props type itself (needed by `usage.rs` for per-attribute
    /// recursive flattening).
    pub fn component_props(
        &self,
        file_idx: usize,
        workspace: &Workspace<'a>,
    ) -> (Vec<Definition>, Option<&'a TSType<'a>>) {
        let Some(first) = self.params().items.first() else {
            return (Vec::new(), None);
        };

        if let Some(ann) = &first.pattern.type_annotation {
            let ty = &ann.type_annotation;
            if let Some(info) = resolve_object_type(ty, file_idx, workspace) {
                let defs = info
                    .properties
                    .iter()
                    .enumerate()
                    .map(|(index, p)| Definition {
                        name: p.name.clone(),
                        index,
                        required: true,
                    })
                    .collect();
                return (defs, Some(ty));
            }
        }

        let defs = match &first.pattern.kind {
            BindingPatternKind::ObjectPattern(obj) => obj
                .properties
                .iter()
                .enumerate()
                .filter_map(|(index, prop)| {
                    let name = property_key_name(&prop.key)?;
                    Some(Definition {
                        name,
                        index,
                        required: true,
                    })
                })
                .collect(),
            _ => Vec::new(),
        };
        (defs, None)
    }

    fn has_jsx_body(&self) -> bool {
        match self {
            Callable::Fn(f) => function_body_has_jsx(f),
            Callable::Arrow(f) => arrow_body_has_jsx(f),
        }
    }
}

pub enum Kind<'a> {
    Component(Callable<'a>),
    Function(Callable<'a>),
    Class(&'a Class<'a>),
}

pub struct ClassifiedDeclaration<'a> {
    pub export_name: String,
    pub source_file: String,
    pub source_line: usize,
    pub kind: Kind<'a>,
}

pub fn classify<'a>(source: &Source<'a>) -> Vec<ClassifiedDeclaration<'a>> {
    let mut out = Vec::new();
    for stmt in &source.program.body {
        if let Statement::ExportNamedDeclaration(exp) = stmt {
            if let Some(decl) = &exp.declaration {
                if let Some(c) = classify_declaration(decl, source) {
                    out.push(c);
                }
            }
        }
    }
    out
}

fn classify_declaration<'a>(
    decl: &'a oxc_ast::ast::Declaration<'a>,
    source: &Source<'a>,
) -> Option<ClassifiedDeclaration<'a>> {
    use oxc_ast::ast::Declaration::*;
    match decl {
        FunctionDeclaration(f) => {
            let name = f.id.as_ref()?.name.to_string();
            let line = source.line_of(f.span.start);
            let callable = Callable::Fn(f);
            Some(ClassifiedDeclaration {
                export_name: name,
                source_file: source.path_string(),
                source_line: line,
                kind: wrap(callable),
            })
        }
        VariableDeclaration(v) => {
            let d = v.declarations.first()?;
            let BindingPatternKind::BindingIdentifier(id) = &d.id.kind else {
                return None;
            };
            let init = d.init.as_ref()?;
            let line = source.line_of(d.span.start);
            let callable = unwrap_function_like(init)?;
            Some(ClassifiedDeclaration {
                export_name: id.name.to_string(),
                source_file: source.path_string(),
                source_line: line,
                kind: wrap(callable),
            })
        }
        ClassDeclaration(c) => {
            let name = c.id.as_ref()?.name.to_string();
            let line = source.line_of(c.span.start);
            Some(ClassifiedDeclaration {
                export_name: name,
                source_file: source.path_string(),
                source_line: line,
                kind: Kind::Class(c),
            })
        }
        _ => None,
    }
}

fn wrap(callable: Callable<'_>) -> Kind<'_> {
    if callable.has_jsx_body() {
        Kind::Component(callable)
    } else {
        Kind::Function(callable)
    }
}

/// An export is component- or function-shaped if its initializer is an
/// arrow/function expression, or a single-level wrapper call around one
/// (`memo(fn)`, `forwardRef(fn)`, ...).
fn unwrap_function_like<'a>(expr: &'a Expression<'a>) -> Option<Callable<'a>> {
    match expr {
        Expression::ArrowFunctionExpression(f) => Some(Callable::Arrow(f)),
        Expression::FunctionExpression(f) => Some(Callable::Fn(f)),
        Expression::CallExpression(call) => {
            let arg = call.arguments.first()?.as_expression()?;
            match arg {
                Expression::ArrowFunctionExpression(f) => Some(Callable::Arrow(f)),
                Expression::FunctionExpression(f) => Some(Callable::Fn(f)),
                _ => None,
            }
        }
        _ => None,
    }
}

fn function_body_has_jsx(func: &Function) -> bool {
    match &func.body {
        Some(body) => body_has_jsx(body),
        None => false,
    }
}

fn arrow_body_has_jsx(func: &ArrowFunctionExpression) -> bool {
    if func.expression {
        func.body
            .statements
            .first()
            .is_some_and(|s| matches!(s, Statement::ExpressionStatement(e) if expression_has_jsx(&e.expression)))
    } else {
        body_has_jsx(&func.body)
    }
}

fn body_has_jsx(body: &FunctionBody) -> bool {
    body.statements.iter().any(statement_has_jsx)
}

fn statement_has_jsx(stmt: &Statement) -> bool {
    match stmt {
        Statement::ExpressionStatement(e) => expression_has_jsx(&e.expression),
        Statement::ReturnStatement(r) => r.argument.as_ref().is_some_and(expression_has_jsx),
        Statement::BlockStatement(b) => b.body.iter().any(statement_has_jsx),
        Statement::IfStatement(i) => {
            statement_has_jsx(&i.consequent) || i.alternate.as_ref().is_some_and(|s| statement_has_jsx(s))
        }
        Statement::VariableDeclaration(v) => v
            .declarations
            .iter()
            .any(|d| d.init.as_ref().is_some_and(expression_has_jsx)),
        _ => false,
    }
}

fn expression_has_jsx(expr: &Expression) -> bool {
    match expr {
        Expression::JSXElement(_) | Expression::JSXFragment(_) => true,
        Expression::ParenthesizedExpression(p) => expression_has_jsx(&p.expression),
        Expression::ConditionalExpression(c) => {
            expression_has_jsx(&c.consequent) || expression_has_jsx(&c.alternate)
        }
        Expression::LogicalExpression(l) => expression_has_jsx(&l.right),
        _ => false,
    }
}

pub fn class_methods_of<'a>(class: &'a Class<'a>) -> Vec<(&'a str, &'a Function<'a>)> {
    class_methods(class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{RawFile, Source};
    use oxc_allocator::Allocator;

    fn parse(text: &str) -> (RawFile, Allocator) {
        (RawFile::new("Comp.tsx", text), Allocator::default())
    }

    #[test]
    fn arrow_component_is_classified_as_component() {
        let (file, alloc) = parse("export const Child = (p: {n: string}) => <div>{p.n}</div>;");
        let source = Source::parse(&file, &alloc);
        let decls = classify(&source);
        assert_eq!(decls.len(), 1);
        assert!(matches!(decls[0].kind, Kind::Component(_)));
        assert_eq!(decls[0].export_name, "Child");
    }

    #[test]
    fn plain_arrow_function_is_classified_as_function() {
        let (file, alloc) = parse("export const log = (msg: string, level: string) => { console.log(msg, level); };");
        let source = Source::parse(&file, &alloc);
        let decls = classify(&source);
        assert_eq!(decls.len(), 1);
        assert!(matches!(decls[0].kind, Kind::Function(_)));
    }

    #[test]
    fn memo_wrapped_component_unwraps_one_level() {
        let (file, alloc) = parse("export const Comp = memo((p: {n: string}) => <span>{p.n}</span>);");
        let source = Source::parse(&file, &alloc);
        let decls = classify(&source);
        assert_eq!(decls.len(), 1);
        assert!(matches!(decls[0].kind, Kind::Component(_)));
    }

    #[test]
    fn class_declaration_is_classified_as_class() {
        let (file, alloc) = parse("export class Foo { bar(x: string) { return x; } }");
        let source = Source::parse(&file, &alloc);
        let decls = classify(&source);
        assert_eq!(decls.len(), 1);
        assert!(matches!(decls[0].kind, Kind::Class(_)));
    }
}
