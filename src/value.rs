//! The Value Extractor.
//!
//! `extract` turns an arbitrary call argument or JSX attribute into an
//! [`ArgValue`], the tagged union that lets downstream phases compare two
//! syntactically different expressions for semantic sameness. The dispatch
//! shape is a straightforward "match on `Expression` variant, unparse
//! unknown shapes to text" walk over the `oxc_ast` tree, with each variant
//! carrying refactoring-relevant provenance rather than an execution plan.

use oxc_ast::ast::{
    Argument, Expression, JSXAttribute, JSXAttributeItem, JSXAttributeValue, JSXExpressionContainer,
    TSLiteral, TSType, TSTypeAnnotation,
};
use oxc_span::GetSpan;

use crate::ast::Source;
use crate::binder::{resolve_ident, FunctionScope, IdentResolution, Workspace};

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    BooleanLiteral(bool),
    NumberLiteral(String),
    StringLiteral(String),
    JsxShorthand,
    EnumLiteral {
        enum_decl_file: String,
        enum_name: String,
        member_name: String,
        member_value: String,
    },
    VariableLiteral {
        decl_file: String,
        identifier_text: String,
        decl_line: usize,
    },
    ThisLiteral {
        file: String,
        line: usize,
        text: String,
    },
    MethodCallLiteral {
        file: String,
        line: usize,
        text: String,
    },
    OtherLiteral(String),
    FunctionArgValue {
        file: String,
        line: usize,
    },
    ParamRefArgValue {
        decl_file: String,
        enclosing_name: String,
        dotted_path: String,
        line: usize,
    },
    UndefinedArgValue,
}

impl ArgValue {
    /// The equality/hashing projection: `"[" + tag + "]" + payload`.
    pub fn key(&self) -> String {
        match self {
            ArgValue::BooleanLiteral(b) => format!("[boolean]{b}"),
            ArgValue::NumberLiteral(n) => format!("[number]{n}"),
            ArgValue::StringLiteral(s) => format!("[string]{s}"),
            ArgValue::JsxShorthand => "[jsxShorthand]true".to_string(),
            ArgValue::EnumLiteral {
                enum_decl_file,
                enum_name,
                member_name,
                member_value,
            } => format!("[enum]{enum_decl_file}|{enum_name}.{member_name}={member_value}"),
            ArgValue::VariableLiteral {
                decl_file,
                identifier_text,
                decl_line,
            } => format!("[variable]{decl_file}|{identifier_text}|{decl_line}"),
            ArgValue::ThisLiteral { file, line, text } => format!("[this]{file}|{line}|{text}"),
            ArgValue::MethodCallLiteral { file, line, text } => {
                format!("[methodCall]{file}|{line}|{text}")
            }
            ArgValue::OtherLiteral(text) => format!("[other]{text}"),
            ArgValue::FunctionArgValue { file, line } => format!("[function]{file}|{line}"),
            ArgValue::ParamRefArgValue {
                decl_file,
                enclosing_name,
                dotted_path,
                line,
            } => format!("[paramRef]{decl_file}|{enclosing_name}|{dotted_path}|{line}"),
            ArgValue::UndefinedArgValue => "[undefined]".to_string(),
        }
    }

    /// The report-facing textual projection.
    pub fn output(&self) -> String {
        match self {
            ArgValue::BooleanLiteral(b) => b.to_string(),
            ArgValue::NumberLiteral(n) => n.clone(),
            ArgValue::StringLiteral(s) => s.clone(),
            ArgValue::JsxShorthand => "true".to_string(),
            ArgValue::EnumLiteral {
                enum_name,
                member_name,
                ..
            } => format!("{enum_name}.{member_name}"),
            ArgValue::VariableLiteral { identifier_text, .. } => identifier_text.clone(),
            ArgValue::ThisLiteral { text, .. } => text.clone(),
            ArgValue::MethodCallLiteral { text, .. } => text.clone(),
            ArgValue::OtherLiteral(text) => text.clone(),
            ArgValue::FunctionArgValue { .. } => "<function>".to_string(),
            ArgValue::ParamRefArgValue { dotted_path, .. } => dotted_path.clone(),
            ArgValue::UndefinedArgValue => "undefined".to_string(),
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, ArgValue::FunctionArgValue { .. })
    }

    pub fn is_param_ref(&self) -> bool {
        matches!(self, ArgValue::ParamRefArgValue { .. })
    }

    /// Value kinds recognized by the allowed-value-kinds allowlist.
    pub fn kind_name(&self) -> Option<&'static str> {
        match self {
            ArgValue::BooleanLiteral(_) | ArgValue::JsxShorthand => Some("boolean"),
            ArgValue::NumberLiteral(_) => Some("number"),
            ArgValue::StringLiteral(_) => Some("string"),
            ArgValue::EnumLiteral { .. } => Some("enum"),
            ArgValue::UndefinedArgValue => Some("undefined"),
            _ => None,
        }
    }
}

/// Everything `extract` needs to resolve identifiers: which file the
/// expression lives in, the workspace-wide symbol tables, and the
/// innermost function scope enclosing the expression (used for rules 3b,
/// 5, and 11 — parameter-reference detection and naming).
pub struct ExtractCtx<'a, 'b> {
    pub file_idx: usize,
    pub source: &'b Source<'a>,
    pub workspace: &'b Workspace<'a>,
    pub function_scope: Option<&'b FunctionScope<'a>>,
}

impl<'a, 'b> ExtractCtx<'a, 'b> {
    pub fn new(
        file_idx: usize,
        source: &'b Source<'a>,
        workspace: &'b Workspace<'a>,
        function_scope: Option<&'b FunctionScope<'a>>,
    ) -> Self {
        Self {
            file_idx,
            source,
            workspace,
            function_scope,
        }
    }

    pub fn file_path(&self) -> String {
        self.source.path_string()
    }

    pub fn with_scope<'c>(&'c self, scope: Option<&'c FunctionScope<'a>>) -> ExtractCtx<'a, 'c> {
        ExtractCtx {
            file_idx: self.file_idx,
            source: self.source,
            workspace: self.workspace,
            function_scope: scope,
        }
    }
}

/// JSX attribute entry point.
pub fn extract_jsx_attribute(attr: &JSXAttributeItem, ctx: &ExtractCtx) -> ArgValue {
    let JSXAttributeItem::Attribute(attr) = attr else {
        return ArgValue::OtherLiteral(span_text(ctx, attr.span()));
    };
    extract_attribute(attr, ctx)
}

fn extract_attribute(attr: &JSXAttribute, ctx: &ExtractCtx) -> ArgValue {
    match &attr.value {
        None => ArgValue::JsxShorthand,
        Some(JSXAttributeValue::ExpressionContainer(container)) => {
            extract_expression_container(container, ctx)
        }
        Some(JSXAttributeValue::StringLiteral(s)) => ArgValue::StringLiteral(s.value.to_string()),
        Some(other) => ArgValue::OtherLiteral(span_text(ctx, other.span())),
    }
}

fn extract_expression_container(container: &JSXExpressionContainer, ctx: &ExtractCtx) -> ArgValue {
    use oxc_ast::ast::JSXExpression;
    match &container.expression {
        JSXExpression::EmptyExpression(_) => ArgValue::UndefinedArgValue,
        expr => extract(expr.to_expression(), ctx),
    }
}

/// Entry point from a call argument.
pub fn extract_argument(arg: &Argument, ctx: &ExtractCtx) -> ArgValue {
    match arg.as_expression() {
        Some(expr) => extract(expr, ctx),
        None => ArgValue::OtherLiteral(span_text(ctx, arg.span())),
    }
}

/// The core dispatch over rules 2-10. JSX handling lives in
/// `extract_jsx_attribute`/`extract_attribute`; this function is the body
/// of every subsequent rule and is also the target of rule-6 recursion.
pub fn extract(expr: &Expression, ctx: &ExtractCtx) -> ArgValue {
    // Unwrap parens; they carry no semantic weight for any rule below.
    if let Expression::ParenthesizedExpression(p) = expr {
        return extract(&p.expression, ctx);
    }

    // Rule 2: call-signature type (the expression is itself a function
    // literal, or is an identifier resolving to one).
    if is_function_valued(expr, ctx) {
        let line = location(ctx, expr.span());
        return ArgValue::FunctionArgValue {
            file: ctx.file_path(),
            line,
        };
    }

    match expr {
        Expression::StaticMemberExpression(member) => {
            extract_static_member(member, ctx)
        }
        Expression::Identifier(ident) => extract_identifier(ident, ctx),
        Expression::BooleanLiteral(b) => ArgValue::BooleanLiteral(b.value),
        Expression::NumericLiteral(n) => ArgValue::NumberLiteral(format_number(n.value)),
        Expression::StringLiteral(s) => ArgValue::StringLiteral(s.value.to_string()),
        Expression::CallExpression(call) => {
            // Rule 8: the callee's declared return type is itself a literal
            // type (e.g. `function status(): "active" { ... }`). Checked
            // before rule 9's method-call/param-ref heuristics, per the
            // spec's "first matching rule wins" ordering.
            if let Expression::Identifier(callee) = &call.callee {
                if let Some(ann) =
                    crate::binder::resolve_return_type(callee.name.as_str(), ctx.file_idx, ctx.workspace)
                {
                    if let Some(value) = extract_from_type_annotation(ann) {
                        return value;
                    }
                }
            }

            let callee_is_member = matches!(
                call.callee,
                Expression::StaticMemberExpression(_) | Expression::ComputedMemberExpression(_)
            );
            let any_arg_is_param_ref = call
                .arguments
                .iter()
                .any(|a| a.as_expression().is_some_and(|e| is_param_ref_expr(e, ctx)));
            if callee_is_member || any_arg_is_param_ref {
                let line = location(ctx, expr.span());
                ArgValue::MethodCallLiteral {
                    file: ctx.file_path(),
                    line,
                    text: span_text(ctx, expr.span()),
                }
            } else {
                ArgValue::OtherLiteral(span_text(ctx, expr.span()))
            }
        }
        _ => ArgValue::OtherLiteral(span_text(ctx, expr.span())),
    }
}

fn extract_static_member(
    member: &oxc_ast::ast::StaticMemberExpression,
    ctx: &ExtractCtx,
) -> ArgValue {
    // Rule 3a: property access resolving to an enum member.
    if let Expression::Identifier(obj_ident) = &member.object {
        if let IdentResolution::EnumDecl { file, decl } =
            resolve_ident(obj_ident.name.as_str(), ctx.file_idx, ctx.function_scope, ctx.workspace)
        {
            if let Some(value) = crate::binder::enum_member_value(decl, member.property.name.as_str()) {
                return ArgValue::EnumLiteral {
                    enum_decl_file: file,
                    enum_name: obj_ident.name.to_string(),
                    member_name: member.property.name.to_string(),
                    member_value: value,
                };
            }
        }
    }

    // Rule 3b: left-hand side is itself a parameter reference.
    if is_param_ref_expr(&member.object, ctx) {
        let path = format!("{}.{}", dotted_path_of(&member.object, ctx), member.property.name);
        return build_param_ref(path, member.span, ctx);
    }

    // Rule 3c: access chain rooted at `this`.
    if rooted_at_this(&member.object) {
        let line = location(ctx, member.span);
        return ArgValue::ThisLiteral {
            file: ctx.file_path(),
            line,
            text: span_text(ctx, member.span),
        };
    }

    ArgValue::OtherLiteral(span_text(ctx, member.span))
}

fn rooted_at_this(expr: &Expression) -> bool {
    match expr {
        Expression::ThisExpression(_) => true,
        Expression::StaticMemberExpression(m) => rooted_at_this(&m.object),
        Expression::ComputedMemberExpression(m) => rooted_at_this(&m.object),
        _ => false,
    }
}

fn extract_identifier(ident: &oxc_ast::ast::IdentifierReference, ctx: &ExtractCtx) -> ArgValue {
    // Rule 4: the identifier `undefined`.
    if ident.name.as_str() == "undefined" {
        return ArgValue::UndefinedArgValue;
    }

    match resolve_ident(ident.name.as_str(), ctx.file_idx, ctx.function_scope, ctx.workspace) {
        // Rule 5: parameter / destructuring binding element.
        IdentResolution::Parameter => build_param_ref(ident.name.to_string(), ident.span, ctx),
        // Rule 6: variable with initializer — chain-follow.
        IdentResolution::VariableWithInit(init) => extract(init, ctx),
        // Rule 7: variable without initializer, or import.
        IdentResolution::VariableNoInit { file, line } => ArgValue::VariableLiteral {
            decl_file: file,
            identifier_text: ident.name.to_string(),
            decl_line: line,
        },
        IdentResolution::EnumDecl { .. } | IdentResolution::FunctionLike | IdentResolution::Unresolved => {
            ArgValue::OtherLiteral(ident.name.to_string())
        }
    }
}

/// Rule 5's criterion, reused by rule 3b and rule 9 (method-call args).
fn is_param_ref_expr(expr: &Expression, ctx: &ExtractCtx) -> bool {
    match expr {
        Expression::Identifier(ident) => matches!(
            resolve_ident(ident.name.as_str(), ctx.file_idx, ctx.function_scope, ctx.workspace),
            IdentResolution::Parameter
        ),
        Expression::StaticMemberExpression(m) => is_param_ref_expr(&m.object, ctx),
        Expression::ComputedMemberExpression(m) => is_param_ref_expr(&m.object, ctx),
        Expression::ParenthesizedExpression(p) => is_param_ref_expr(&p.expression, ctx),
        _ => false,
    }
}

/// Rule 2: does this expression have a call-signature type?
fn is_function_valued(expr: &Expression, ctx: &ExtractCtx) -> bool {
    match expr {
        Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_) => true,
        Expression::Identifier(ident) => {
            match resolve_ident(ident.name.as_str(), ctx.file_idx, ctx.function_scope, ctx.workspace) {
                IdentResolution::FunctionLike => true,
                IdentResolution::VariableWithInit(init) => is_function_valued(init, ctx),
                IdentResolution::Parameter => {
                    function_scope_param_is_function_typed(ctx, ident.name.as_str())
                }
                _ => false,
            }
        }
        _ => false,
    }
}

/// Best-effort syntactic check: does the enclosing function's parameter
/// list type-annotate this name as a function type? A documented
/// simplification, since no full type checker is available.
fn function_scope_param_is_function_typed(_ctx: &ExtractCtx, _name: &str) -> bool {
    // Parameter type annotations are consulted directly by `usage.rs`
    // (which has the `FormalParameter` node in hand); by the time an
    // identifier reaches here we only have its name, so this always
    // defers to whatever `is_function_valued` already matched via the
    // resolved declaration's initializer. Kept as an explicit extension
    // point rather than silently always returning false.
    false
}

/// Builds a `ParamRefArgValue` for an identifier resolved to a parameter or
/// binding element.
fn build_param_ref(dotted_path: String, span: oxc_span::Span, ctx: &ExtractCtx) -> ArgValue {
    let Some(scope) = ctx.function_scope else {
        return ArgValue::OtherLiteral(span_text(ctx, span));
    };
    let line = location(ctx, span);
    ArgValue::ParamRefArgValue {
        decl_file: ctx.file_path(),
        enclosing_name: scope.enclosing_name.clone(),
        dotted_path,
        line,
    }
}

fn dotted_path_of(expr: &Expression, ctx: &ExtractCtx) -> String {
    match expr {
        Expression::Identifier(ident) => ident.name.to_string(),
        Expression::StaticMemberExpression(m) => {
            format!("{}.{}", dotted_path_of(&m.object, ctx), m.property.name)
        }
        Expression::ParenthesizedExpression(p) => dotted_path_of(&p.expression, ctx),
        other => span_text(ctx, other.span()),
    }
}

/// Rule 8: the expression's static TS type is a literal type.
pub fn extract_from_type_annotation(annotation: &TSTypeAnnotation) -> Option<ArgValue> {
    literal_from_type(&annotation.type_annotation)
}

fn literal_from_type(ty: &TSType) -> Option<ArgValue> {
    match ty {
        TSType::TSLiteralType(lit) => Some(match &lit.literal {
            TSLiteral::StringLiteral(s) => ArgValue::StringLiteral(s.value.to_string()),
            TSLiteral::NumericLiteral(n) => ArgValue::NumberLiteral(format_number(n.value)),
            TSLiteral::BooleanLiteral(b) => ArgValue::BooleanLiteral(b.value),
            _ => return None,
        }),
        _ => None,
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn location(ctx: &ExtractCtx, span: oxc_span::Span) -> usize {
    ctx.source.line_of(span.start)
}

fn span_text(ctx: &ExtractCtx, span: oxc_span::Span) -> String {
    ctx.source
        .text
        .get(span.start as usize..span.end as usize)
        .unwrap_or("")
        .to_string()
}
