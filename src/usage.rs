//! The Usage Extractor, and object flattening.
//!
//! Turns one accepted reference (a call, or a JSX element) into zero or
//! more [`Usage`] records, one per formal parameter / prop path. Object
//! literal arguments are flattened into dotted paths; properties the
//! expected type declares but the call/element omits are synthesized as
//! `UndefinedArgValue` usages, recursively for omitted object-typed
//! properties — the rule that makes "omitted entirely" comparable with
//! "supplied partially".

use oxc_ast::ast::{
    CallExpression, Expression, JSXAttributeItem, JSXAttributeName, JSXAttributeValue,
    JSXExpression, JSXOpeningElement, ObjectPropertyKind, TSType,
};

use crate::binder::Workspace;
use crate::disable::has_disable;
use crate::model::{Definition, Usage};
use crate::types::{property_key_name, resolve_object_type};
use crate::value::{extract, extract_jsx_attribute, ArgValue, ExtractCtx};

/// Extracts usages from a call expression. `call_stmt_offset` is the byte
/// offset of the call's enclosing statement, used by the disable-comment
/// guard.
pub fn usages_from_call<'a>(
    call: &'a CallExpression<'a>,
    call_stmt_offset: u32,
    definitions: &[Definition],
    param_type: impl Fn(usize) -> Option<&'a TSType<'a>>,
    file_idx: usize,
    workspace: &Workspace<'a>,
    ctx: &ExtractCtx,
) -> Vec<Usage> {
    if has_disable(ctx.source.text, call_stmt_offset) {
        return Vec::new();
    }

    let mut usages = Vec::new();
    let line = ctx.source.line_of(call.span.start);
    for def in definitions {
        match call.arguments.get(def.index).and_then(|a| a.as_expression()) {
            None => usages.push(Usage {
                name: def.name.clone(),
                value: ArgValue::UndefinedArgValue,
                file: ctx.file_path(),
                line,
            }),
            Some(expr) => {
                let expected = param_type(def.index);
                for (name, value) in flatten(expr, &def.name, expected, file_idx, workspace, ctx) {
                    usages.push(Usage {
                        name,
                        value,
                        file: ctx.file_path(),
                        line,
                    });
                }
            }
        }
    }
    usages
}

/// Extracts usages from a JSX element. `props_type` is the component's
/// resolved props type from `Callable::component_props`, used both to
/// find each attribute's own expected sub-type and, via `definitions`, to
/// know every prop name that should produce a usage.
pub fn usages_from_jsx<'a>(
    opening: &'a JSXOpeningElement<'a>,
    definitions: &[Definition],
    props_type: Option<&'a TSType<'a>>,
    file_idx: usize,
    workspace: &Workspace<'a>,
    ctx: &ExtractCtx,
) -> Vec<Usage> {
    if has_disable(ctx.source.text, opening.span.start) {
        return Vec::new();
    }

    let line = ctx.source.line_of(opening.span.start);
    let by_name = index_attributes(opening);
    let props_info = props_type.and_then(|t| resolve_object_type(t, file_idx, workspace));

    let mut usages = Vec::new();
    for def in definitions {
        let Some(attr_item) = by_name.get(def.name.as_str()) else {
            usages.push(Usage {
                name: def.name.clone(),
                value: ArgValue::UndefinedArgValue,
                file: ctx.file_path(),
                line,
            });
            continue;
        };

        let JSXAttributeItem::Attribute(attr) = attr_item else {
            usages.push(Usage {
                name: def.name.clone(),
                value: extract_jsx_attribute(attr_item, ctx),
                file: ctx.file_path(),
                line,
            });
            continue;
        };

        match &attr.value {
            None => usages.push(Usage {
                name: def.name.clone(),
                value: ArgValue::JsxShorthand,
                file: ctx.file_path(),
                line,
            }),
            Some(JSXAttributeValue::ExpressionContainer(container)) => match &container.expression
            {
                JSXExpression::EmptyExpression(_) => usages.push(Usage {
                    name: def.name.clone(),
                    value: ArgValue::UndefinedArgValue,
                    file: ctx.file_path(),
                    line,
                }),
                expr => {
                    let expected = props_info.as_ref().and_then(|info| info.property_type(&def.name));
                    for (name, value) in
                        flatten(expr.to_expression(), &def.name, expected, file_idx, workspace, ctx)
                    {
                        usages.push(Usage {
                            name,
                            value,
                            file: ctx.file_path(),
                            line,
                        });
                    }
                }
            },
            Some(_) => usages.push(Usage {
                name: def.name.clone(),
                value: extract_jsx_attribute(attr_item, ctx),
                file: ctx.file_path(),
                line,
            }),
        }
    }
    usages
}

fn index_attributes<'a>(
    opening: &'a JSXOpeningElement<'a>,
) -> std::collections::HashMap<&'a str, &'a JSXAttributeItem<'a>> {
    let mut map = std::collections::HashMap::new();
    for attr in &opening.attributes {
        if let JSXAttributeItem::Attribute(a) = attr {
            if let JSXAttributeName::Identifier(name) = &a.name {
                map.insert(name.name.as_str(), attr);
            }
        }
    }
    map
}

/// Flattens an object-literal argument into dotted-path usages. Non-object
/// expressions bottom out at `extract`; object
/// literals are walked property-by-property, and any property named by
/// `expected_type` but absent from the literal is synthesized as
/// `UndefinedArgValue` (recursively, for nested object-typed properties
/// entirely missing).
fn flatten<'a>(
    expr: &'a Expression<'a>,
    prefix: &str,
    expected_type: Option<&'a TSType<'a>>,
    file_idx: usize,
    workspace: &Workspace<'a>,
    ctx: &ExtractCtx,
) -> Vec<(String, ArgValue)> {
    let Expression::ObjectExpression(obj) = unwrap_parens(expr) else {
        return vec![(prefix.to_string(), extract(expr, ctx))];
    };

    let expected_info = expected_type.and_then(|t| resolve_object_type(t, file_idx, workspace));
    let mut out = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for prop in &obj.properties {
        let ObjectPropertyKind::ObjectProperty(p) = prop else {
            continue;
        };
        let Some(name) = property_key_name(&p.key) else {
            continue;
        };
        seen.insert(name.clone());
        let path = join(prefix, &name);

        if p.shorthand {
            out.push((path, extract(&p.value, ctx)));
        } else {
            let sub_expected = expected_info.as_ref().and_then(|info| info.property_type(&name));
            out.extend(flatten(&p.value, &path, sub_expected, file_idx, workspace, ctx));
        }
    }

    if let Some(info) = expected_info {
        for prop in &info.properties {
            if seen.contains(&prop.name) {
                continue;
            }
            let path = join(prefix, &prop.name);
            let nested = prop
                .property_type
                .and_then(|t| resolve_object_type(t, file_idx, workspace))
                .filter(|n| !n.properties.is_empty());
            match nested {
                Some(nested) => out.extend(synthesize_missing_leaves(&path, &nested, file_idx, workspace)),
                None => out.push((path, ArgValue::UndefinedArgValue)),
            }
        }
    }

    out
}

fn synthesize_missing_leaves<'a>(
    prefix: &str,
    info: &crate::types::ObjectTypeInfo<'a>,
    file_idx: usize,
    workspace: &Workspace<'a>,
) -> Vec<(String, ArgValue)> {
    let mut out = Vec::new();
    for prop in &info.properties {
        let path = join(prefix, &prop.name);
        let nested = prop
            .property_type
            .and_then(|t| resolve_object_type(t, file_idx, workspace))
            .filter(|n| !n.properties.is_empty());
        match nested {
            Some(nested) => out.extend(synthesize_missing_leaves(&path, &nested, file_idx, workspace)),
            None => out.push((path, ArgValue::UndefinedArgValue)),
        }
    }
    out
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn unwrap_parens<'a>(expr: &'a Expression<'a>) -> &'a Expression<'a> {
    match expr {
        Expression::ParenthesizedExpression(p) => unwrap_parens(&p.expression),
        other => other,
    }
}
