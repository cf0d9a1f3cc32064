//! Resolves the "expected object type" of an expression from its
//! syntactic TypeScript annotation, backing missing-property synthesis and
//! contextual/expected-type queries: with no type checker available,
//! expected types are read directly off parameter/property type
//! annotations already present in the `oxc_ast` tree.

use std::collections::HashSet;

use oxc_ast::ast::{PropertyKey, TSSignature, TSType, TSTypeName};

use crate::binder::{TypeDecl, Workspace};

/// One property of a resolved object type: its name, its own type (for
/// recursive unwrapping of nested missing properties), and whether it is
/// optional (`?` marker, or a union with `undefined`).
pub struct ObjectTypeProperty<'a> {
    pub name: String,
    pub property_type: Option<&'a TSType<'a>>,
}

pub struct ObjectTypeInfo<'a> {
    pub properties: Vec<ObjectTypeProperty<'a>>,
}

impl<'a> ObjectTypeInfo<'a> {
    pub fn property_type(&self, name: &str) -> Option<&'a TSType<'a>> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.property_type)
    }
}

/// Shared with `usage.rs`'s object-literal flattening: both interface
/// members and object-literal properties key off the same `PropertyKey`
/// node shape.
pub fn property_key_name(key: &PropertyKey) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(id.name.to_string()),
        PropertyKey::Expression(oxc_ast::ast::Expression::StringLiteral(s)) => {
            Some(s.value.to_string())
        }
        _ => None,
    }
}

/// Resolves `ty` to an object type, unwrapping a single level of
/// `TSTypeReference` (interface/type-alias lookup) and, for unions,
/// picking the first union member that is a non-primitive, non-array,
/// non-literal type with at least one property, recursing through nested
/// unions.
pub fn resolve_object_type<'a>(
    ty: &'a TSType<'a>,
    file_idx: usize,
    workspace: &Workspace<'a>,
) -> Option<ObjectTypeInfo<'a>> {
    resolve_object_type_guarded(ty, file_idx, workspace, &mut HashSet::new())
}

fn resolve_object_type_guarded<'a>(
    ty: &'a TSType<'a>,
    file_idx: usize,
    workspace: &Workspace<'a>,
    visiting: &mut HashSet<String>,
) -> Option<ObjectTypeInfo<'a>> {
    match ty {
        TSType::TSTypeLiteral(lit) => Some(object_type_info_from_signatures(&lit.members)),
        TSType::TSTypeReference(r) => {
            let TSTypeName::IdentifierReference(name) = &r.type_name else {
                return None;
            };
            let key = format!("{file_idx}:{}", name.name);
            if !visiting.insert(key.clone()) {
                return None; // cyclic alias; bail rather than loop forever
            }
            let scope = &workspace.scopes[file_idx];
            let result = match scope.type_decls.get(name.name.as_str()) {
                Some(TypeDecl::Interface(iface)) => Some(object_type_info_from_signatures(&iface.body.body)),
                Some(TypeDecl::Alias(aliased)) => {
                    resolve_object_type_guarded(aliased, file_idx, workspace, visiting)
                }
                None => None,
            };
            visiting.remove(&key);
            result
        }
        TSType::TSUnionType(u) => {
            for member in &u.types {
                if let Some(info) = resolve_object_type_guarded(member, file_idx, workspace, visiting) {
                    if !info.properties.is_empty() {
                        return Some(info);
                    }
                }
            }
            None
        }
        // Primitives, arrays, literal types: none of these carry named
        // properties usable for missing-property synthesis.
        _ => None,
    }
}

fn object_type_info_from_signatures<'a>(signatures: &'a [TSSignature<'a>]) -> ObjectTypeInfo<'a> {
    let properties = signatures
        .iter()
        .filter_map(|sig| match sig {
            TSSignature::TSPropertySignature(prop) => {
                let name = property_key_name(&prop.key)?;
                let property_type = prop
                    .type_annotation
                    .as_ref()
                    .map(|ann| &ann.type_annotation);
                Some(ObjectTypeProperty { name, property_type })
            }
            _ => None,
        })
        .collect();
    ObjectTypeInfo { properties }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{RawFile, Source};
    use oxc_allocator::Allocator;

    #[test]
    fn resolves_interface_members() {
        let text = "interface Opts { a: string; b?: number; }\nexport function f(o: Opts) {}";
        let file = RawFile::new("f.ts", text);
        let alloc = Allocator::default();
        let source = Source::parse(&file, &alloc);
        let sources = [source];
        let workspace = Workspace::build(&sources);

        let scope = &workspace.scopes[0];
        let TypeDecl::Interface(iface) = scope.type_decls.get("Opts").unwrap() else {
            panic!("expected interface");
        };
        let info = object_type_info_from_signatures(&iface.body.body);
        let names: Vec<_> = info.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
