//! Core data containers.
//!
//! `ArgValue` lives in `value.rs` (it needs `Source`/AST helpers that would
//! otherwise pull every other module into this one); everything that is
//! pure data shape lives here, separating data containers from the logic
//! that builds and walks them.

use std::collections::HashMap;

use oxc_ast::ast::{BindingPatternKind, FormalParameters};

use crate::value::ArgValue;

/// One observed argument/prop value at a single accepted reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Usage {
    pub name: String,
    pub value: ArgValue,
    pub file: String,
    pub line: usize,
}

/// A formal parameter or prop of an analyzed declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub index: usize,
    pub required: bool,
}

/// One classified, walked declaration and the usages collected for it.
#[derive(Debug, Clone)]
pub struct AnalyzedDeclaration {
    pub name: String,
    pub source_file: String,
    pub source_line: usize,
    pub definitions: Vec<Definition>,
    pub usages_by_param: HashMap<String, Vec<Usage>>,
}

impl AnalyzedDeclaration {
    pub fn new(name: String, source_file: String, source_line: usize, definitions: Vec<Definition>) -> Self {
        Self {
            name,
            source_file,
            source_line,
            definitions,
            usages_by_param: HashMap::new(),
        }
    }

    pub fn push_usage(&mut self, usage: Usage) {
        self.usages_by_param
            .entry(usage.name.clone())
            .or_default()
            .push(usage);
    }

    /// Total accepted-reference count for this declaration.
    pub fn total_call_count(&self) -> usize {
        self.usages_by_param
            .values()
            .map(|v| v.len())
            .max()
            .unwrap_or(0)
    }
}

/// A reported constant parameter: the report unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantParam {
    pub declaration_name: String,
    pub declaration_file: String,
    pub declaration_line: usize,
    pub param_name: String,
    pub value: ArgValue,
    pub usages: Vec<Usage>,
}

/// One `CallSiteMap` inner entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSiteArg {
    pub name: String,
    pub value: ArgValue,
    pub caller_file: String,
    pub caller_line: usize,
}

/// `declarationId -> paramName -> [CallSiteArg]`.
///
/// `declarationId` is `"<declFile>:<declName>"`. Frozen (read-only) after
/// the Call-Site Collector's single pass.
#[derive(Debug, Clone, Default)]
pub struct CallSiteMap {
    entries: HashMap<String, HashMap<String, Vec<CallSiteArg>>>,
}

impl CallSiteMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declaration_id(decl_file: &str, decl_name: &str) -> String {
        format!("{decl_file}:{decl_name}")
    }

    pub fn record(&mut self, decl_id: &str, arg: CallSiteArg) {
        self.entries
            .entry(decl_id.to_string())
            .or_default()
            .entry(arg.name.clone())
            .or_default()
            .push(arg);
    }

    pub fn args_for(&self, decl_id: &str, param_name: &str) -> Option<&[CallSiteArg]> {
        self.entries
            .get(decl_id)
            .and_then(|params| params.get(param_name))
            .map(|v| v.as_slice())
    }

    pub fn has_declaration(&self, decl_id: &str) -> bool {
        self.entries.contains_key(decl_id)
    }
}

/// Builds `Definition`s from a formal parameter list. Shared by
/// `classify.rs` (function/component/method declarations) so the
/// "required iff no `?` marker and no default initializer" rule lives in
/// one place instead of being reimplemented per callable shape.
pub fn formal_definitions(params: &FormalParameters) -> Vec<Definition> {
    params
        .items
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let (name, has_default) = binding_name(&p.pattern.kind, index);
            Definition {
                name,
                index,
                required: !p.pattern.optional && !has_default,
            }
        })
        .collect()
}

/// Resolves a formal's reported name, and whether it carries a default
/// initializer (an `AssignmentPattern`, which makes it non-required
/// regardless of the `?` marker on the outer `BindingPattern`).
fn binding_name(kind: &BindingPatternKind, index: usize) -> (String, bool) {
    match kind {
        BindingPatternKind::BindingIdentifier(id) => (id.name.to_string(), false),
        BindingPatternKind::AssignmentPattern(ap) => {
            let (name, _) = binding_name(&ap.left.kind, index);
            (name, true)
        }
        BindingPatternKind::ObjectPattern(_) | BindingPatternKind::ArrayPattern(_) => {
            (format!("arg{index}"), false)
        }
    }
}

/// The host-observed output of a complete analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    pub constant_params: Vec<ConstantParam>,
    pub declarations: Vec<AnalyzedDeclaration>,
}
