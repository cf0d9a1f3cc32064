//! The glue that drives the whole analysis end to end.
//!
//! `analyze` parses every file once, builds the workspace-wide symbol
//! table and `CallSiteMap`, then drives the pipeline twice with different
//! declaration kinds (components / functions+methods) over a single
//! shared Call-Site Collector output, merging both passes' `ConstantParam`s
//! into one [`AnalysisResult`].

use oxc_allocator::Allocator;

use crate::ast::{RawFile, Source};
use crate::binder::Workspace;
use crate::callsite;
use crate::classify::{self, Callable, Kind};
use crate::config::{Options, Target};
use crate::constancy::{self, ConstancyOptions};
use crate::model::{AnalysisResult, AnalyzedDeclaration, CallSiteMap};
use crate::resolver;
use crate::usage;
use crate::value::ExtractCtx;
use crate::walker::{self, AcceptedRef, RefKind};

/// The core library surface. Owns the allocators and parsed
/// `Source`s for the whole run in its own stack frame (per `ast.rs`'s
/// documented ownership model) rather than storing them anywhere longer
/// lived, since `Source<'a>` borrows from both.
pub fn analyze(files: &[RawFile], options: &Options) -> AnalysisResult {
    let allocators: Vec<Allocator> = files.iter().map(|_| Allocator::default()).collect();
    let sources: Vec<Source> = files
        .iter()
        .zip(allocators.iter())
        .map(|(file, alloc)| Source::parse(file, alloc))
        .collect();

    for source in &sources {
        for err in &source.parse_errors {
            tracing::debug!(file = %source.path_string(), error = %err, "parse error");
        }
    }

    let workspace = Workspace::build(&sources);
    let excluded: Vec<bool> = sources
        .iter()
        .map(|s| (options.exclude_filter)(s.path))
        .collect();
    let call_site_map = callsite::collect(&sources, &workspace, &excluded);

    let constancy_options = ConstancyOptions {
        min_usages: options.min_usages,
        allowed_value_kinds: options.allowed_value_kinds.clone(),
    };

    let mut declarations = Vec::new();

    for (file_idx, source) in sources.iter().enumerate() {
        if excluded[file_idx] {
            continue;
        }
        for classified in classify::classify(source) {
            match &classified.kind {
                Kind::Component(callable) => {
                    if !matches!(options.target, Target::All | Target::Components) {
                        continue;
                    }
                    declarations.push(analyze_component(
                        &classified.export_name,
                        &classified.source_file,
                        classified.source_line,
                        *callable,
                        file_idx,
                        &sources,
                        &workspace,
                        &excluded,
                        &call_site_map,
                    ));
                }
                Kind::Function(callable) => {
                    if !matches!(options.target, Target::All | Target::Functions) {
                        continue;
                    }
                    declarations.push(analyze_function(
                        &classified.export_name,
                        &classified.source_file,
                        classified.source_line,
                        *callable,
                        file_idx,
                        &sources,
                        &workspace,
                        &excluded,
                        &call_site_map,
                    ));
                }
                Kind::Class(class) => {
                    if !matches!(options.target, Target::All | Target::Functions) {
                        continue;
                    }
                    for (method_name, method) in classify::class_methods_of(class) {
                        declarations.push(analyze_method(
                            &classified.export_name,
                            method_name,
                            method,
                            &classified.source_file,
                            source,
                            &sources,
                            &workspace,
                            &excluded,
                            &call_site_map,
                        ));
                    }
                }
            }
        }
    }

    let mut constant_params = Vec::new();
    for decl in &declarations {
        constant_params.extend(constancy::classify_constants(decl, &constancy_options));
    }
    // Ordering is not a contract, but stable within a run: file path, then
    // declaration line, then parameter path.
    constant_params.sort_by(|a, b| {
        (&a.declaration_file, a.declaration_line, &a.param_name).cmp(&(
            &b.declaration_file,
            b.declaration_line,
            &b.param_name,
        ))
    });

    AnalysisResult {
        constant_params,
        declarations,
    }
}

#[allow(clippy::too_many_arguments)]
fn analyze_component<'a>(
    export_name: &str,
    source_file: &str,
    source_line: usize,
    callable: Callable<'a>,
    decl_file_idx: usize,
    sources: &[Source<'a>],
    workspace: &Workspace<'a>,
    excluded: &[bool],
    call_site_map: &CallSiteMap,
) -> AnalyzedDeclaration {
    let (definitions, props_type) = callable.component_props(decl_file_idx, workspace);
    let mut decl = AnalyzedDeclaration::new(export_name.to_string(), source_file.to_string(), source_line, definitions.clone());

    let refs = walker::walk_function_or_component(export_name, source_file, sources, workspace, excluded);
    for r in &refs {
        let RefKind::Jsx(opening) = r.kind else { continue };
        let ctx = ExtractCtx::new(r.file_idx, &sources[r.file_idx], workspace, r.scope.as_ref());
        for usage in usage::usages_from_jsx(opening, &definitions, props_type, r.file_idx, workspace, &ctx) {
            push_resolved(&mut decl, usage, call_site_map);
        }
    }
    decl
}

#[allow(clippy::too_many_arguments)]
fn analyze_function<'a>(
    export_name: &str,
    source_file: &str,
    source_line: usize,
    callable: Callable<'a>,
    decl_file_idx: usize,
    sources: &[Source<'a>],
    workspace: &Workspace<'a>,
    excluded: &[bool],
    call_site_map: &CallSiteMap,
) -> AnalyzedDeclaration {
    let _ = decl_file_idx;
    let definitions = callable.definitions();
    let mut decl = AnalyzedDeclaration::new(export_name.to_string(), source_file.to_string(), source_line, definitions.clone());

    let refs = walker::walk_function_or_component(export_name, source_file, sources, workspace, excluded);
    for r in &refs {
        let RefKind::Call(call) = r.kind else { continue };
        let ctx = ExtractCtx::new(r.file_idx, &sources[r.file_idx], workspace, r.scope.as_ref());
        let param_type = |i: usize| callable.param_type(i);
        for usage in usage::usages_from_call(call, call.span.start, &definitions, param_type, r.file_idx, workspace, &ctx) {
            push_resolved(&mut decl, usage, call_site_map);
        }
    }
    decl
}

#[allow(clippy::too_many_arguments)]
fn analyze_method<'a>(
    class_name: &str,
    method_name: &str,
    method: &'a oxc_ast::ast::Function<'a>,
    decl_file: &str,
    decl_source: &Source<'a>,
    sources: &[Source<'a>],
    workspace: &Workspace<'a>,
    excluded: &[bool],
    call_site_map: &CallSiteMap,
) -> AnalyzedDeclaration {
    let callable = Callable::Fn(method);
    let definitions = callable.definitions();
    let qualified_name = format!("{class_name}.{method_name}");
    let source_file = decl_file.to_string();
    let source_line = decl_source.line_of(method.span.start);

    let mut decl = AnalyzedDeclaration::new(qualified_name, source_file, source_line, definitions.clone());

    let refs = walker::walk_method(class_name, method_name, sources, workspace, excluded);
    for r in &refs {
        let RefKind::Call(call) = r.kind else { continue };
        let ctx = ExtractCtx::new(r.file_idx, &sources[r.file_idx], workspace, r.scope.as_ref());
        let param_type = |i: usize| callable.param_type(i);
        for usage in usage::usages_from_call(call, call.span.start, &definitions, param_type, r.file_idx, workspace, &ctx) {
            push_resolved(&mut decl, usage, call_site_map);
        }
    }
    decl
}

fn push_resolved(decl: &mut AnalyzedDeclaration, mut usage: crate::model::Usage, call_site_map: &CallSiteMap) {
    if usage.value.is_param_ref() {
        usage.value = resolver::resolve_or_self(&usage.value, call_site_map);
    }
    decl.push_usage(usage);
}
