//! Source loading and parsing using Oxc.
//!
//! A [`Source`] owns its parsed `oxc_ast` [`Program`] plus a byte-offset to
//! line-number index. Each file's AST arena is scoped to a single parse
//! call, so a whole analysis run keeps one allocator per file alive in its
//! own stack frame for the run's duration.

use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Raw file contents handed to [`crate::pipeline::analyze`], owned by the
/// caller (the CLI, or a test fixture) for the whole analysis run.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub path: PathBuf,
    pub text: String,
}

impl RawFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// A parsed source file. Borrows its text from the caller-owned [`RawFile`]
/// and its AST arena from a caller-owned [`Allocator`]; both must outlive
/// this value, which is why [`crate::pipeline::analyze`] keeps the
/// allocators and raw files alive in its own stack frame for the run's
/// duration rather than storing `Source` anywhere longer-lived.
pub struct Source<'a> {
    pub path: &'a Path,
    pub text: &'a str,
    pub program: Program<'a>,
    line_starts: Vec<u32>,
    pub parse_errors: Vec<String>,
}

impl<'a> Source<'a> {
    pub fn parse(file: &'a RawFile, allocator: &'a Allocator) -> Self {
        let source_type = source_type_for_path(&file.path);
        let parser_return = Parser::new(allocator, &file.text, source_type).parse();
        let parse_errors = parser_return
            .errors
            .iter()
            .map(|e| format!("{e:?}"))
            .collect();

        Self {
            path: &file.path,
            text: &file.text,
            program: parser_return.program,
            line_starts: line_starts(&file.text),
            parse_errors,
        }
    }

    /// 1-based line number for a byte offset into `self.text`.
    pub fn line_of(&self, offset: u32) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

fn line_starts(text: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}

/// Picks an Oxc `SourceType` from a path's extension. Falls back to
/// unambiguous JS parsing for extensions that don't map cleanly, so
/// malformed-but-present paths never abort the whole run.
pub fn source_type_for_path(path: &Path) -> SourceType {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ts") => SourceType::default().with_typescript(true).with_jsx(false),
        Some("tsx") => SourceType::default().with_typescript(true).with_jsx(true),
        Some("jsx") => SourceType::default().with_jsx(true),
        Some("mjs") => SourceType::default().with_module(true),
        Some("cjs") => SourceType::default().with_module(false),
        _ => SourceType::default().with_jsx(true),
    }
}

/// Returns the raw text of the line containing `offset`, and the line
/// immediately before it, for the disable-comment guard.
pub fn line_and_previous(text: &str, offset: u32) -> (&str, Option<&str>) {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut acc = 0usize;
    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1; // account for the stripped '\n'
        if (offset as usize) < acc + len {
            let prev = if i > 0 { Some(lines[i - 1]) } else { None };
            return (line, prev);
        }
        acc += len;
    }
    (lines.last().copied().unwrap_or(""), None)
}
