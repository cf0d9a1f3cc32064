//! Ambient configuration layer.
//!
//! `Options` is the host-supplied-inputs bundle (`exclude_filter`,
//! `min_usages`, `allowed_value_kinds`, plus the CLI-only `target`/`output`
//! knobs). This module also resolves `dittory.config.{js,mjs,json}` and
//! applies the documented precedence: CLI flags > config file > defaults,
//! JS config preferred over JSON when both exist.

use std::fmt;
use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_ast::ast::{Expression, ObjectPropertyKind, PropertyKey, Statement};
use oxc_parser::Parser;
use oxc_span::SourceType;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::constancy::AllowedValueKinds;

/// Which declaration kinds a run analyzes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    Components,
    Functions,
}

impl Target {
    fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "all" => Ok(Target::All),
            "components" => Ok(Target::Components),
            "functions" => Ok(Target::Functions),
            other => Err(ConfigError::InvalidTarget(other.to_string())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Target::All => "all",
            Target::Components => "components",
            Target::Functions => "functions",
        })
    }
}

/// Report rendering mode (plain text; ANSI coloring is left to a host
/// layering on top of this crate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Simple,
    Verbose,
}

impl OutputFormat {
    fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "simple" => Ok(OutputFormat::Simple),
            "verbose" => Ok(OutputFormat::Verbose),
            other => Err(ConfigError::InvalidOutput(other.to_string())),
        }
    }
}

/// Configuration/validation errors: surfaced to the user, fatal at the CLI
/// boundary.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("malformed --min value: {0}")]
    InvalidMin(String),
    #[error("target directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("tsconfig not found: {}", .0.display())]
    MissingTsconfig(PathBuf),
    #[error("malformed config file {}: {1}", .0.display())]
    MalformedConfigFile(PathBuf, String),
    #[error("invalid --target value: {0} (expected all|components|functions)")]
    InvalidTarget(String),
    #[error("invalid --output value: {0} (expected simple|verbose)")]
    InvalidOutput(String),
    #[error("invalid --value-types value: {0}")]
    InvalidValueKinds(String),
}

/// Host-supplied inputs, resolved from CLI flags + config file + defaults
/// in that precedence order.
pub struct Options {
    pub exclude_filter: Box<dyn Fn(&Path) -> bool + Send + Sync>,
    pub min_usages: usize,
    pub allowed_value_kinds: AllowedValueKinds,
    pub target: Target,
    pub output: OutputFormat,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            exclude_filter: Box::new(default_exclude_filter()),
            min_usages: 2,
            allowed_value_kinds: AllowedValueKinds::All,
            target: Target::All,
            output: OutputFormat::Simple,
        }
    }
}

static TEST_OR_STORY_FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(test|spec|stories)\.(ts|tsx|js|jsx)$").expect("static regex is valid")
});

/// The default exclude filter: test/story filenames, or paths containing a
/// `__tests__`/`__stories__` path component. `Options::default`
/// is cheap to construct repeatedly (every `resolve_options` call builds
/// one), so the filename regex is compiled once behind a `Lazy` rather than
/// on every call.
pub fn default_exclude_filter() -> impl Fn(&Path) -> bool + Send + Sync {
    move |path: &Path| {
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| TEST_OR_STORY_FILENAME.is_match(n))
        {
            return true;
        }
        path.components().any(|c| {
            matches!(c.as_os_str().to_str(), Some("__tests__") | Some("__stories__"))
        })
    }
}

/// The subset of config-file fields this crate understands, shared by both
/// the JSON and JS loaders so CLI precedence logic treats them identically.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ConfigFileValues {
    pub min: Option<u64>,
    pub target: Option<String>,
    pub output: Option<String>,
    #[serde(rename = "valueTypes")]
    pub value_types: Option<String>,
}

/// Resolves `dittory.config.{js,mjs,json}` relative to `cwd`, preferring a
/// JS/MJS config over JSON when both are present. Returns `None` when no
/// config file exists — that is not an error.
pub fn load_config_file(cwd: &Path) -> Result<Option<ConfigFileValues>, ConfigError> {
    for name in ["dittory.config.js", "dittory.config.mjs"] {
        let path = cwd.join(name);
        if path.is_file() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::MalformedConfigFile(path.clone(), e.to_string()))?;
            return parse_js_config(&path, &text).map(Some);
        }
    }
    let json_path = cwd.join("dittory.config.json");
    if json_path.is_file() {
        let text = std::fs::read_to_string(&json_path)
            .map_err(|e| ConfigError::MalformedConfigFile(json_path.clone(), e.to_string()))?;
        let values: ConfigFileValues = serde_json::from_str(&text)
            .map_err(|e| ConfigError::MalformedConfigFile(json_path.clone(), e.to_string()))?;
        return Ok(Some(values));
    }
    Ok(None)
}

/// Parses `module.exports = { ... }` / `export default { ... }` as a
/// syntactic object literal using the same `oxc_allocator`/`oxc_parser`
/// pairing the core analyzer parses source files with: a config file is
/// structurally just one call site with known field names, so literal
/// extraction over its object expression is all that is needed — no JS
/// evaluation.
fn parse_js_config(path: &Path, text: &str) -> Result<ConfigFileValues, ConfigError> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(true);
    let parsed = Parser::new(&allocator, text, source_type).parse();
    if !parsed.errors.is_empty() {
        return Err(ConfigError::MalformedConfigFile(
            path.to_path_buf(),
            format!("{:?}", parsed.errors[0]),
        ));
    }

    let object = parsed
        .program
        .body
        .iter()
        .find_map(exported_object_literal)
        .ok_or_else(|| {
            ConfigError::MalformedConfigFile(
                path.to_path_buf(),
                "no `module.exports = {...}` or `export default {...}` object literal found".into(),
            )
        })?;

    let mut values = ConfigFileValues::default();
    for prop in &object.properties {
        let ObjectPropertyKind::ObjectProperty(p) = prop else { continue };
        let Some(name) = property_key_name(&p.key) else { continue };
        match name.as_str() {
            "min" => values.min = literal_number(&p.value),
            "target" => values.target = literal_string(&p.value),
            "output" => values.output = literal_string(&p.value),
            "valueTypes" => values.value_types = literal_string(&p.value),
            _ => {}
        }
    }
    Ok(values)
}

fn exported_object_literal<'a>(
    stmt: &'a Statement<'a>,
) -> Option<&'a oxc_ast::ast::ObjectExpression<'a>> {
    match stmt {
        Statement::ExpressionStatement(s) => match &s.expression {
            Expression::AssignmentExpression(assign) => match &assign.right {
                Expression::ObjectExpression(obj) => Some(obj),
                _ => None,
            },
            _ => None,
        },
        Statement::ExportDefaultDeclaration(exp) => match &exp.declaration {
            oxc_ast::ast::ExportDefaultDeclarationKind::ObjectExpression(obj) => Some(obj),
            _ => None,
        },
        _ => None,
    }
}

fn property_key_name(key: &PropertyKey) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(id.name.to_string()),
        PropertyKey::Expression(Expression::StringLiteral(s)) => Some(s.value.to_string()),
        _ => None,
    }
}

fn literal_string(expr: &Expression) -> Option<String> {
    match expr {
        Expression::StringLiteral(s) => Some(s.value.to_string()),
        _ => None,
    }
}

fn literal_number(expr: &Expression) -> Option<u64> {
    match expr {
        Expression::NumericLiteral(n) => Some(n.value as u64),
        _ => None,
    }
}

/// Merges config-file values under CLI flags (CLI flags > config file >
/// defaults). `cli_*` params are `None` when the corresponding flag was
/// not passed.
#[allow(clippy::too_many_arguments)]
pub fn resolve_options(
    file: Option<&ConfigFileValues>,
    cli_min: Option<u64>,
    cli_target: Option<&str>,
    cli_output: Option<&str>,
    cli_value_types: Option<&str>,
) -> Result<Options, ConfigError> {
    let mut options = Options::default();

    if let Some(min) = file.and_then(|f| f.min) {
        options.min_usages = min as usize;
    }
    if let Some(target) = file.and_then(|f| f.target.as_deref()) {
        options.target = Target::parse(target)?;
    }
    if let Some(output) = file.and_then(|f| f.output.as_deref()) {
        options.output = OutputFormat::parse(output)?;
    }
    if let Some(value_types) = file.and_then(|f| f.value_types.as_deref()) {
        options.allowed_value_kinds = parse_value_kinds(value_types)?;
    }

    if let Some(min) = cli_min {
        options.min_usages = min as usize;
    }
    if let Some(target) = cli_target {
        options.target = Target::parse(target)?;
    }
    if let Some(output) = cli_output {
        options.output = OutputFormat::parse(output)?;
    }
    if let Some(value_types) = cli_value_types {
        options.allowed_value_kinds = parse_value_kinds(value_types)?;
    }

    Ok(options)
}

fn parse_value_kinds(spec: &str) -> Result<AllowedValueKinds, ConfigError> {
    if spec == "all" {
        return Ok(AllowedValueKinds::All);
    }
    const KNOWN: &[&str] = &["boolean", "number", "string", "enum", "undefined"];
    let mut kinds = std::collections::HashSet::new();
    for part in spec.split(',') {
        let part = part.trim();
        match KNOWN.iter().find(|k| **k == part) {
            Some(k) => {
                kinds.insert(*k);
            }
            None => return Err(ConfigError::InvalidValueKinds(part.to_string())),
        }
    }
    Ok(AllowedValueKinds::subset(kinds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_exclude_filter_matches_test_and_story_filenames() {
        let f = default_exclude_filter();
        assert!(f(Path::new("src/Button.test.tsx")));
        assert!(f(Path::new("src/Button.stories.tsx")));
        assert!(!f(Path::new("src/Button.tsx")));
    }

    #[test]
    fn default_exclude_filter_matches_tests_directory_component() {
        let f = default_exclude_filter();
        assert!(f(Path::new("src/__tests__/Button.tsx")));
        assert!(f(Path::new("src/__stories__/Button.tsx")));
    }

    #[test]
    fn cli_overrides_config_file() {
        let file = ConfigFileValues {
            min: Some(3),
            target: Some("components".into()),
            output: None,
            value_types: None,
        };
        let options = resolve_options(Some(&file), Some(5), None, None, None).unwrap();
        assert_eq!(options.min_usages, 5);
        assert_eq!(options.target, Target::Components);
    }

    #[test]
    fn config_file_overrides_defaults_when_no_cli_flag() {
        let file = ConfigFileValues {
            min: Some(3),
            target: None,
            output: Some("verbose".into()),
            value_types: None,
        };
        let options = resolve_options(Some(&file), None, None, None, None).unwrap();
        assert_eq!(options.min_usages, 3);
        assert_eq!(options.output, OutputFormat::Verbose);
    }

    #[test]
    fn invalid_target_is_a_config_error() {
        let err = resolve_options(None, None, Some("bogus"), None, None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTarget(_)));
    }

    #[test]
    fn parses_js_config_object_literal() {
        let values = parse_js_config(
            Path::new("dittory.config.js"),
            "module.exports = { min: 3, target: \"functions\" };",
        )
        .unwrap();
        assert_eq!(values.min, Some(3));
        assert_eq!(values.target, Some("functions".to_string()));
    }

    #[test]
    fn parses_export_default_config_object_literal() {
        let values = parse_js_config(
            Path::new("dittory.config.mjs"),
            "export default { output: \"verbose\" };",
        )
        .unwrap();
        assert_eq!(values.output, Some("verbose".to_string()));
    }
}
