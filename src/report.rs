//! Report rendering — the CLI-only "simple"/"verbose" text output.
//! Deliberately no ANSI coloring, which sits outside the core's contract;
//! a host that wants color output layers it on top of
//! [`crate::model::AnalysisResult`] itself.

use crate::config::OutputFormat;
use crate::model::AnalysisResult;

pub fn render(result: &AnalysisResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Simple => render_simple(result),
        OutputFormat::Verbose => render_verbose(result),
    }
}

fn render_simple(result: &AnalysisResult) -> String {
    if result.constant_params.is_empty() {
        return "No constant parameters found.\n".to_string();
    }
    let mut out = String::new();
    for cp in &result.constant_params {
        out.push_str(&format!(
            "{}:{} {} — {} is always {}\n",
            cp.declaration_file,
            cp.declaration_line,
            cp.declaration_name,
            cp.param_name,
            cp.value.output(),
        ));
    }
    out
}

fn render_verbose(result: &AnalysisResult) -> String {
    if result.constant_params.is_empty() {
        return "No constant parameters found.\n".to_string();
    }
    let mut out = String::new();
    for cp in &result.constant_params {
        out.push_str(&format!(
            "{}:{} {} — {} is always {}\n",
            cp.declaration_file,
            cp.declaration_line,
            cp.declaration_name,
            cp.param_name,
            cp.value.output(),
        ));
        out.push_str(&format!("  {} call site(s):\n", cp.usages.len()));
        for usage in &cp.usages {
            out.push_str(&format!("    {}:{}\n", usage.file, usage.line));
        }
    }
    out.push_str(&format!(
        "\n{} constant parameter(s) across {} analyzed declaration(s).\n",
        result.constant_params.len(),
        result.declarations.len()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstantParam, Usage};
    use crate::value::ArgValue;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            constant_params: vec![ConstantParam {
                declaration_name: "log".into(),
                declaration_file: "f.ts".into(),
                declaration_line: 1,
                param_name: "level".into(),
                value: ArgValue::StringLiteral("INFO".into()),
                usages: vec![Usage {
                    name: "level".into(),
                    value: ArgValue::StringLiteral("INFO".into()),
                    file: "c.ts".into(),
                    line: 3,
                }],
            }],
            declarations: Vec::new(),
        }
    }

    #[test]
    fn simple_report_mentions_param_and_value() {
        let text = render(&sample(), OutputFormat::Simple);
        assert!(text.contains("level"));
        assert!(text.contains("INFO"));
    }

    #[test]
    fn verbose_report_lists_call_sites() {
        let text = render(&sample(), OutputFormat::Verbose);
        assert!(text.contains("c.ts:3"));
    }

    #[test]
    fn empty_result_reports_nothing_found() {
        let result = AnalysisResult::default();
        assert_eq!(render(&result, OutputFormat::Simple), "No constant parameters found.\n");
    }
}
