//! The Constancy Engine.
//!
//! Decides, per parameter path of one [`AnalyzedDeclaration`], whether
//! every accepted reference supplied the same value — the "all-or-nothing"
//! rule that makes an omitted optional prop (synthesized as `Undefined` by
//! `usage.rs`'s missing-property synthesis) count against constancy rather
//! than being silently skipped.

use std::collections::HashSet;

use crate::model::{AnalyzedDeclaration, ConstantParam};

/// The value-kind allowlist a run is configured with.
#[derive(Debug, Clone)]
pub enum AllowedValueKinds {
    All,
    Subset(HashSet<&'static str>),
}

impl AllowedValueKinds {
    pub fn subset(kinds: impl IntoIterator<Item = &'static str>) -> Self {
        AllowedValueKinds::Subset(kinds.into_iter().collect())
    }

    /// A value "matches" the allowlist if its kind is in the subset, or if
    /// the allowlist is `"all"`. Values with no classifiable kind (`this`,
    /// method calls, variable refs, unresolved param refs) only match
    /// `"all"`.
    fn matches(&self, value: &crate::value::ArgValue) -> bool {
        match self {
            AllowedValueKinds::All => true,
            AllowedValueKinds::Subset(kinds) => {
                value.kind_name().is_some_and(|k| kinds.contains(k))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConstancyOptions {
    pub min_usages: usize,
    pub allowed_value_kinds: AllowedValueKinds,
}

impl Default for ConstancyOptions {
    fn default() -> Self {
        Self {
            min_usages: 2,
            allowed_value_kinds: AllowedValueKinds::All,
        }
    }
}

/// Classifies constant parameters for a single declaration. Parameter paths
/// are visited in lexicographic order so the emitted `ConstantParam`s are
/// stably ordered within this declaration; `pipeline.rs` applies the outer
/// file/line ordering.
pub fn classify_constants(decl: &AnalyzedDeclaration, options: &ConstancyOptions) -> Vec<ConstantParam> {
    let total_call_count = decl.total_call_count();
    let mut paths: Vec<&String> = decl.usages_by_param.keys().collect();
    paths.sort();

    let mut out = Vec::new();
    for path in paths {
        let usages = &decl.usages_by_param[path];
        if usages.is_empty() {
            continue;
        }
        // Callback identity never counts, regardless of how many times the
        // same closure reference is passed.
        if usages.iter().any(|u| u.value.is_function()) {
            continue;
        }

        let keys: HashSet<String> = usages.iter().map(|u| u.value.key()).collect();
        let is_constant =
            usages.len() >= options.min_usages && keys.len() == 1 && usages.len() == total_call_count;
        if !is_constant {
            continue;
        }

        let value = usages[0].value.clone();
        // A property every call site omits (synthesized `Undefined` at each
        // one) is already absent everywhere — there is nothing to fix or
        // default, so it is not a reportable constant.
        if matches!(value, crate::value::ArgValue::UndefinedArgValue) {
            continue;
        }
        if !options.allowed_value_kinds.matches(&value) {
            continue;
        }

        out.push(ConstantParam {
            declaration_name: decl.name.clone(),
            declaration_file: decl.source_file.clone(),
            declaration_line: decl.source_line,
            param_name: path.clone(),
            value,
            usages: usages.clone(),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Definition, Usage};
    use crate::value::ArgValue;

    fn usage(value: ArgValue, line: usize) -> Usage {
        Usage {
            name: "level".into(),
            value,
            file: "c.ts".into(),
            line,
        }
    }

    fn decl_with(usages_by_param: Vec<(&str, Vec<Usage>)>) -> AnalyzedDeclaration {
        let mut decl = AnalyzedDeclaration::new(
            "log".into(),
            "f.ts".into(),
            1,
            vec![
                Definition { name: "msg".into(), index: 0, required: true },
                Definition { name: "level".into(), index: 1, required: true },
            ],
        );
        for (name, usages) in usages_by_param {
            for mut u in usages {
                u.name = name.to_string();
                decl.push_usage(u);
            }
        }
        decl
    }

    #[test]
    fn reports_value_supplied_identically_at_every_call_site() {
        let decl = decl_with(vec![
            ("msg", vec![
                usage(ArgValue::StringLiteral("a".into()), 1),
                usage(ArgValue::StringLiteral("b".into()), 2),
                usage(ArgValue::StringLiteral("c".into()), 3),
            ]),
            ("level", vec![
                usage(ArgValue::StringLiteral("INFO".into()), 1),
                usage(ArgValue::StringLiteral("INFO".into()), 2),
                usage(ArgValue::StringLiteral("INFO".into()), 3),
            ]),
        ]);
        let constants = classify_constants(&decl, &ConstancyOptions::default());
        assert_eq!(constants.len(), 1);
        assert_eq!(constants[0].param_name, "level");
        assert_eq!(constants[0].value, ArgValue::StringLiteral("INFO".into()));
    }

    #[test]
    fn omission_on_one_call_breaks_constancy() {
        let decl = decl_with(vec![
            ("p", vec![
                usage(ArgValue::StringLiteral("[I]".into()), 1),
                usage(ArgValue::StringLiteral("[I]".into()), 2),
                usage(ArgValue::StringLiteral("[I]".into()), 3),
            ]),
            ("s", vec![
                usage(ArgValue::StringLiteral("!".into()), 1),
                usage(ArgValue::UndefinedArgValue, 2),
                usage(ArgValue::StringLiteral("!".into()), 3),
            ]),
        ]);
        let constants = classify_constants(&decl, &ConstancyOptions::default());
        assert_eq!(constants.len(), 1);
        assert_eq!(constants[0].param_name, "p");
    }

    #[test]
    fn below_min_usages_is_not_reported() {
        let decl = decl_with(vec![(
            "level",
            vec![usage(ArgValue::StringLiteral("INFO".into()), 1)],
        )]);
        let constants = classify_constants(&decl, &ConstancyOptions::default());
        assert!(constants.is_empty());
    }

    #[test]
    fn function_values_never_coalesce() {
        let decl = decl_with(vec![(
            "cb",
            vec![
                usage(ArgValue::FunctionArgValue { file: "c.ts".into(), line: 1 }, 1),
                usage(ArgValue::FunctionArgValue { file: "c.ts".into(), line: 1 }, 2),
                usage(ArgValue::FunctionArgValue { file: "c.ts".into(), line: 1 }, 3),
            ],
        )]);
        let constants = classify_constants(&decl, &ConstancyOptions::default());
        assert!(constants.is_empty());
    }

    #[test]
    fn allowlist_rejects_non_matching_kind() {
        let decl = decl_with(vec![(
            "level",
            vec![
                usage(ArgValue::StringLiteral("INFO".into()), 1),
                usage(ArgValue::StringLiteral("INFO".into()), 2),
            ],
        )]);
        let options = ConstancyOptions {
            min_usages: 2,
            allowed_value_kinds: AllowedValueKinds::subset(["boolean", "number"]),
        };
        assert!(classify_constants(&decl, &options).is_empty());
    }

    #[test]
    fn monotonicity_in_min_usages() {
        let decl = decl_with(vec![(
            "level",
            vec![
                usage(ArgValue::StringLiteral("INFO".into()), 1),
                usage(ArgValue::StringLiteral("INFO".into()), 2),
            ],
        )]);
        let loose = ConstancyOptions { min_usages: 2, allowed_value_kinds: AllowedValueKinds::All };
        let strict = ConstancyOptions { min_usages: 3, allowed_value_kinds: AllowedValueKinds::All };
        assert_eq!(classify_constants(&decl, &loose).len(), 1);
        assert_eq!(classify_constants(&decl, &strict).len(), 0);
    }
}
