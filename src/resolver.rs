//! The Parameter-Reference Resolver.
//!
//! Rewrites a `ParamRefArgValue` — "whatever value the enclosing function
//! received for this parameter at its own call sites" — into the concrete
//! value every one of those call sites agrees on, or leaves it as-is when
//! they disagree, the forwarding chain is unresolvable, or it cycles.

use std::collections::HashSet;

use crate::model::CallSiteMap;
use crate::value::ArgValue;

/// Non-`ParamRef` values pass through unchanged (the Usage Extractor calls
/// this on every usage value, not just the ones it already knows are
/// forwarded references).
fn resolve(value: &ArgValue, map: &CallSiteMap, visited: &HashSet<String>) -> Option<ArgValue> {
    let ArgValue::ParamRefArgValue {
        decl_file,
        enclosing_name,
        dotted_path,
        ..
    } = value
    else {
        return Some(value.clone());
    };

    let key = value.key();
    if visited.contains(&key) {
        return None; // cycle: caller treats this reference as unique-per-use-site
    }
    let mut visited = visited.clone();
    visited.insert(key);

    let decl_id = CallSiteMap::declaration_id(decl_file, enclosing_name);
    // Last segment for `props.x`-shaped paths (JSX/prop-typical); the whole
    // path for a plain function argument name, which never contains a dot.
    let arg_name = match dotted_path.rsplit_once('.') {
        Some((_, last)) => last,
        None => dotted_path.as_str(),
    };

    let args = map.args_for(&decl_id, arg_name)?;
    if args.is_empty() {
        return None;
    }

    let mut keys = HashSet::new();
    let mut representative = None;
    for arg in args {
        let resolved = resolve(&arg.value, map, &visited)?;
        keys.insert(resolved.key());
        representative = Some(resolved);
    }

    if keys.len() == 1 {
        representative
    } else {
        None
    }
}

/// The thin wrapper the Usage Extractor applies to every usage value
/// before packaging it.
pub fn resolve_or_self(value: &ArgValue, map: &CallSiteMap) -> ArgValue {
    resolve(value, map, &HashSet::new()).unwrap_or_else(|| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CallSiteArg;

    fn param_ref(enclosing: &str, path: &str) -> ArgValue {
        ArgValue::ParamRefArgValue {
            decl_file: "Child.tsx".into(),
            enclosing_name: enclosing.into(),
            dotted_path: path.into(),
            line: 1,
        }
    }

    #[test]
    fn resolves_when_all_forwarders_agree() {
        let mut map = CallSiteMap::new();
        let decl_id = CallSiteMap::declaration_id("Child.tsx", "Parent");
        map.record(
            &decl_id,
            CallSiteArg {
                name: "n".into(),
                value: ArgValue::StringLiteral("42".into()),
                caller_file: "App.tsx".into(),
                caller_line: 1,
            },
        );
        map.record(
            &decl_id,
            CallSiteArg {
                name: "n".into(),
                value: ArgValue::StringLiteral("42".into()),
                caller_file: "App.tsx".into(),
                caller_line: 2,
            },
        );

        let pr = param_ref("Parent", "p.n");
        assert_eq!(resolve_or_self(&pr, &map), ArgValue::StringLiteral("42".into()));
    }

    #[test]
    fn leaves_unresolved_when_forwarders_disagree() {
        let mut map = CallSiteMap::new();
        let decl_id = CallSiteMap::declaration_id("Child.tsx", "Parent");
        map.record(
            &decl_id,
            CallSiteArg {
                name: "n".into(),
                value: ArgValue::StringLiteral("42".into()),
                caller_file: "App.tsx".into(),
                caller_line: 1,
            },
        );
        map.record(
            &decl_id,
            CallSiteArg {
                name: "n".into(),
                value: ArgValue::StringLiteral("7".into()),
                caller_file: "App.tsx".into(),
                caller_line: 2,
            },
        );

        let pr = param_ref("Parent", "p.n");
        assert_eq!(resolve_or_self(&pr, &map), pr);
    }

    #[test]
    fn breaks_cycles_between_mutually_forwarding_components() {
        let mut map = CallSiteMap::new();
        let a_id = CallSiteMap::declaration_id("A.tsx", "A");
        let b_id = CallSiteMap::declaration_id("B.tsx", "B");
        // A forwards its `x` prop to B, and B forwards its `x` prop back to A.
        map.record(
            &a_id,
            CallSiteArg {
                name: "x".into(),
                value: ArgValue::ParamRefArgValue {
                    decl_file: "B.tsx".into(),
                    enclosing_name: "B".into(),
                    dotted_path: "p.x".into(),
                    line: 1,
                },
                caller_file: "B.tsx".into(),
                caller_line: 1,
            },
        );
        map.record(
            &b_id,
            CallSiteArg {
                name: "x".into(),
                value: ArgValue::ParamRefArgValue {
                    decl_file: "A.tsx".into(),
                    enclosing_name: "A".into(),
                    dotted_path: "p.x".into(),
                    line: 1,
                },
                caller_file: "A.tsx".into(),
                caller_line: 1,
            },
        );

        let pr = ArgValue::ParamRefArgValue {
            decl_file: "A.tsx".into(),
            enclosing_name: "A".into(),
            dotted_path: "p.x".into(),
            line: 1,
        };
        assert_eq!(resolve_or_self(&pr, &map), pr);
    }

    #[test]
    fn unresolvable_when_no_call_sites_recorded() {
        let map = CallSiteMap::new();
        let pr = param_ref("Parent", "p.n");
        assert_eq!(resolve_or_self(&pr, &map), pr);
    }
}
