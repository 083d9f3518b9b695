//! Test case parser: ordered fallback chain over free-form example text.
//!
//! Strategies are pure functions tried in priority order; the first one that
//! yields at least one accepted case wins. Total at the boundary: any input
//! produces a (possibly empty) case list, never an error.

pub mod narrative;
pub mod split;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::codec::{self, Literal};
use crate::meta::{MethodMeta, Param};

static ARROW_RESULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"->\s*(\S.*?)\s*(?://|\n|$)").unwrap());

/// One parameter bound to its canonical value.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub param: Param,
    pub value: Literal,
}

/// One fully typed, arity-correct case. `index` is the 0-based return
/// position; emission order must equal parse order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCase {
    pub index: usize,
    pub params: Vec<Binding>,
    pub expected: Option<String>,
}

/// Parse free-form example text into typed cases.
///
/// `narrative_text`, when given, is the full problem description (a superset
/// of `raw`); example segments and expected outputs are scanned there.
pub fn parse(raw: &str, meta: &MethodMeta, narrative_text: Option<&str>) -> Vec<ParsedCase> {
    let n = meta.param_count();
    if raw.trim().is_empty() || n == 0 {
        return Vec::new();
    }
    let content = narrative_text.unwrap_or(raw);

    let segment_cases = narrative::extract_cases(content, n);
    if !segment_cases.is_empty() {
        let mut out = Vec::new();
        for (literals, expected) in segment_cases {
            let Some(bindings) = type_bindings(&literals, &meta.params) else {
                continue;
            };
            out.push(ParsedCase {
                index: out.len(),
                params: bindings,
                expected,
            });
        }
        if !out.is_empty() {
            tracing::debug!(cases = out.len(), "narrative extraction produced the cases");
            return out;
        }
    }

    let fenced = split::fenced_block_cases(content, n);
    if !fenced.is_empty() {
        let out = cases_from_strings(&fenced, meta, content);
        if !out.is_empty() {
            tracing::debug!(cases = out.len(), "fenced block produced the cases");
            return out;
        }
    }

    let strings = split::split_cases(raw, n);
    cases_from_strings(&strings, meta, content)
}

fn cases_from_strings(case_strings: &[String], meta: &MethodMeta, content: &str) -> Vec<ParsedCase> {
    let n = meta.param_count();
    let mut out = Vec::new();
    for case_text in case_strings {
        let literals = split::split_params(case_text, n);
        if literals.is_empty() {
            tracing::debug!(case_text, "no parameters recognized, case dropped");
            continue;
        }
        let literals = split::repair_arity(literals, n);
        if literals.len() != n {
            continue;
        }
        let Some(bindings) = type_bindings(&literals, &meta.params) else {
            continue;
        };
        let index = out.len();
        let expected = recover_expected(case_text, index, content);
        out.push(ParsedCase {
            index,
            params: bindings,
            expected,
        });
    }
    out
}

/// Normalize each literal against its declared type. A case whose
/// non-nullable parameter resolved to the null sentinel is refused.
fn type_bindings(literals: &[String], params: &[Param]) -> Option<Vec<Binding>> {
    let bindings: Vec<Binding> = params
        .iter()
        .zip(literals)
        .map(|(param, raw)| Binding {
            param: param.clone(),
            value: codec::normalize(raw, &param.ty),
        })
        .collect();
    if let Some(bad) = bindings
        .iter()
        .find(|b| !b.param.nullable && b.value.is_null())
    {
        tracing::debug!(param = %bad.param.name, "required parameter is null, case dropped");
        return None;
    }
    Some(bindings)
}

/// Best-effort expected output for a non-narrative case: arrow notation in
/// the case text, then the `Example k:` segment, then positional scans.
fn recover_expected(case_text: &str, index: usize, content: &str) -> Option<String> {
    if let Some(caps) = ARROW_RESULT.captures(case_text) {
        return Some(caps[1].trim().to_string());
    }
    narrative::indexed_output(content, index + 1)
        .or_else(|| narrative::positional_output(content, index))
}

// -------------------------------- Tests ----------------------------------- //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::MethodMeta;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn meta(json: &str) -> MethodMeta {
        MethodMeta::from_json_str(json).unwrap()
    }

    fn two_param_meta() -> MethodMeta {
        meta(
            r#"{"params": [
                {"name": "nums", "type": "integer[]"},
                {"name": "target", "type": "integer"}
            ]}"#,
        )
    }

    #[test]
    fn narrative_segment_wins_the_chain() {
        let narrative = "示例 1：\n输入：nums = [1,2,3], k = 2\n输出：3\n";
        let meta = meta(
            r#"{"params": [
                {"name": "nums", "type": "integer[]"},
                {"name": "k", "type": "integer"}
            ]}"#,
        );
        let cases = parse("ignored raw", &meta, Some(narrative));
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].index, 0);
        assert_eq!(cases[0].params[0].value.to_string(), "[1,2,3]");
        assert_eq!(cases[0].params[1].value, Literal::Int(2));
        assert_eq!(cases[0].expected.as_deref(), Some("3"));
    }

    #[test]
    fn flat_pool_exercises_repair_and_drop() {
        // Three literal lines against two parameters: not a clean multiple,
        // so each line becomes a candidate case. The bare "9" pads to
        // (9, null) and is dropped for its required second parameter.
        let cases = parse("[1,2,3,4]\n[2,7,11,15]\n9", &two_param_meta(), None);
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].index, 0);
        assert_eq!(cases[1].index, 1);
        for case in &cases {
            assert_eq!(case.params.len(), 2);
            assert_eq!(case.params[0].param.name, "nums");
            assert_eq!(case.params[1].param.name, "target");
        }
    }

    #[test]
    fn grouped_lines_type_cleanly() {
        let cases = parse("[2,7,11,15]\n9", &two_param_meta(), None);
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].params[0].value.to_string(), "[2,7,11,15]");
        assert_eq!(cases[0].params[1].value, Literal::Int(9));
    }

    #[test]
    fn fenced_block_beats_delimiter_heuristics() {
        let raw = "```\n[1,2]\n3\n[4,5]\n6\n```";
        let cases = parse(raw, &two_param_meta(), None);
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[1].params[0].value.to_string(), "[4,5]");
        assert_eq!(cases[1].params[1].value, Literal::Int(6));
    }

    #[test]
    fn arrow_notation_recovers_expected() {
        let cases = parse("[2,7,11,15]\n9 -> 17", &two_param_meta(), None);
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].expected.as_deref(), Some("17"));
    }

    #[test]
    fn positional_outputs_pair_by_case_index() {
        let narrative = "输出：5\n输出：7\n```\n[1,2]\n3\n[4,5]\n6\n```";
        let cases = parse("unused", &two_param_meta(), Some(narrative));
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].expected.as_deref(), Some("5"));
        assert_eq!(cases[1].expected.as_deref(), Some("7"));
    }

    #[test]
    fn empty_inputs_yield_no_cases() {
        assert!(parse("", &two_param_meta(), None).is_empty());
        assert!(parse("   \n  ", &two_param_meta(), None).is_empty());
        let no_params = meta(r#"{"params": []}"#);
        assert!(parse("[1,2]\n3", &no_params, None).is_empty());
    }

    #[test]
    fn nullable_parameter_survives_padding() {
        let meta = meta(
            r#"{"params": [
                {"name": "nums", "type": "integer[]"},
                {"name": "target", "type": "integer", "nullable": true}
            ]}"#,
        );
        // Blank-line split is the only strategy left; the first case pads
        // its missing target with null.
        let cases = parse("nums: [1,2,3]\n\n[4,5,6]\n7", &meta, None);
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].params[0].value.to_string(), "[1,2,3]");
        assert_eq!(cases[0].params[1].value, Literal::Null);
        assert_eq!(cases[1].params[1].value, Literal::Int(7));
    }

    proptest! {
        #[test]
        fn arity_invariant_and_idempotence(raw in any::<String>()) {
            let meta = two_param_meta();
            let first = parse(&raw, &meta, None);
            for (i, case) in first.iter().enumerate() {
                prop_assert_eq!(case.index, i);
                prop_assert_eq!(case.params.len(), 2);
                prop_assert_eq!(&case.params[0].param.name, "nums");
                prop_assert_eq!(&case.params[1].param.name, "target");
            }
            prop_assert_eq!(parse(&raw, &meta, None), first);
        }
    }
}
