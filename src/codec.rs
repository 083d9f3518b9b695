//! Value codec: raw textual literals → canonical typed literals.
//!
//! Pure functions, shared by the parser (text → canonical) and the emitters
//! (canonical → profile syntax). Recursive types live here too: linked lists
//! canonicalize to their flat array encoding, binary trees to their
//! level-order array encoding, both arena-backed (index links, never
//! pointer graphs).

pub mod list;
pub mod tree;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::meta::{BaseType, SemanticType};

// ------------------------------- Literal ---------------------------------- //

/// Canonical literal. `Display` renders the canonical text: bare scalar
/// tokens, lowercase booleans, double-quoted strings, `[a,b,c]` arrays with
/// no spaces, `null` for absent values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Stored without the surrounding quotes; `Display` adds exactly one pair.
    Str(String),
    /// Verbatim token for scalar text the codec could not tighten
    /// (character literals, exotic numerics).
    Raw(String),
    Array(Vec<Literal>),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Literal::Str(s) => write!(f, "\"{s}\""),
            Literal::Raw(s) => write!(f, "{s}"),
            Literal::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl Literal {
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// Node values in link order, when this is a flat list encoding.
    pub fn as_list_values(&self) -> Option<Vec<i64>> {
        let Literal::Array(items) = self else {
            return None;
        };
        items
            .iter()
            .map(|item| match item {
                Literal::Int(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Level-order slots, when this is a tree encoding of integer nodes.
    pub fn as_tree_levels(&self) -> Option<Vec<Option<i64>>> {
        let Literal::Array(items) = self else {
            return None;
        };
        items
            .iter()
            .map(|item| match item {
                Literal::Int(n) => Some(Some(*n)),
                Literal::Null => Some(None),
                _ => None,
            })
            .collect()
    }
}

// ------------------------------ Normalize --------------------------------- //

static LIST_INTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+").unwrap());

/// Normalize one raw textual value against its declared type.
///
/// Total: anything unrecognizable degrades to a pass-through token or an
/// empty structure, never an error.
pub fn normalize(raw: &str, ty: &SemanticType) -> Literal {
    let raw = raw.trim();

    // Absent values collapse to the null sentinel regardless of type;
    // emitters pick the profile rendering.
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") || raw.eq_ignore_ascii_case("none") {
        return Literal::Null;
    }

    if ty.is_array() {
        return normalize_array(raw, ty);
    }

    match ty.base {
        BaseType::ListNode => normalize_list(raw),
        BaseType::TreeNode => normalize_tree(raw),
        BaseType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" => Literal::Bool(true),
            "false" => Literal::Bool(false),
            _ => Literal::Raw(raw.to_string()),
        },
        BaseType::Integer | BaseType::Long => match raw.parse::<i64>() {
            Ok(n) => Literal::Int(n),
            Err(_) => Literal::Raw(raw.to_string()),
        },
        BaseType::Double | BaseType::Float => match raw.parse::<f64>() {
            Ok(x) => Literal::Float(x),
            Err(_) => Literal::Raw(raw.to_string()),
        },
        BaseType::Character => {
            let inner = strip_quotes(raw, '\'').or_else(|| strip_quotes(raw, '"'));
            match inner {
                Some(c) => Literal::Raw(format!("'{c}'")),
                None if raw.chars().count() == 1 => Literal::Raw(format!("'{raw}'")),
                None => Literal::Raw(raw.to_string()),
            }
        }
        BaseType::String => match strip_quotes(raw, '"') {
            Some(inner) => Literal::Str(inner.to_string()),
            None => Literal::Str(raw.to_string()),
        },
    }
}

fn normalize_array(raw: &str, ty: &SemanticType) -> Literal {
    let elem = ty.elem();
    if let Some(lit) = parse_array(raw, elem.as_ref()) {
        return lit;
    }
    // Last resort: pick embedded integers out of the text.
    let nums: Vec<Literal> = LIST_INTS
        .find_iter(raw)
        .filter_map(|m| m.as_str().parse::<i64>().ok())
        .map(Literal::Int)
        .collect();
    if nums.is_empty() {
        tracing::debug!(raw, "array value did not parse, keeping verbatim");
        Literal::Raw(raw.to_string())
    } else {
        Literal::Array(nums)
    }
}

/// Flat array encoding for linked lists. Accepts a bracketed array or an
/// arrow chain (`1->2->3`); anything else is the empty list.
fn normalize_list(raw: &str) -> Literal {
    if raw.starts_with('[') && raw.ends_with(']') {
        let int_ty = SemanticType {
            base: BaseType::Integer,
            dims: 1,
        };
        let parsed = normalize_array(raw, &int_ty);
        if let Some(values) = parsed.as_list_values() {
            return encode_list(&values);
        }
        return parsed;
    }
    let values: Vec<i64> = LIST_INTS
        .find_iter(raw)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    encode_list(&values)
}

fn encode_list(values: &[i64]) -> Literal {
    let arena = list::decode(values);
    Literal::Array(list::encode(&arena).into_iter().map(Literal::Int).collect())
}

/// Level-order array encoding for binary trees. Accepts a bracketed array
/// with case-insensitive `null` markers; anything else is the empty tree.
fn normalize_tree(raw: &str) -> Literal {
    if !(raw.starts_with('[') && raw.ends_with(']')) {
        return Literal::Array(Vec::new());
    }
    let lowered = raw.replace("NULL", "null").replace("Null", "null");
    let slot_ty = SemanticType::scalar(BaseType::Integer);
    let Some(parsed) = parse_array(&lowered, Some(&slot_ty)) else {
        return Literal::Array(Vec::new());
    };
    if let Some(levels) = parsed.as_tree_levels() {
        // Round-trip through the arena: canonicalizes BFS placement and
        // strips the trailing null run.
        let arena = tree::decode(&levels);
        let slots = tree::encode(&arena);
        return Literal::Array(
            slots
                .into_iter()
                .map(|slot| match slot {
                    Some(v) => Literal::Int(v),
                    None => Literal::Null,
                })
                .collect(),
        );
    }
    // Non-integer payloads keep their parsed shape, minus trailing nulls.
    if let Literal::Array(mut items) = parsed {
        while items.last().is_some_and(Literal::is_null) {
            items.pop();
        }
        Literal::Array(items)
    } else {
        Literal::Array(Vec::new())
    }
}

// ------------------------------ Array text -------------------------------- //

// Recursion cap for the untyped manual fallback on pathological nesting.
const MAX_NESTING: usize = 32;

/// Parse a bracketed array: strict JSON first, then a bracket-balanced
/// manual split typed by `elem`.
fn parse_array(raw: &str, elem: Option<&SemanticType>) -> Option<Literal> {
    parse_array_at(raw, elem, 0)
}

fn parse_array_at(raw: &str, elem: Option<&SemanticType>, depth: usize) -> Option<Literal> {
    if depth > MAX_NESTING || !(raw.starts_with('[') && raw.ends_with(']')) {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) {
        if value.is_array() {
            return Some(from_json(&value));
        }
    }
    let inner = &raw[1..raw.len() - 1];
    let segments = split_balanced(inner);
    let items = segments
        .iter()
        .map(|seg| match elem {
            Some(ty) => normalize(seg, ty),
            None => infer_scalar_at(seg, depth + 1),
        })
        .collect();
    Some(Literal::Array(items))
}

fn from_json(value: &serde_json::Value) -> Literal {
    match value {
        serde_json::Value::Null => Literal::Null,
        serde_json::Value::Bool(b) => Literal::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Literal::Int(i),
            None => Literal::Float(n.as_f64().unwrap_or(0.0)),
        },
        serde_json::Value::String(s) => Literal::Str(s.clone()),
        serde_json::Value::Array(items) => Literal::Array(items.iter().map(from_json).collect()),
        serde_json::Value::Object(_) => Literal::Raw(value.to_string()),
    }
}

/// Best-effort typing for a token with no declared type.
pub fn infer_scalar(raw: &str) -> Literal {
    infer_scalar_at(raw, 0)
}

fn infer_scalar_at(raw: &str, depth: usize) -> Literal {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") || raw.eq_ignore_ascii_case("none") {
        return Literal::Null;
    }
    if raw.starts_with('[') && raw.ends_with(']') {
        if let Some(lit) = parse_array_at(raw, None, depth) {
            return lit;
        }
    }
    match raw {
        "true" => return Literal::Bool(true),
        "false" => return Literal::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Literal::Int(n);
    }
    if let Ok(x) = raw.parse::<f64>() {
        return Literal::Float(x);
    }
    if let Some(inner) = strip_quotes(raw, '"') {
        return Literal::Str(inner.to_string());
    }
    Literal::Raw(raw.to_string())
}

/// Split on top-level commas, respecting bracket nesting and quotes.
pub fn split_balanced(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth: i32 = 0;
    let mut in_str: Option<char> = None;
    let mut current = String::new();
    for ch in s.chars() {
        if let Some(q) = in_str {
            current.push(ch);
            if ch == q {
                in_str = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => {
                in_str = Some(ch);
                current.push(ch);
            }
            '[' | '(' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ']' | ')' | '}' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                let token = current.trim().to_string();
                if !token.is_empty() {
                    out.push(token);
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    let token = current.trim().to_string();
    if !token.is_empty() {
        out.push(token);
    }
    out
}

fn strip_quotes(raw: &str, quote: char) -> Option<&str> {
    let inner = raw.strip_prefix(quote)?.strip_suffix(quote)?;
    Some(inner)
}

// -------------------------------- Tests ----------------------------------- //

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ty(text: &str) -> SemanticType {
        text.parse().unwrap()
    }

    #[test]
    fn scalars_pass_through_typed() {
        assert_eq!(normalize("42", &ty("integer")), Literal::Int(42));
        assert_eq!(normalize("-7", &ty("long")), Literal::Int(-7));
        assert_eq!(normalize("TRUE", &ty("boolean")), Literal::Bool(true));
        assert_eq!(normalize("2.5", &ty("double")), Literal::Float(2.5));
    }

    #[test]
    fn absent_values_collapse_to_null() {
        for raw in ["", "null", "None", "NULL"] {
            assert_eq!(normalize(raw, &ty("integer")), Literal::Null);
            assert_eq!(normalize(raw, &ty("ListNode")), Literal::Null);
        }
    }

    #[test]
    fn strings_gain_exactly_one_quote_pair() {
        assert_eq!(normalize("abc", &ty("string")).to_string(), "\"abc\"");
        assert_eq!(normalize("\"abc\"", &ty("string")).to_string(), "\"abc\"");
    }

    #[test]
    fn characters_canonicalize_to_single_quotes() {
        assert_eq!(normalize("a", &ty("character")).to_string(), "'a'");
        assert_eq!(normalize("'a'", &ty("character")).to_string(), "'a'");
        assert_eq!(normalize("\"a\"", &ty("character")).to_string(), "'a'");
    }

    #[test]
    fn arrays_render_without_spaces() {
        let lit = normalize("[1, 2, 3]", &ty("integer[]"));
        assert_eq!(lit.to_string(), "[1,2,3]");
    }

    #[test]
    fn nested_arrays_split_on_balanced_commas() {
        let lit = normalize("[[1,2],[3,4]]", &ty("integer[][]"));
        assert_eq!(lit.to_string(), "[[1,2],[3,4]]");
    }

    #[test]
    fn malformed_array_falls_back_to_digit_extraction() {
        let lit = normalize("nums = 1, 2 and 3", &ty("integer[]"));
        assert_eq!(lit.to_string(), "[1,2,3]");
    }

    #[test]
    fn arrow_chain_becomes_flat_list_encoding() {
        let lit = normalize("1->2->3", &ty("ListNode"));
        assert_eq!(lit.to_string(), "[1,2,3]");
    }

    #[test]
    fn unparseable_list_degrades_to_empty() {
        assert_eq!(normalize("a linked list", &ty("ListNode")).to_string(), "[]");
    }

    #[test]
    fn tree_nulls_lowercase_and_trailing_run_strips() {
        let lit = normalize("[1,NULL,2,Null,null]", &ty("TreeNode"));
        assert_eq!(lit.to_string(), "[1,null,2]");
    }

    #[test]
    fn unbracketed_tree_degrades_to_empty() {
        assert_eq!(normalize("a tree", &ty("TreeNode")).to_string(), "[]");
    }

    #[test]
    fn split_balanced_respects_nesting_and_quotes() {
        let parts = split_balanced(r#"[1,2], "a,b", 3"#);
        assert_eq!(parts, vec!["[1,2]", "\"a,b\"", "3"]);
    }

    #[test]
    fn infer_scalar_orders_types() {
        assert_eq!(infer_scalar("true"), Literal::Bool(true));
        assert_eq!(infer_scalar("12"), Literal::Int(12));
        assert_eq!(infer_scalar("1.5"), Literal::Float(1.5));
        assert_eq!(infer_scalar("\"x\""), Literal::Str("x".into()));
        assert_eq!(infer_scalar("ident"), Literal::Raw("ident".into()));
    }
}
