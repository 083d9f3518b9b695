//! Delimiter heuristics: raw sample text → case strings → per-parameter
//! literals, plus arity repair.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::codec;

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"//.*").unwrap());
static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static BLANK_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static QUOTED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^".*"$"#).unwrap());
static BARE_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```\n(.*?)\n```").unwrap());

pub fn strip_comments(raw: &str) -> String {
    let pass = LINE_COMMENT.replace_all(raw, "");
    BLOCK_COMMENT.replace_all(&pass, "").into_owned()
}

/// Lines of the first fenced code block, grouped into chunks of exactly
/// `n` lines (leftover lines dropped). Each chunk is one case string.
pub fn fenced_block_cases(content: &str, n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let Some(caps) = FENCED_BLOCK.captures(content) else {
        return Vec::new();
    };
    let lines: Vec<&str> = caps[1]
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() < n {
        return Vec::new();
    }
    lines.chunks_exact(n).map(|chunk| chunk.join("\n")).collect()
}

/// Split raw sample text into case strings.
///
/// Tried in order: line grouping when the non-blank line count is a positive
/// multiple of `n`; the line list itself when every line is a complete
/// literal; the whole string as one JSON array; blank-line gaps.
pub fn split_cases(raw: &str, n: usize) -> Vec<String> {
    let cleaned = strip_comments(raw);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Vec::new();
    }

    let lines: Vec<&str> = cleaned
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if n > 0 && !lines.is_empty() && lines.len() % n == 0 {
        tracing::debug!(lines = lines.len(), arity = n, "grouping lines by arity");
        return lines.chunks_exact(n).map(|chunk| chunk.join("\n")).collect();
    }

    if !lines.is_empty() && lines.iter().all(|l| looks_like_literal(l)) {
        tracing::debug!(lines = lines.len(), "every line is a literal, flat pool");
        return lines.iter().map(|l| l.to_string()).collect();
    }

    if cleaned.starts_with('[') && cleaned.ends_with(']') {
        if let Ok(serde_json::Value::Array(items)) =
            serde_json::from_str::<serde_json::Value>(cleaned)
        {
            tracing::debug!(cases = items.len(), "whole string parsed as JSON array");
            return items.iter().map(value_text).collect();
        }
    }

    BLANK_GAP
        .split(cleaned)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn looks_like_literal(line: &str) -> bool {
    line.starts_with('[')
        || line.starts_with('{')
        || QUOTED_LINE.is_match(line)
        || BARE_INT.is_match(line)
}

/// Split one case string into per-parameter literals.
///
/// Tried in order: JSON array mapped element-per-parameter (whole array is
/// the single value when `n == 1`); line split at matching count; balanced
/// top-level comma split at matching count; the whole string when `n == 1`;
/// bracket-depth tokenization.
pub fn split_params(case: &str, n: usize) -> Vec<String> {
    let case = case.trim();

    if case.starts_with('[') && case.ends_with(']') {
        if let Ok(serde_json::Value::Array(items)) = serde_json::from_str::<serde_json::Value>(case)
        {
            if n == 1 {
                return vec![case.to_string()];
            }
            return items.iter().map(value_text).collect();
        }
    }

    let lines: Vec<&str> = case
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() == n {
        return lines.iter().map(|l| l.to_string()).collect();
    }

    let comma_split = codec::split_balanced(case);
    if comma_split.len() == n {
        return comma_split;
    }

    if n == 1 {
        return vec![case.to_string()];
    }

    tokenize_brackets(case)
}

/// Last-resort tokenizer: accumulate characters, flush on an unbracketed
/// comma, flush on closing an outer bracket.
fn tokenize_brackets(case: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    for ch in case.chars() {
        match ch {
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' => {
                depth -= 1;
                current.push(ch);
                if depth == 0 && !current.trim().is_empty() {
                    params.push(current.trim().to_string());
                    current.clear();
                }
            }
            ',' if depth == 0 => {
                if !current.trim().is_empty() {
                    params.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        params.push(current.trim().to_string());
    }
    params
}

/// Pad with the null sentinel or truncate so the literal count matches `n`.
pub fn repair_arity(mut literals: Vec<String>, n: usize) -> Vec<String> {
    if literals.len() < n {
        tracing::debug!(have = literals.len(), want = n, "padding with null sentinel");
        literals.resize(n, "null".to_string());
    } else if literals.len() > n {
        tracing::debug!(have = literals.len(), want = n, "truncating extra literals");
        literals.truncate(n);
    }
    literals
}

/// Textual form of a JSON element, matching the codec's canonical shapes:
/// strings quoted, arrays compact, `null` spelled out.
fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}

// -------------------------------- Tests ----------------------------------- //

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn comments_are_stripped() {
        let cleaned = strip_comments("1 // inline\n/* block\nspans */2");
        assert_eq!(cleaned, "1 \n2");
    }

    #[test]
    fn line_multiple_grouping() {
        let cases = split_cases("[1,2]\n3\n[4,5]\n6", 2);
        assert_eq!(cases, vec!["[1,2]\n3", "[4,5]\n6"]);
    }

    #[test]
    fn non_multiple_literal_lines_become_flat_pool() {
        let cases = split_cases("[1,2,3,4]\n[2,7,11,15]\n9", 2);
        assert_eq!(cases, vec!["[1,2,3,4]", "[2,7,11,15]", "9"]);
    }

    #[test]
    fn whole_string_json_array_splits_elements() {
        // Middle line is not a standalone literal, so the line pool refuses
        // and the whole string parses as one JSON array.
        let cases = split_cases("[1,\n2,\n[3]]", 2);
        assert_eq!(cases, vec!["1", "2", "[3]"]);
    }

    #[test]
    fn blank_line_split_is_last_resort() {
        let cases = split_cases("first case text\n\nsecond case text", 3);
        assert_eq!(cases, vec!["first case text", "second case text"]);
    }

    #[test]
    fn fenced_block_groups_by_arity() {
        let content = "intro\n```\n[1,2]\n3\n[4,5]\n6\n```\ntail";
        assert_eq!(fenced_block_cases(content, 2), vec!["[1,2]\n3", "[4,5]\n6"]);
        assert!(fenced_block_cases("no block here", 2).is_empty());
    }

    #[test]
    fn json_array_case_maps_elements_to_params() {
        let params = split_params("[[1,2,3],9]", 2);
        assert_eq!(params, vec!["[1,2,3]", "9"]);
    }

    #[test]
    fn single_param_keeps_whole_array() {
        let params = split_params("[1,2,3]", 1);
        assert_eq!(params, vec!["[1,2,3]"]);
    }

    #[test]
    fn comma_split_respects_brackets() {
        let params = split_params("[1,2], 3", 2);
        assert_eq!(params, vec!["[1,2]", "3"]);
    }

    #[test]
    fn bracket_tokenizer_flushes_on_outer_close() {
        let params = tokenize_brackets("[1,2][3,4] 5");
        assert_eq!(params, vec!["[1,2]", "[3,4]", "5"]);
    }

    #[test]
    fn repair_pads_and_truncates() {
        assert_eq!(repair_arity(vec!["1".into(), "2".into()], 3), vec!["1", "2", "null"]);
        assert_eq!(
            repair_arity(vec!["1".into(), "2".into(), "3".into(), "4".into()], 3),
            vec!["1", "2", "3"]
        );
    }
}
