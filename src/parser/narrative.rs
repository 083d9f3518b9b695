//! Narrative extraction: `Example N:` / `示例 N:` segments with
//! `Input:`/`输入：` → `Output:`/`输出：` spans.
//!
//! Both the English and Chinese marker families are recognized everywhere;
//! problem text in the wild mixes them freely.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:示例|Example)\s*(\d+)\s*[:：]").unwrap());
static SEGMENT_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:示例|Example)\s*\d+\s*[:：]|##\s").unwrap());
static INPUT_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?si)(?:输入|Input)\s*[:：](.*?)(?:输出|Output)\s*[:：]").unwrap());

static OUT_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?si)(?:输出|Output)\s*[:：]\s*(\[.*?\])").unwrap());
static OUT_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:输出|Output)\s*[:：]\s*"(.*?)""#).unwrap());
static OUT_BOOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:输出|Output)\s*[:：]\s*(true|false)").unwrap());
static OUT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:输出|Output)\s*[:：]\s*(-?\d+(?:\.\d+)?)").unwrap());
static OUT_GENERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:输出|Output)\s*[:：][ \t]*([^\n]+)").unwrap());

static ASSIGN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_]\w*\s*=\s*").unwrap());
static SCALAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""[^"]*"|\b(?i:true|false)\b|-?\d+(?:\.\d+)?"#).unwrap());

/// One `Example N:` span. `text` runs from just past the marker to the next
/// marker, a `## ` heading, or end of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub ordinal: usize,
    pub text: String,
}

pub fn segments(content: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    for caps in MARKER.captures_iter(content) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let Ok(ordinal) = caps[1].parse::<usize>() else {
            continue;
        };
        let start = whole.end();
        let end = SEGMENT_END
            .find(&content[start..])
            .map_or(content.len(), |m| start + m.start());
        out.push(Segment {
            ordinal,
            text: content[start..end].trim().to_string(),
        });
    }
    out
}

/// Extract accepted `(input literals, expected output)` pairs. A segment is
/// accepted only when its recognized literal count equals `n`.
pub fn extract_cases(content: &str, n: usize) -> Vec<(Vec<String>, Option<String>)> {
    let mut out = Vec::new();
    if n == 0 {
        return out;
    }
    for seg in segments(content) {
        let Some(input) = input_span(&seg.text) else {
            continue;
        };
        let Some(literals) = tokenize_inputs(&input, n) else {
            tracing::debug!(ordinal = seg.ordinal, "segment literal count != arity, skipped");
            continue;
        };
        out.push((literals, scan_output(&seg.text)));
    }
    out
}

/// Text between the input marker and the output marker, if both are present.
pub fn input_span(segment_text: &str) -> Option<String> {
    INPUT_SPAN
        .captures(segment_text)
        .map(|caps| caps[1].trim().to_string())
}

/// First literal after an output marker, tried as a bracketed array, then a
/// quoted string, then a boolean, then a signed number.
pub fn scan_output(text: &str) -> Option<String> {
    if let Some(caps) = OUT_ARRAY.captures(text) {
        return Some(caps[1].trim().to_string());
    }
    if let Some(caps) = OUT_STRING.captures(text) {
        return Some(format!("\"{}\"", &caps[1]));
    }
    if let Some(caps) = OUT_BOOL.captures(text) {
        return Some(caps[1].to_ascii_lowercase());
    }
    if let Some(caps) = OUT_NUMBER.captures(text) {
        return Some(caps[1].to_string());
    }
    None
}

/// Output scanned from the `Example k:` segment (1-based ordinal).
pub fn indexed_output(content: &str, ordinal: usize) -> Option<String> {
    segments(content)
        .into_iter()
        .find(|seg| seg.ordinal == ordinal)
        .and_then(|seg| scan_output(&seg.text))
}

/// Positional scan: pair the k-th output occurrence (0-based) with case k,
/// one literal shape at a time, generic trailing capture last.
pub fn positional_output(content: &str, index: usize) -> Option<String> {
    let arrays: Vec<String> = OUT_ARRAY
        .captures_iter(content)
        .map(|c| c[1].trim().to_string())
        .collect();
    if index < arrays.len() {
        return Some(arrays[index].clone());
    }
    let strings: Vec<String> = OUT_STRING
        .captures_iter(content)
        .map(|c| format!("\"{}\"", &c[1]))
        .collect();
    if index < strings.len() {
        return Some(strings[index].clone());
    }
    let bools: Vec<String> = OUT_BOOL
        .captures_iter(content)
        .map(|c| c[1].to_ascii_lowercase())
        .collect();
    if index < bools.len() {
        return Some(bools[index].clone());
    }
    let numbers: Vec<String> = OUT_NUMBER
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect();
    if index < numbers.len() {
        return Some(numbers[index].clone());
    }
    let general: Vec<String> = OUT_GENERAL
        .captures_iter(content)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if index < general.len() {
        return Some(general[index].clone());
    }
    None
}

// --------------------------- Input tokenizing ----------------------------- //

/// Tokenize an input span into exactly `n` literals, or refuse.
///
/// Tried in order: `name = value` assignment pairs, one literal per line,
/// bracket-matched arrays followed by trailing bare scalars.
pub fn tokenize_inputs(span: &str, n: usize) -> Option<Vec<String>> {
    if let Some(values) = assignment_values(span) {
        if values.len() == n {
            return Some(values);
        }
    }
    let lines: Vec<String> = span
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if !lines.is_empty() && lines.len() == n {
        return Some(lines);
    }
    let mixed = arrays_then_scalars(span);
    (!mixed.is_empty() && mixed.len() == n).then_some(mixed)
}

/// Values of `name = value` pairs, bracket-aware, stopping each value at a
/// top-level comma or line end.
fn assignment_values(span: &str) -> Option<Vec<String>> {
    let mut values = Vec::new();
    for m in ASSIGN.find_iter(span) {
        let rest = &span[m.end()..];
        let mut depth: i32 = 0;
        let mut end = rest.len();
        for (i, ch) in rest.char_indices() {
            match ch {
                '[' | '(' | '{' => depth += 1,
                ']' | ')' | '}' if depth > 0 => depth -= 1,
                ',' | '\n' if depth == 0 => {
                    end = i;
                    break;
                }
                _ => {}
            }
        }
        let value = rest[..end].trim();
        if !value.is_empty() {
            values.push(value.to_string());
        }
    }
    (!values.is_empty()).then_some(values)
}

/// Balanced bracket groups in order, then bare scalar tokens after the last
/// group.
fn arrays_then_scalars(span: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth: i32 = 0;
    let mut start = None;
    let mut last_end = 0;
    for (i, ch) in span.char_indices() {
        match ch {
            '[' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            ']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        out.push(span[s..=i].to_string());
                        last_end = i + 1;
                    }
                }
            }
            _ => {}
        }
    }
    for m in SCALAR.find_iter(&span[last_end..]) {
        out.push(m.as_str().to_string());
    }
    out
}

// -------------------------------- Tests ----------------------------------- //
