//! Incremental JSON repair for streamed diagram code
//!
//! Model output is appended to a buffer one delta at a time, so the text
//! handed to this module is usually incomplete and occasionally
//! malformed in two recurring ways: wrapped in a markdown code fence, or
//! containing literal double quotes inside JSON string values. Repair is
//! best-effort and silent; text that cannot yet be parsed simply yields
//! no elements and is retried on the next increment.
//!
//! Two independent passes:
//! 1. fence stripping, textual and unconditional;
//! 2. quote escaping, only when the fence-stripped text fails to parse
//!    verbatim (already-valid JSON is never touched, which also makes
//!    repeated repair idempotent).

use regex::Regex;
use serde_json::Value;

/// Strip a single leading markdown fence opener (optionally tagged
/// `json`, `javascript`, or `js`, case-insensitive) and a single
/// trailing fence closer. Textual, not JSON-aware.
pub fn strip_code_fences(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }

    let leading = Regex::new(r"(?i)^```(?:json|javascript|js)?\s*\n?").unwrap();
    let trailing = Regex::new(r"\n?```\s*$").unwrap();

    let stripped = leading.replace(trimmed, "");
    let stripped = trailing.replace(&stripped, "");
    stripped.trim().to_string()
}

/// Escape literal double quotes inside JSON string values.
///
/// Character scan with two flags: inside-string and escape-pending.
/// A quote met while inside a string closes it only when the next
/// significant character is structural (`:`, `,`, `}`, `]`) or the input
/// ends; otherwise it is an unescaped quote in the string's content and
/// is rewritten as `\"`. Backslash-prefixed characters pass through
/// verbatim, so already-escaped quotes are never double-escaped.
pub fn escape_stray_quotes(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &c) in chars.iter().enumerate() {
        if escape_next {
            result.push(c);
            escape_next = false;
            continue;
        }

        if c == '\\' {
            result.push(c);
            escape_next = true;
            continue;
        }

        if c == '"' {
            if !in_string {
                in_string = true;
                result.push(c);
                continue;
            }

            let next_significant = chars[i + 1..]
                .iter()
                .copied()
                .find(|ch| !ch.is_whitespace());

            match next_significant {
                None | Some(':') | Some(',') | Some('}') | Some(']') => {
                    in_string = false;
                    result.push(c);
                }
                Some(_) => result.push_str("\\\""),
            }
            continue;
        }

        result.push(c);
    }

    result
}

/// Run the full repair pipeline over possibly-incomplete text.
///
/// Empty input is returned unchanged; text that already parses after
/// fence stripping skips quote repair entirely.
pub fn repair(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let stripped = strip_code_fences(input);
    if serde_json::from_str::<Value>(&stripped).is_ok() {
        return stripped;
    }

    escape_stray_quotes(&stripped)
}

/// Locate the candidate top-level array: first `[` through last `]`,
/// greedy.
pub fn extract_array(input: &str) -> Option<&str> {
    let start = input.find('[')?;
    let end = input.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&input[start..=end])
}

/// Materialize the diagram element list from repaired text.
///
/// Returns `None` whenever a complete, valid top-level array is not yet
/// present; this is not an error, only "not ready".
pub fn parse_elements(code: &str) -> Option<Vec<Value>> {
    let cleaned = code.trim();
    let candidate = extract_array(cleaned)?;

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Array(items)) => Some(items),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Element list not yet parseable: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("```json\n[1,2]\n```", "[1,2]"; "json tag")]
    #[test_case("```javascript\n[1,2]\n```", "[1,2]"; "javascript tag")]
    #[test_case("```js\n[1,2]\n```", "[1,2]"; "js tag")]
    #[test_case("```\n[1,2]\n```", "[1,2]"; "untagged")]
    #[test_case("```JSON\n[1,2]\n```", "[1,2]"; "uppercase tag")]
    #[test_case("  ```json\n[1,2]\n```  ", "[1,2]"; "surrounding whitespace")]
    #[test_case("[1,2]", "[1,2]"; "no fence")]
    fn strips_fences(input: &str, expected: &str) {
        assert_eq!(strip_code_fences(input), expected);
    }

    #[test]
    fn strips_at_most_one_fence_pair() {
        // Only the outermost pair goes; inner backticks are content.
        let input = "```json\n[\"``` inline\"]\n```";
        assert_eq!(strip_code_fences(input), "[\"``` inline\"]");
    }

    #[test]
    fn quote_repair_escapes_inner_quotes() {
        let input = r#"{"text": "He said "hi" today"}"#;
        let repaired = escape_stray_quotes(input);
        assert_eq!(repaired, r#"{"text": "He said \"hi\" today"}"#);
        assert!(serde_json::from_str::<Value>(&repaired).is_ok());
    }

    #[test]
    fn quote_repair_leaves_valid_json_alone() {
        let cases = [
            r#"{"a": "plain"}"#,
            r#"{"a": "already \"escaped\""}"#,
            r#"[{"a": 1}, {"b": "x, y"}]"#,
            r#"{"path": "C:\\Users\\x"}"#,
        ];
        for case in cases {
            assert_eq!(escape_stray_quotes(case), case);
        }
    }

    #[test]
    fn escaped_backslash_before_quote_is_handled() {
        // The backslash escapes itself; the following quote is a real
        // string terminator.
        let input = r#"{"a": "trailing slash\\", "b": 1}"#;
        assert_eq!(escape_stray_quotes(input), input);
    }

    #[test]
    fn whitespace_before_structural_punctuation_closes_the_string() {
        let input = "{\"a\": \"value\"  ,  \"b\": \"other\"   }";
        assert_eq!(escape_stray_quotes(input), input);
    }

    #[test]
    fn quote_at_end_of_input_closes_the_string() {
        let input = r#"{"a": "unterminated"#;
        assert_eq!(escape_stray_quotes(input), input);
    }

    #[test]
    fn repair_is_noop_on_valid_json() {
        let input = r#"[{"type": "rectangle", "x": 1}]"#;
        assert_eq!(repair(input), input);
    }

    #[test]
    fn repair_is_idempotent() {
        let inputs = [
            r#"{"text": "He said "hi" today"}"#,
            "```json\n[{\"label\": \"a \"b\" c\"}]\n```",
            r#"[1, 2, 3]"#,
            "",
        ];
        for input in inputs {
            let once = repair(input);
            let twice = repair(&once);
            assert_eq!(once, twice, "repair not idempotent for {:?}", input);
        }
    }

    #[test]
    fn empty_input_is_unchanged() {
        assert_eq!(repair(""), "");
        assert_eq!(strip_code_fences(""), "");
        assert_eq!(escape_stray_quotes(""), "");
    }

    #[test]
    fn extract_array_takes_greedy_span() {
        assert_eq!(
            extract_array("prefix [1, [2], 3] suffix"),
            Some("[1, [2], 3]")
        );
        assert_eq!(extract_array("no array here"), None);
        assert_eq!(extract_array("] reversed ["), None);
    }

    #[test]
    fn parse_elements_requires_a_complete_array() {
        assert!(parse_elements(r#"[{"type": "rectangle"}"#).is_none());
        assert!(parse_elements(r#"{"type": "rectangle"}"#).is_none());

        let elements = parse_elements(r#"text before [{"type": "rectangle"}] after"#).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0]["type"], "rectangle");
    }

    #[test]
    fn full_pipeline_on_fenced_quoted_output() {
        let streamed = "```json\n[{\"type\": \"text\", \"text\": \"say \"hello\"\"}]\n```";
        let repaired = repair(streamed);
        let elements = parse_elements(&repaired).unwrap();
        assert_eq!(elements[0]["text"], "say \"hello\"");
    }
}
