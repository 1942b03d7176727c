/// Embedded JSON pretty-printing
///
/// Applications commonly log one JSON object per write, sometimes behind a
/// plain-text preamble (`INFO 12:00:01 {"user":"bob"}`). The span from the
/// first `{` to the last `}` is re-rendered with 4-space indentation when it
/// is exactly one valid JSON value. Detection is purely positional: a value
/// split across two writes is never seen as a whole, and anything that does
/// not parse is passed through untouched.
///
/// The re-rendering is done on the original tokens, so number literals
/// (`12345678901234567890`, `1.50`) and key order survive byte for byte.

use std::borrow::Cow;

/// Spans larger than this are left alone (1MB, same as the line limit).
pub const MAX_JSON_SPAN: usize = 1024 * 1024;

const INDENT: &[u8] = b"    ";

/// Pretty-print the embedded JSON value in `chunk`, if there is one.
///
/// Returns Cow::Borrowed if nothing was rewritten (Zero Allocation),
/// or Cow::Owned with the span replaced.
pub fn indent_embedded(chunk: &[u8]) -> Cow<'_, [u8]> {
    let Some((start, end)) = json_span(chunk) else {
        return Cow::Borrowed(chunk);
    };

    let span = &chunk[start..=end];
    if span.len() > MAX_JSON_SPAN {
        return Cow::Borrowed(chunk);
    }
    if serde_json::from_slice::<serde::de::IgnoredAny>(span).is_err() {
        return Cow::Borrowed(chunk);
    }

    let mut out = Vec::with_capacity(chunk.len() * 2);
    out.extend_from_slice(&chunk[..start]);
    reindent(span, &mut out);
    out.extend_from_slice(&chunk[end + 1..]);
    Cow::Owned(out)
}

/// Positions of the first `{` and the last `}`, if the former precedes the latter.
fn json_span(chunk: &[u8]) -> Option<(usize, usize)> {
    let start = chunk.iter().position(|&b| b == b'{')?;
    let end = chunk.iter().rposition(|&b| b == b'}')?;
    (end > start).then_some((start, end))
}

/// Re-emit already validated JSON with one value per line.
fn reindent(json: &[u8], out: &mut Vec<u8>) {
    let mut depth = 0usize;
    let mut i = 0;

    while i < json.len() {
        let b = json[i];
        match b {
            b'"' => {
                let end = string_end(json, i);
                out.extend_from_slice(&json[i..end]);
                i = end;
                continue;
            }
            b'{' | b'[' => {
                out.push(b);
                let close = if b == b'{' { b'}' } else { b']' };
                let next = skip_whitespace(json, i + 1);
                if json.get(next) == Some(&close) {
                    // Empty container stays on one line: {} / []
                    out.push(close);
                    i = next + 1;
                    continue;
                }
                depth += 1;
                newline(out, depth);
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                newline(out, depth);
                out.push(b);
            }
            b',' => {
                out.push(b);
                newline(out, depth);
            }
            b':' => out.extend_from_slice(b": "),
            b' ' | b'\t' | b'\n' | b'\r' => {}
            _ => out.push(b),
        }
        i += 1;
    }
}

/// Index one past the closing quote of the string starting at `start`.
fn string_end(json: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < json.len() {
        match json[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    json.len()
}

fn skip_whitespace(json: &[u8], mut i: usize) -> usize {
    while i < json.len() && matches!(json[i], b' ' | b'\t' | b'\n' | b'\r') {
        i += 1;
    }
    i
}

fn newline(out: &mut Vec<u8>, depth: usize) {
    out.push(b'\n');
    for _ in 0..depth {
        out.extend_from_slice(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn pretty(input: &str) -> String {
        String::from_utf8(indent_embedded(input.as_bytes()).into_owned()).unwrap()
    }

    #[test]
    fn test_simple_object() {
        assert_eq!(
            pretty(r#"{"level":"info","n":1}"#),
            "{\n    \"level\": \"info\",\n    \"n\": 1\n}"
        );
    }

    #[test]
    fn test_preamble_and_trailer_are_kept() {
        assert_eq!(
            pretty("INFO request {\"path\":\"/\"} done\n"),
            "INFO request {\n    \"path\": \"/\"\n} done\n"
        );
    }

    #[test]
    fn test_nested_values() {
        let input = r#"{"a":{"b":[1,2]},"c":[],"d":{}}"#;
        let expected = "{\n    \"a\": {\n        \"b\": [\n            1,\n            2\n        ]\n    },\n    \"c\": [],\n    \"d\": {}\n}";
        assert_eq!(pretty(input), expected);
    }

    #[test]
    fn test_input_whitespace_is_normalised() {
        assert_eq!(
            pretty("{ \"a\" :\t1 ,\n \"b\" : [ ] }"),
            "{\n    \"a\": 1,\n    \"b\": []\n}"
        );
    }

    #[test]
    fn test_strings_are_copied_verbatim() {
        let input = r#"{"msg":"a {b}, c: [d] \"e\" \\"}"#;
        let expected = "{\n    \"msg\": \"a {b}, c: [d] \\\"e\\\" \\\\\"\n}";
        assert_eq!(pretty(input), expected);
    }

    #[test]
    fn test_large_integers_keep_their_digits() {
        let out = pretty(r#"{"id":123456789012345678901234567890,"ratio":1.50,"exp":1e400}"#);
        assert!(out.contains("123456789012345678901234567890"), "{}", out);
        assert!(out.contains("1.50"), "{}", out);
        assert!(out.contains("1e400"), "{}", out);
    }

    #[test]
    fn test_key_order_preserved() {
        let out = pretty(r#"{"z":1,"a":2}"#);
        assert!(out.find("\"z\"").unwrap() < out.find("\"a\"").unwrap());
    }

    #[test]
    fn test_no_braces_is_borrowed() {
        let input = b"plain text line\n";
        assert!(matches!(indent_embedded(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_reversed_braces_is_borrowed() {
        let input = b"} not json {";
        assert!(matches!(indent_embedded(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_invalid_json_is_untouched() {
        for input in ["{not json}", "{\"a\":}", "{\"a\":1} and {\"b\":2}", "{'single':1}"] {
            assert_eq!(pretty(input), input, "{:?} should pass through", input);
        }
    }

    #[test]
    fn test_oversized_span_is_untouched() {
        let big = format!("{{\"blob\":\"{}\"}}", "x".repeat(MAX_JSON_SPAN));
        assert!(matches!(indent_embedded(big.as_bytes()), Cow::Borrowed(_)));
    }

    #[test]
    fn test_round_trip_values_equal() {
        let inputs = [
            r#"{"level":"info","count":3,"ok":true,"tags":["a","b"],"nested":{"x":null}}"#,
            r#"{"unicode":"héllo é","neg":-7,"empty":""}"#,
            r#"{"deep":{"deeper":{"deepest":[{"k":1},{"k":2}]}}}"#,
        ];
        for input in inputs {
            let original: Value = serde_json::from_str(input).unwrap();
            let reparsed: Value = serde_json::from_str(&pretty(input)).unwrap();
            assert_eq!(original, reparsed, "round trip of {}", input);
        }
    }
}
