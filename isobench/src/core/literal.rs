//! Injection-safe JSON literals for generated scripts.
//!
//! Caller data is written as JSON, but every string character outside a small
//! safe set is emitted as a `\uXXXX` escape. The output never contains raw
//! quotes (other than string delimiters), backslashes (other than escape
//! prefixes), `$`, backticks, braces inside strings, or control characters, so
//! it can sit inside single-quoted literals of common script languages and still
//! decode to the original value.

use std::fmt::Write;

use serde_json::Value;

/// Render `value` as an escaped JSON literal.
pub fn to_literal(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Render any serializable value as an escaped JSON literal.
pub fn to_literal_from<T: serde::Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let value = serde_json::to_value(value)?;
    Ok(to_literal(&value))
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(text) => write_string(out, text),
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (idx, (key, item)) in map.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        if is_safe(ch) {
            out.push(ch);
            continue;
        }
        let mut units = [0u16; 2];
        for unit in ch.encode_utf16(&mut units) {
            // Writing to a String cannot fail.
            let _ = write!(out, "\\u{unit:04x}");
        }
    }
    out.push('"');
}

fn is_safe(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, ' ' | '_' | '-' | '.' | ',' | ':' | '/' | '@' | '+' | '=')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_render_as_json() {
        assert_eq!(to_literal(&json!(0)), "0");
        assert_eq!(to_literal(&json!(-3.5)), "-3.5");
        assert_eq!(to_literal(&json!(true)), "true");
        assert_eq!(to_literal(&json!(null)), "null");
        assert_eq!(to_literal(&json!("setUp")), "\"setUp\"");
    }

    #[test]
    fn collections_keep_order() {
        assert_eq!(to_literal(&json!(["setUp", "seed"])), "[\"setUp\",\"seed\"]");
        assert_eq!(
            to_literal(&json!({"a": 1, "b": [true]})),
            "{\"a\":1,\"b\":[true]}"
        );
    }

    #[test]
    fn hostile_characters_are_escaped() {
        let raw = "'; rm -rf / #\"$HOME`id`\\{{ x }}\n\t\u{0}";
        let literal = to_literal(&json!({ "k'ey": raw }));

        for forbidden in ['\'', '$', '`', '\n', '\t', '\0', ';', '#'] {
            assert!(!literal.contains(forbidden), "{forbidden:?} leaked into {literal}");
        }
        assert!(!literal.contains("{{"));
        assert!(!literal.contains("\\\\"));
        assert_eq!(literal.matches('"').count(), 4);

        let decoded: Value = serde_json::from_str(&literal).expect("still valid json");
        assert_eq!(decoded, json!({ "k'ey": raw }));
    }

    #[test]
    fn astral_characters_use_surrogate_pairs() {
        let literal = to_literal(&json!("bench \u{1F600}"));
        assert_eq!(literal, "\"bench \\ud83d\\ude00\"");
        let decoded: String = serde_json::from_str(&literal).expect("valid json");
        assert_eq!(decoded, "bench \u{1F600}");
    }

    #[test]
    fn serializable_values_are_accepted() {
        let hooks = vec!["setUp".to_string()];
        assert_eq!(to_literal_from(&hooks).expect("serialize"), "[\"setUp\"]");
    }
}
