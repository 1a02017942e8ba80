//! Canonical record encoding
//!
//! Two deterministic renderings of a `serde_json::Value`, both with object
//! keys sorted by UTF-8 byte order whatever the map's own ordering:
//!
//!   - [`encode`]: the literal form that gets hashed,
//!     `{'amount': 5, 'owner_id': 'matt'}`. Strings single-quoted with `\`
//!     and `'` escaped, `": "` and `", "` separators, `None`/`True`/`False`
//!     for null and booleans. `{}` hashes to `44136fa3...` and
//!     `{'name': 'matt'}` to `9ea24fe0...`.
//!   - [`encode_json`]: compact JSON, the form written to a `ChainStore` and
//!     parsed back by `Block::deserialize`.
//!
//! Numbers keep serde_json's rendering in both forms, so `5` stays `5` and
//! `0.9` stays `0.9`.

use serde_json::Value;

#[derive(Clone, Copy)]
enum Style {
    Literal,
    Json,
}

/// Canonical bytes for `record`; the input to every hash.
pub fn encode(record: &Value) -> Vec<u8> {
    let mut out = String::new();
    write_value(record, Style::Literal, &mut out);
    out.into_bytes()
}

/// Canonical compact JSON for `record`.
pub fn encode_json(record: &Value) -> String {
    let mut out = String::new();
    write_value(record, Style::Json, &mut out);
    out
}

fn write_value(value: &Value, style: Style, out: &mut String) {
    let (key_sep, item_sep) = match style {
        Style::Literal => (": ", ", "),
        Style::Json => (":", ","),
    };

    match value {
        Value::Object(map) => {
            // Independent of serde_json's `preserve_order` feature
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            out.push('{');
            for (i, (key, child)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(item_sep);
                }
                write_str(key, style, out);
                out.push_str(key_sep);
                write_value(child, style, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, child) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(item_sep);
                }
                write_value(child, style, out);
            }
            out.push(']');
        }
        Value::String(s) => write_str(s, style, out),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(match (style, b) {
            (Style::Literal, true) => "True",
            (Style::Literal, false) => "False",
            (Style::Json, true) => "true",
            (Style::Json, false) => "false",
        }),
        Value::Null => out.push_str(match style {
            Style::Literal => "None",
            Style::Json => "null",
        }),
    }
}

fn write_str(s: &str, style: Style, out: &mut String) {
    match style {
        Style::Json => out.push_str(&Value::String(s.to_string()).to_string()),
        Style::Literal => {
            out.push('\'');
            for c in s.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '\'' => out.push_str("\\'"),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
                    c => out.push(c),
                }
            }
            out.push('\'');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn literal(record: &Value) -> String {
        String::from_utf8(encode(record)).unwrap()
    }

    #[test]
    fn test_empty_record() {
        assert_eq!(encode(&json!({})), b"{}".to_vec());
        assert_eq!(encode_json(&json!({})), "{}");
    }

    #[test]
    fn test_keys_sorted_regardless_of_insertion_order() {
        let mut forward = Map::new();
        forward.insert("owner_id".to_string(), json!("matt"));
        forward.insert("amount".to_string(), json!(5));

        let mut backward = Map::new();
        backward.insert("amount".to_string(), json!(5));
        backward.insert("owner_id".to_string(), json!("matt"));

        let a = encode(&Value::Object(forward.clone()));
        let b = encode(&Value::Object(backward.clone()));
        assert_eq!(a, b);
        assert_eq!(a, b"{'amount': 5, 'owner_id': 'matt'}".to_vec());
        assert_eq!(
            encode_json(&Value::Object(forward)),
            encode_json(&Value::Object(backward))
        );
    }

    #[test]
    fn test_nested_records_and_arrays() {
        let record = json!({
            "z": [3, 1, 2],
            "a": {"y": "b", "x": null, "w": true},
        });
        assert_eq!(literal(&record), "{'a': {'w': True, 'x': None, 'y': 'b'}, 'z': [3, 1, 2]}");
        assert_eq!(encode_json(&record), r#"{"a":{"w":true,"x":null,"y":"b"},"z":[3,1,2]}"#);
    }

    #[test]
    fn test_numbers_and_strings_fixed_form() {
        assert_eq!(literal(&json!(5)), "5");
        assert_eq!(literal(&json!(5.0)), "5.0");
        assert_eq!(literal(&json!(0.9)), "0.9");
        assert_eq!(literal(&json!(-4)), "-4");
        assert_eq!(literal(&json!("it's")), r"'it\'s'");
        assert_eq!(literal(&json!("a\\b")), r"'a\\b'");
        assert_eq!(encode_json(&json!("quo\"te")), r#""quo\"te""#);
    }

    #[test]
    fn test_json_form_parses_back() {
        let record = json!({"header": {"nonce": 7, "previous_hash": ""}, "body": {"transactions": []}});
        let back: Value = serde_json::from_str(&encode_json(&record)).unwrap();
        assert_eq!(back, record);
    }
}
