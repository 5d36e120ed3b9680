//! Canonical normalization of raw record values prior to hashing.
//!
//! Upstream sources re-serve the same logical data with keys in a different
//! order, players shuffled, or floats carrying representation noise. Everything
//! that feeds a fingerprint goes through `normalize` + `canonical_string` first
//! so none of that registers as a change.

use std::fmt::Write as _;

use serde_json::{Map, Number, Value};

/// Identity keys probed, in priority order, when sorting a list of objects.
/// The first element of the list decides which key governs the sort.
pub const IDENTITY_KEYS: [&str; 4] = ["player_id", "date", "transaction_id", "id"];

const FLOAT_SCALE: f64 = 1e6;

/// Round a float to 6 decimal places, the precision fingerprints operate at.
pub(crate) fn round6(value: f64) -> f64 {
    (value * FLOAT_SCALE).round() / FLOAT_SCALE
}

/// Produce the canonical form of a value: floats rounded to 6 decimals and
/// lists of objects sorted by their governing identity key. Object key order
/// is left alone; `canonical_string` sorts keys when serializing.
///
/// Idempotent: `normalize(normalize(v)) == normalize(v)`.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), normalize(item));
            }
            Value::Object(out)
        }
        Value::Array(items) => normalize_list(items),
        Value::Number(n) => normalize_number(n),
        _ => value.clone(),
    }
}

fn normalize_list(items: &[Value]) -> Value {
    // Elements are normalized before sorting so the sort key already sees
    // rounded floats; sorting first would break idempotence.
    let mut out: Vec<Value> = items.iter().map(normalize).collect();
    if let Some(key) = out.first().and_then(governing_key) {
        out.sort_by_cached_key(|item| sort_string(item, key));
    }
    Value::Array(out)
}

fn governing_key(first: &Value) -> Option<&'static str> {
    let map = first.as_object()?;
    IDENTITY_KEYS.iter().copied().find(|key| map.contains_key(*key))
}

/// Stringified sort key for one list element. Elements missing the key
/// (or that are not objects at all) sort together at the front.
fn sort_string(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn normalize_number(n: &Number) -> Value {
    if n.is_f64() {
        let rounded = round6(n.as_f64().unwrap_or_default());
        return Number::from_f64(rounded).map_or(Value::Null, Value::Number);
    }
    Value::Number(n.clone())
}

/// Serialize a value to compact canonical JSON text: object keys in sorted
/// order, `,`/`:` separators, no whitespace, floats in shortest round-trip
/// form. Writes into a `String`, so it cannot fail.
pub fn canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => write_escaped(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_escaped(key, out);
                out.push(':');
                if let Some(item) = map.get(key) {
                    write_canonical(item, out);
                }
            }
            out.push('}');
        }
    }
}

fn write_number(n: &Number, out: &mut String) {
    if let Some(i) = n.as_i64() {
        let _ = write!(out, "{i}");
    } else if let Some(u) = n.as_u64() {
        let _ = write!(out, "{u}");
    } else if let Some(f) = n.as_f64() {
        // `{:?}` prints the shortest string that round-trips the f64.
        let _ = write!(out, "{f:?}");
    }
}

fn write_escaped(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
