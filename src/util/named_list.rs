//! Access helpers for Solr "named lists".
//!
//! Solr serializes ordered key/value lists either as maps (`{"a":1,"b":2}`)
//! or, with `json.nl=flat`, as flat arrays (`["a",1,"b",2]`). The XML and
//! PHPS decoders always produce maps. Parsers go through these helpers so
//! they work with any of the representations.

use serde_json::Value;

/// Ordered entries of a named list.
///
/// Objects yield their entries in order. Flat arrays yield consecutive
/// pairs; a `null` key (the "missing" bucket of a facet) becomes the empty
/// string, numeric keys are stringified. Any other value yields nothing.
pub fn entries(value: &Value) -> Vec<(String, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .chunks(2)
            .filter_map(|pair| match pair {
                [key, value] => Some((value_to_string(key), value)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Look up a key in a named list in either representation.
pub fn get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => items.chunks(2).find_map(|pair| match pair {
            [k, v] if value_to_string(k) == key => Some(v),
            _ => None,
        }),
        _ => None,
    }
}

/// Follow a path of keys through nested named lists.
pub fn path<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |current, key| get(current, key))
}

/// Render a scalar as a string; `null` becomes the empty string.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Interpret a number or numeric string as `u64`.
pub fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Interpret a number or numeric string as `i64`.
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Interpret a number or numeric string as `f64`.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Interpret a boolean, `"true"`/`"false"` string or 0/1 number as `bool`.
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        _ => None,
    }
}

/// Interpret a value as a list of strings; scalars become one-item lists.
pub fn as_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(value_to_string).collect(),
        Value::Null => Vec::new(),
        other => vec![value_to_string(other)],
    }
}

/// `get` followed by `as_u64`.
pub fn get_u64(value: &Value, key: &str) -> Option<u64> {
    get(value, key).and_then(as_u64)
}

/// `get` followed by `as_i64`.
pub fn get_i64(value: &Value, key: &str) -> Option<i64> {
    get(value, key).and_then(as_i64)
}

/// `get` followed by `as_f64`.
pub fn get_f64(value: &Value, key: &str) -> Option<f64> {
    get(value, key).and_then(as_f64)
}

/// `get` followed by `as_bool`.
pub fn get_bool(value: &Value, key: &str) -> Option<bool> {
    get(value, key).and_then(as_bool)
}

/// `get` followed by `value_to_string`, skipping nulls.
pub fn get_string(value: &Value, key: &str) -> Option<String> {
    get(value, key)
        .filter(|v| !v.is_null())
        .map(value_to_string)
}

/// Items of a plain list. Objects yield their values, since an empty PHPS
/// array decodes as an object.
pub fn items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    }
}

/// Entries of a named list whose values are counts.
pub fn counts(value: &Value) -> Vec<(String, u64)> {
    entries(value)
        .into_iter()
        .map(|(k, v)| (k, as_u64(v).unwrap_or(0)))
        .collect()
}
