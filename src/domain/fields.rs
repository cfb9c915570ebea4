//! Field pickers for loosely shaped JSON payloads.
//!
//! Both upstream APIs spell the same field several ways; these helpers take
//! the first spelling that is present and parses.

use serde_json::Value;

pub fn pick_obj<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| root.get(*key).filter(|v| !v.is_null()))
}

pub fn pick_str<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| root.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub fn pick_array<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a [Value]> {
    keys.iter()
        .find_map(|key| root.get(*key).and_then(|v| v.as_array()).map(Vec::as_slice))
}

pub fn pick_f64(root: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| root.get(*key).and_then(parse_f64ish))
}

pub fn pick_i64(root: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .find_map(|key| root.get(*key).and_then(parse_i64ish))
}

/// Number or numeric string.
pub fn parse_f64ish(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Integer, integral float, or integer string.
pub fn parse_i64ish(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
