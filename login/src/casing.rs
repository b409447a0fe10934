//! camelCase normalization for provider JSON.
//!
//! The hosted UI answers with snake_case keys (`access_token`, `email_verified`)
//! while downstream consumers expect camelCase. Only top-level keys are
//! rewritten; nested values pass through untouched.

use serde_json::Map;
use serde_json::Value;

/// Convert a key to camelCase. Segments are separated by `_`, `-` or a space;
/// an all-uppercase first segment is lowercased whole. Applying it twice gives
/// the same result as applying it once.
pub fn to_camel_case(key: &str) -> String {
    let mut segments = key
        .split(['_', '-', ' '])
        .filter(|segment| !segment.is_empty());

    let Some(first) = segments.next() else {
        return key.to_string();
    };

    let mut out = String::with_capacity(key.len());
    if is_all_uppercase(first) {
        out.push_str(&first.to_lowercase());
    } else {
        push_with_first(&mut out, first, char::to_lowercase);
    }

    for segment in segments {
        if is_all_uppercase(segment) {
            push_with_first(&mut out, &segment.to_lowercase(), char::to_uppercase);
        } else {
            push_with_first(&mut out, segment, char::to_uppercase);
        }
    }
    out
}

fn is_all_uppercase(segment: &str) -> bool {
    segment.chars().any(char::is_alphabetic)
        && segment
            .chars()
            .all(|c| !c.is_alphabetic() || c.is_uppercase())
}

fn push_with_first<I>(out: &mut String, segment: &str, first: fn(char) -> I)
where
    I: Iterator<Item = char>,
{
    let mut chars = segment.chars();
    if let Some(c) = chars.next() {
        out.extend(first(c));
        out.push_str(chars.as_str());
    }
}

/// Rewrite the keys of an object. When two keys collapse to the same
/// camelCase form the one that comes later in the map wins.
pub fn camelize_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| (to_camel_case(&key), value))
        .collect()
}

/// Like [`camelize_map`] for an arbitrary JSON value; non-objects are
/// returned as-is.
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(camelize_map(map)),
        other => other,
    }
}
