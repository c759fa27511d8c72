// Loose accessors over the raw export JSON

use serde_json::Value;

pub(super) fn at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))
        .filter(|found| !found.is_null())
}

pub(super) fn array<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    at(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Non-empty string at `path`.
pub(super) fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    at(value, path)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}

pub(super) fn i64_at(value: &Value, path: &[&str]) -> Option<i64> {
    at(value, path).and_then(as_i64)
}

/// Like `i64_at` but treats zero as absent.
pub(super) fn nonzero_i64_at(value: &Value, path: &[&str]) -> Option<i64> {
    i64_at(value, path).filter(|number| *number != 0)
}

pub(super) fn truthy(value: &Value, path: &[&str]) -> bool {
    match at(value, path) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        _ => false,
    }
}

pub(super) fn as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|float| float as i64))
}

/// Ids appear as numbers or strings depending on the export version.
pub(super) fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

pub(super) fn id_at(value: &Value, path: &[&str]) -> Option<String> {
    at(value, path).and_then(id_key)
}

/// Modifiers from the named sources, in source order.
pub(super) fn modifiers<'a>(root: &'a Value, sources: &'a [&'a str]) -> impl Iterator<Item = &'a Value> + 'a {
    sources
        .iter()
        .flat_map(move |source| array(root, &["modifiers", *source]).iter())
}

pub(super) const PROFICIENCY_SOURCES: [&str; 4] = ["race", "class", "background", "feat"];
pub(super) const SENSE_SOURCES: [&str; 5] = ["race", "class", "background", "feat", "item"];
