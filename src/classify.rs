use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::MalformedDataError;

/// Collect the type names of a pokemon record.
///
/// The data nests the name two levels down: for every entry of `types` we
/// want `types[i].type.name`. Any break in that shape is an error rather
/// than an empty set, so bad upstream data never reads as "no types".
pub fn extract_categories(detail: &Value) -> Result<BTreeSet<String>, MalformedDataError> {
    let entries = detail
        .get("types")
        .and_then(Value::as_array)
        .ok_or_else(|| MalformedDataError::new("types", "an array"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let inner = entry
                .get("type")
                .filter(|t| t.is_object())
                .ok_or_else(|| MalformedDataError::new(format!("types[{i}].type"), "an object"))?;
            inner
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| MalformedDataError::new(format!("types[{i}].type.name"), "a string"))
        })
        .collect()
}

/// Read a nullable integer field. Absent and `null` both mean "unknown".
pub fn scalar(detail: &Value, field: &str) -> Result<Option<i64>, MalformedDataError> {
    match detail.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| MalformedDataError::new(field, "an integer or null")),
    }
}
