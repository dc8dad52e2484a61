//! Typed view over the engine's loosely-shaped records.
//!
//! Engine records are JSON objects whose fields are either primitives, value
//! holders (`{ "value": <primitive> }`), references (`{ "type": 5, "value": id }`)
//! or arrays of nested records. [`classify_field`] sorts one field into the
//! handful of shapes the normalizer understands.

use super::PropValue;
use crate::schema::TypeCode;
use serde_json::Value;

/// Fields that identify a record rather than describe it.
pub const STRUCTURAL_FIELDS: [&str; 5] = ["type", "Name", "GlobalId", "expressID", "OwnerHistory"];

/// Engine tag for an unresolved entity reference.
pub const REFERENCE_TAG: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum RawField<'a> {
    /// Identity field from [`STRUCTURAL_FIELDS`].
    Structural,
    /// `{ value: primitive }`
    ValueHolder(PropValue),
    /// `Quantities: [...]` on element quantity records.
    Quantities(&'a [Value]),
    /// `HasProperties: [...]` on property set records.
    HasProperties(&'a [Value]),
    /// Reference to another entity that the engine left unresolved.
    Reference(u32),
    Unrecognized,
}

#[must_use]
pub fn classify_field<'a>(key: &str, value: &'a Value) -> RawField<'a> {
    if STRUCTURAL_FIELDS.contains(&key) {
        return RawField::Structural;
    }

    match value {
        Value::Array(items) if key == "Quantities" => RawField::Quantities(items),
        Value::Array(items) if key == "HasProperties" => RawField::HasProperties(items),
        Value::Object(_) if key.contains("OwnerHistory") => RawField::Structural,
        Value::Object(_) => {
            if let Some(id) = reference_id(value) {
                return RawField::Reference(id);
            }
            holder_value(value).map_or(RawField::Unrecognized, RawField::ValueHolder)
        }
        _ => RawField::Unrecognized,
    }
}

/// Primitive JSON value as a [`PropValue`]; `None` for arrays and objects.
#[must_use]
pub fn scalar(value: &Value) -> Option<PropValue> {
    match value {
        Value::Null => Some(PropValue::Null),
        Value::Bool(b) => Some(PropValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(PropValue::Number),
        Value::String(s) => Some(PropValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// The primitive inside a value holder. Boolean-labelled `T`/`F` enums become booleans.
#[must_use]
pub fn holder_value(holder: &Value) -> Option<PropValue> {
    let value = scalar(holder.get("value")?)?;
    let is_boolean = holder_label(holder).is_some_and(|label| {
        label.eq_ignore_ascii_case("IFCBOOLEAN") || label.eq_ignore_ascii_case("IFCLOGICAL")
    });

    Some(match value {
        PropValue::Text(text) if is_boolean => {
            let flag = match text.trim_matches('.') {
                "T" => Some(true),
                "F" => Some(false),
                _ => None,
            };
            flag.map_or(PropValue::Text(text), PropValue::Bool)
        }
        other => other,
    })
}

/// Measure type label on a value holder, e.g. `IFCLABEL`.
#[must_use]
pub fn holder_label(holder: &Value) -> Option<&str> {
    holder.get("label").and_then(Value::as_str)
}

#[must_use]
pub fn reference_id(value: &Value) -> Option<u32> {
    if value.get("type").and_then(Value::as_u64) != Some(REFERENCE_TAG) {
        return None;
    }
    value
        .get("value")
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
}

/// `record[key].value` as text. Unresolved references are not text.
#[must_use]
pub fn text_field(record: &Value, key: &str) -> Option<String> {
    let field = record.get(key)?;
    if reference_id(field).is_some() {
        return None;
    }
    match holder_value(field)? {
        PropValue::Text(text) if !text.is_empty() => Some(text),
        PropValue::Number(n) => Some(PropValue::Number(n).to_string()),
        _ => None,
    }
}

/// `record[key].value` as a number.
#[must_use]
pub fn number_field(record: &Value, key: &str) -> Option<f64> {
    holder_value(record.get(key)?)?.as_f64()
}

#[must_use]
pub fn express_id(record: &Value) -> Option<u32> {
    record
        .get("expressID")
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
}

/// The record's `type` field, numeric or named.
#[must_use]
pub fn type_tag(record: &Value) -> Option<TypeCode> {
    match record.get("type")? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|code| u32::try_from(code).ok())
            .map(TypeCode::Numeric),
        Value::String(name) => Some(TypeCode::Name(name.clone())),
        _ => None,
    }
}

/// Array field, or an empty slice when absent or not an array.
#[must_use]
pub fn array_field<'a>(record: &'a Value, key: &str) -> &'a [Value] {
    record
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
