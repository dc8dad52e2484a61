use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized property or quantity value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
}

impl PropValue {
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// JSON kind name, used as the type tag when the engine gives no label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PropValue::Bool(_) => "boolean",
            PropValue::Number(_) => "number",
            PropValue::Text(_) => "string",
            PropValue::Null => "null",
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Bool(b) => f.write_str(if *b { "Yes" } else { "No" }),
            PropValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            PropValue::Number(n) => {
                let rounded = format!("{n:.3}");
                f.write_str(rounded.trim_end_matches('0').trim_end_matches('.'))
            }
            PropValue::Text(s) => f.write_str(s),
            PropValue::Null => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub name: String,
    pub value: PropValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl PropertyValue {
    pub fn new(name: impl Into<String>, value: PropValue, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: None,
            kind: kind.into(),
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Value followed by its unit, if any.
    #[must_use]
    pub fn formatted(&self) -> String {
        match &self.unit {
            Some(unit) if !unit.is_empty() => format!("{} {unit}", self.value),
            _ => self.value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySet {
    pub name: String,
    pub properties: Vec<PropertyValue>,
}

impl PropertySet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn displays_values_for_tables() {
        assert_eq!(PropValue::Number(3.0).to_string(), "3");
        assert_eq!(PropValue::Number(0.125).to_string(), "0.125");
        assert_eq!(PropValue::Bool(true).to_string(), "Yes");
        assert_eq!(PropValue::Null.to_string(), "-");
        let area = PropertyValue::new("Area", PropValue::Number(12.5), "Area").with_unit("m²");
        assert_eq!(area.formatted(), "12.5 m²");
    }

    #[test]
    fn serializes_with_engine_field_names() {
        let prop = PropertyValue::new("IsExternal", PropValue::Bool(true), "IFCBOOLEAN");
        let json = serde_json::to_value(&prop).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "IsExternal", "value": true, "type": "IFCBOOLEAN" })
        );
    }
}
