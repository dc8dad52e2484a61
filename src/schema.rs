//! IFC type-code schema: maps engine type codes to readable type names.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

const BUNDLED_SCHEMA: &str = include_str!("../assets/ifc_types.ts");

/// Type tag as reported by the engine: either a numeric code or a type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeCode {
    Numeric(u32),
    Name(String),
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCode::Numeric(code) => write!(f, "{code}"),
            TypeCode::Name(name) => f.write_str(name),
        }
    }
}

/// Forward (name → code) and inverse (code → name) lookup tables.
#[derive(Debug, Clone, Default)]
pub struct TypeSchema {
    by_name: HashMap<String, u32>,
    by_code: HashMap<u32, String>,
}

impl TypeSchema {
    /// Loads the schema resource from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content =
            std::fs::read_to_string(&path).map_err(|source| SchemaError::Unreachable {
                path: path.as_ref().to_path_buf(),
                source,
            })?;
        Self::parse(&content)
    }

    /// The schema resource compiled into the binary.
    pub fn bundled() -> Result<Self, SchemaError> {
        Self::parse(BUNDLED_SCHEMA)
    }

    /// Extracts every `export const NAME = NUMBER;` line. Any other statement is ignored.
    pub fn parse(content: &str) -> Result<Self, SchemaError> {
        let mut schema = TypeSchema::default();

        for line in content.lines() {
            if let Some((name, code)) = parse_constant(line) {
                schema.insert(name, code);
            }
        }

        if schema.is_empty() {
            return Err(SchemaError::NoEntries);
        }

        tracing::debug!(types = schema.len(), "Loaded type schema");
        Ok(schema)
    }

    // Keeps both maps exact inverses when a name or code shows up twice.
    fn insert(&mut self, name: &str, code: u32) {
        if let Some(old_code) = self.by_name.remove(name) {
            self.by_code.remove(&old_code);
        }
        if let Some(old_name) = self.by_code.remove(&code) {
            self.by_name.remove(&old_name);
        }
        self.by_name.insert(name.to_string(), code);
        self.by_code.insert(code, name.to_string());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Type name for a code, or `"Unknown Type (<code>)"` when the code is absent.
    #[must_use]
    pub fn type_name(&self, code: u32) -> String {
        self.by_code
            .get(&code)
            .cloned()
            .unwrap_or_else(|| format!("Unknown Type ({code})"))
    }

    /// Numeric code for a type name (case-insensitive).
    #[must_use]
    pub fn code_of(&self, name: &str) -> Option<u32> {
        self.by_name
            .get(name)
            .or_else(|| self.by_name.get(&name.to_ascii_uppercase()))
            .copied()
    }

    /// Display name for either kind of type tag.
    #[must_use]
    pub fn resolve(&self, code: &TypeCode) -> String {
        match code {
            TypeCode::Numeric(code) => self.type_name(*code),
            TypeCode::Name(name) => name.clone(),
        }
    }

    /// Encodes a type name the way the engine reports it: numeric when known.
    #[must_use]
    pub fn encode(&self, name: &str) -> TypeCode {
        self.code_of(name)
            .map_or_else(|| TypeCode::Name(name.to_string()), TypeCode::Numeric)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.by_name.iter().map(|(name, code)| (name.as_str(), *code))
    }

    #[must_use]
    pub fn name_for(&self, code: u32) -> Option<&str> {
        self.by_code.get(&code).map(String::as_str)
    }
}

fn parse_constant(line: &str) -> Option<(&str, u32)> {
    let rest = line.trim().strip_prefix("export")?.trim_start();
    let rest = rest.strip_prefix("const")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let (name, value) = rest.split_once('=')?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let value = value.trim().trim_end_matches(';').trim();
    let code = value.parse::<u32>().ok()?;
    Some((name, code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r"
        // generated
        export const IFCWALL = 2391406946;
        export const IFCSLAB = 1529196076;
        export const IFCSPACE=3856911033;
        export function helper() {}
        const LOCAL = 5;
        export const NOT_A_NUMBER = 'x';
    ";

    #[test]
    fn parses_only_export_const_lines() {
        let schema = TypeSchema::parse(SAMPLE).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.code_of("IFCWALL"), Some(2_391_406_946));
        assert_eq!(schema.code_of("IfcSpace"), Some(3_856_911_033));
        assert_eq!(schema.code_of("LOCAL"), None);
    }

    #[test]
    fn forward_and_inverse_maps_agree() {
        let schema = TypeSchema::parse(SAMPLE).unwrap();
        for (name, code) in schema.entries() {
            assert_eq!(schema.name_for(code), Some(name));
        }
    }

    #[test]
    fn duplicate_entries_keep_maps_inverse() {
        let schema = TypeSchema::parse(
            "export const A = 1;\nexport const B = 1;\nexport const A = 2;\n",
        )
        .unwrap();
        assert_eq!(schema.len(), 2);
        for (name, code) in schema.entries() {
            assert_eq!(schema.name_for(code), Some(name));
        }
        assert_eq!(schema.type_name(1), "B");
        assert_eq!(schema.type_name(2), "A");
    }

    #[test]
    fn unknown_code_gets_placeholder() {
        let schema = TypeSchema::parse(SAMPLE).unwrap();
        assert_eq!(schema.type_name(42), "Unknown Type (42)");
        assert_eq!(schema.type_name(42), schema.type_name(42));
    }

    #[test]
    fn resolve_handles_both_tag_kinds() {
        let schema = TypeSchema::parse(SAMPLE).unwrap();
        assert_eq!(schema.resolve(&TypeCode::Numeric(1_529_196_076)), "IFCSLAB");
        assert_eq!(schema.resolve(&TypeCode::Name("IFCROOF".into())), "IFCROOF");
        assert_eq!(schema.encode("IFCWALL"), TypeCode::Numeric(2_391_406_946));
        assert_eq!(schema.encode("IFCFOO"), TypeCode::Name("IFCFOO".into()));
    }

    #[test]
    fn empty_resource_is_an_error() {
        assert!(matches!(
            TypeSchema::parse("// nothing here"),
            Err(SchemaError::NoEntries)
        ));
    }

    #[test]
    fn missing_file_is_unreachable() {
        let err = TypeSchema::load("/definitely/not/here.ts").unwrap_err();
        assert!(matches!(err, SchemaError::Unreachable { .. }));
    }

    #[test]
    fn bundled_schema_loads() {
        let schema = TypeSchema::bundled().unwrap();
        assert_eq!(schema.type_name(103_090_709), "IFCPROJECT");
        assert!(schema.code_of("IFCMATERIALLAYERSET").is_some());
    }
}
