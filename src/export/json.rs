use super::create_file;
use crate::error::ExportError;
use crate::model::ModelElement;
use std::io::Write;
use std::path::Path;

/// Writes the elements as a pretty-printed JSON array.
pub fn export_json<P: AsRef<Path>>(elements: &[ModelElement], path: P) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(elements)?;
    let mut file = create_file(path.as_ref())?;

    file.write_all(json.as_bytes())
        .map_err(|e| ExportError::WriteError {
            message: e.to_string(),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MaterialInfo, PropValue, PropertySet, PropertyValue};
    use crate::schema::TypeCode;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<ModelElement> {
        let mut pset = PropertySet::new("Qto_WallBaseQuantities");
        pset.properties
            .push(PropertyValue::new("NetArea", PropValue::Number(12.5), "Area").with_unit("m²"));
        pset.properties
            .push(PropertyValue::new("IsExternal", PropValue::Bool(true), "IFCBOOLEAN"));

        let mut layers = MaterialInfo::new("Exterior").with_category("Layer Set");
        layers.push_property(PropertyValue::new(
            "Layer 1: Brick",
            PropValue::Number(240.0),
            "LayerThickness",
        ));

        vec![ModelElement {
            id: 10,
            type_code: TypeCode::Numeric(2_391_406_946),
            type_name: "IFCWALL".into(),
            display_name: "Basic Wall".into(),
            global_id: Some("2O2Fr$t4X7Zf8NOew3FLOH".into()),
            property_sets: vec![pset],
            materials: vec![layers, MaterialInfo::new("Brick").with_category("Layer Material")],
        }]
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("elements.json");
        let elements = sample();

        export_json(&elements, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<ModelElement> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, elements);
    }

    #[test]
    fn uses_camel_case_and_type_keys() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value[0]["displayName"], "Basic Wall");
        assert_eq!(value[0]["typeCode"], 2_391_406_946_u32);
        assert_eq!(value[0]["propertySets"][0]["properties"][0]["type"], "Area");
        assert_eq!(value[0]["propertySets"][0]["properties"][0]["unit"], "m²");
    }

    #[test]
    fn missing_directory_is_a_create_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_json(&sample(), dir.path().join("missing/out.json")).unwrap_err();
        assert!(matches!(err, ExportError::FileCreate { .. }));
    }
}
