use crate::model::material::PartKind;
use crate::model::raw::{array_field, express_id, number_field, text_field, type_tag};
use crate::model::{MaterialInfo, PropValue, PropertyValue};
use crate::schema::TypeSchema;
use serde_json::Value;

/// Material association shapes the normalizer knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    Simple,
    LayerSet,
    LayerSetUsage,
    ProfileSet,
    ProfileSetUsage,
    ConstituentSet,
    List,
    Unrecognized,
}

/// Classifies by the resolved type tag, falling back on the record's fields.
#[must_use]
pub fn classify_material(record: &Value, schema: &TypeSchema) -> MaterialKind {
    let by_tag = type_tag(record).map(|tag| schema.resolve(&tag).to_ascii_uppercase());
    let kind = match by_tag.as_deref() {
        Some("IFCMATERIAL") => MaterialKind::Simple,
        Some("IFCMATERIALLAYERSET") => MaterialKind::LayerSet,
        Some("IFCMATERIALLAYERSETUSAGE") => MaterialKind::LayerSetUsage,
        Some("IFCMATERIALPROFILESET") => MaterialKind::ProfileSet,
        Some("IFCMATERIALPROFILESETUSAGE") => MaterialKind::ProfileSetUsage,
        Some("IFCMATERIALCONSTITUENTSET") => MaterialKind::ConstituentSet,
        Some("IFCMATERIALLIST") => MaterialKind::List,
        _ => MaterialKind::Unrecognized,
    };
    if kind != MaterialKind::Unrecognized {
        return kind;
    }

    let has = |field: &str| record.get(field).is_some();
    if has("MaterialLayers") {
        MaterialKind::LayerSet
    } else if has("ForLayerSet") {
        MaterialKind::LayerSetUsage
    } else if has("MaterialProfiles") {
        MaterialKind::ProfileSet
    } else if has("ForProfileSet") {
        MaterialKind::ProfileSetUsage
    } else if has("MaterialConstituents") {
        MaterialKind::ConstituentSet
    } else if has("Materials") {
        MaterialKind::List
    } else if text_field(record, "Name").is_some() {
        MaterialKind::Simple
    } else {
        MaterialKind::Unrecognized
    }
}

/// Flattens raw material associations into [`MaterialInfo`] entries.
///
/// Composite sets become one entry carrying a synthetic `"<Kind> N: <material>"`
/// property per part, followed by one entry per distinct referenced material.
/// A material used by several parts of one set (plaster on both faces) is listed
/// once; every part still keeps its own synthetic property.
#[must_use]
pub fn normalize_materials(records: &[Value], schema: &TypeSchema) -> Vec<MaterialInfo> {
    let mut out = Vec::new();
    for record in records {
        collect_material(record, schema, &mut out);
    }
    out
}

fn collect_material(record: &Value, schema: &TypeSchema, out: &mut Vec<MaterialInfo>) {
    match classify_material(record, schema) {
        MaterialKind::Simple => out.extend(simple_material(record)),
        MaterialKind::LayerSet => {
            let name = text_field(record, "LayerSetName");
            composite(record, PartKind::Layer, name, "MaterialLayers", out);
        }
        MaterialKind::ProfileSet => {
            let name = text_field(record, "Name");
            composite(record, PartKind::Profile, name, "MaterialProfiles", out);
        }
        MaterialKind::ConstituentSet => {
            let name = text_field(record, "Name");
            composite(record, PartKind::Constituent, name, "MaterialConstituents", out);
        }
        MaterialKind::LayerSetUsage => {
            if let Some(set) = record.get("ForLayerSet").filter(|v| v.is_object()) {
                collect_material(set, schema, out);
            }
        }
        MaterialKind::ProfileSetUsage => {
            if let Some(set) = record.get("ForProfileSet").filter(|v| v.is_object()) {
                collect_material(set, schema, out);
            }
        }
        MaterialKind::List => {
            out.extend(array_field(record, "Materials").iter().filter_map(simple_material));
        }
        MaterialKind::Unrecognized => {
            tracing::debug!(id = ?express_id(record), "Skipping unrecognized material record");
        }
    }
}

fn simple_material(record: &Value) -> Option<MaterialInfo> {
    let mut info = MaterialInfo::new(text_field(record, "Name")?);
    info.category = text_field(record, "Category");
    info.description = text_field(record, "Description");
    Some(info)
}

fn composite(
    record: &Value,
    kind: PartKind,
    name: Option<String>,
    parts_field: &str,
    out: &mut Vec<MaterialInfo>,
) {
    let name = name.unwrap_or_else(|| {
        express_id(record).map_or_else(
            || format!("Unnamed {} Set", kind.label()),
            |id| format!("{} Set #{id}", kind.label()),
        )
    });

    let mut set = MaterialInfo::new(name).with_category(format!("{} Set", kind.label()));
    set.description = text_field(record, "Description");

    let mut referenced: Vec<MaterialInfo> = Vec::new();
    for (position, part) in array_field(record, parts_field).iter().enumerate() {
        let material = part.get("Material").and_then(simple_material);
        let material_name = material
            .as_ref()
            .map_or_else(|| "Unknown Material".to_string(), |m| m.name.clone());

        let value = match kind {
            PartKind::Layer => number_field(part, "LayerThickness").map(PropValue::Number),
            PartKind::Profile => text_field(part, "Name").map(PropValue::Text),
            PartKind::Constituent => number_field(part, "Fraction").map(PropValue::Number),
        };
        set.push_property(PropertyValue::new(
            format!("{} {}: {material_name}", kind.label(), position + 1),
            value.unwrap_or(PropValue::Null),
            kind.value_kind(),
        ));

        if let Some(mut material) = material {
            if referenced.iter().all(|m| m.name != material.name) {
                material.category = Some(kind.material_category().to_string());
                referenced.push(material);
            }
        }
    }

    out.push(set);
    out.extend(referenced);
}
