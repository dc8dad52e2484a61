use crate::model::material::PartKind;
use crate::model::{MaterialInfo, MaterialPart, StructuredMaterial};

const PART_KINDS: [PartKind; 3] = [PartKind::Layer, PartKind::Profile, PartKind::Constituent];

/// Regroups flat materials into typed sets for display.
///
/// Every `"<Kind> N: <material>"` property on a set entry becomes a part, in
/// property order, with the matching part material attached as `details`.
/// Part materials stay in the output as simple entries.
#[must_use]
pub fn organize_structured_materials(materials: &[MaterialInfo]) -> Vec<StructuredMaterial> {
    materials
        .iter()
        .map(|info| match set_kind(info) {
            Some(kind) => {
                let parts = info
                    .properties()
                    .iter()
                    .filter_map(|property| {
                        let (index, material) = parse_part_name(&property.name, kind)?;
                        Some(MaterialPart {
                            index,
                            details: find_details(materials, material, kind),
                            material: material.to_string(),
                            value: property.value.clone(),
                        })
                    })
                    .collect();
                structured_set(kind, info.name.clone(), parts)
            }
            None => StructuredMaterial::Simple(info.clone()),
        })
        .collect()
}

fn set_kind(info: &MaterialInfo) -> Option<PartKind> {
    let category = info.category.as_deref()?.strip_suffix(" Set")?;
    PART_KINDS.into_iter().find(|kind| kind.label() == category)
}

/// Splits `"Layer 3: Brick"` into `(3, "Brick")`.
fn parse_part_name(name: &str, kind: PartKind) -> Option<(usize, &str)> {
    let (head, material) = name.split_once(": ")?;
    let index = head.strip_prefix(kind.label())?.trim().parse().ok()?;
    Some((index, material))
}

fn find_details(materials: &[MaterialInfo], name: &str, kind: PartKind) -> Option<MaterialInfo> {
    materials
        .iter()
        .find(|m| m.name == name && m.category.as_deref() == Some(kind.material_category()))
        .cloned()
}

fn structured_set(kind: PartKind, name: String, parts: Vec<MaterialPart>) -> StructuredMaterial {
    match kind {
        PartKind::Layer => StructuredMaterial::LayerSet { name, layers: parts },
        PartKind::Profile => StructuredMaterial::ProfileSet {
            name,
            profiles: parts,
        },
        PartKind::Constituent => StructuredMaterial::ConstituentSet {
            name,
            constituents: parts,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::material::LAYER_MATERIAL;
    use crate::model::{PropValue, PropertyValue};
    use pretty_assertions::assert_eq;

    fn layer_set(count: usize) -> Vec<MaterialInfo> {
        let mut set = MaterialInfo::new("Wall Build-up").with_category("Layer Set");
        let mut out = Vec::new();
        for i in 1..=count {
            let material = format!("Material {i}");
            set.push_property(PropertyValue::new(
                format!("Layer {i}: {material}"),
                PropValue::Number(i as f64 * 10.0),
                "LayerThickness",
            ));
            out.push(MaterialInfo::new(material).with_category(LAYER_MATERIAL));
        }
        out.insert(0, set);
        out
    }

    #[test]
    fn three_layers_give_one_set_and_three_simple_entries() {
        let structured = organize_structured_materials(&layer_set(3));
        assert_eq!(structured.len(), 4);
        assert_eq!(structured[0].kind_label(), "LayerSet");
        assert_eq!(structured[0].parts().len(), 3);
        assert!(structured[1..]
            .iter()
            .all(|m| matches!(m, StructuredMaterial::Simple(_))));

        let second = &structured[0].parts()[1];
        assert_eq!(second.index, 2);
        assert_eq!(second.material, "Material 2");
        assert_eq!(second.value, PropValue::Number(20.0));
        assert_eq!(
            second.details.as_ref().map(|d| d.name.as_str()),
            Some("Material 2")
        );
    }

    #[test]
    fn layer_count_is_not_capped() {
        let structured = organize_structured_materials(&layer_set(25));
        assert_eq!(structured[0].parts().len(), 25);
        assert_eq!(structured[0].parts()[24].index, 25);
    }

    #[test]
    fn materials_containing_colons_keep_their_full_name() {
        let mut set = MaterialInfo::new("Columns").with_category("Profile Set");
        set.push_property(PropertyValue::new(
            "Profile 1: Steel: S355",
            PropValue::Text("HEA200".into()),
            "ProfileName",
        ));
        let structured = organize_structured_materials(&[set]);
        assert_eq!(
            structured,
            vec![StructuredMaterial::ProfileSet {
                name: "Columns".into(),
                profiles: vec![MaterialPart {
                    index: 1,
                    material: "Steel: S355".into(),
                    value: PropValue::Text("HEA200".into()),
                    details: None,
                }],
            }]
        );
    }

    #[test]
    fn plain_materials_pass_through() {
        let oak = MaterialInfo::new("Oak").with_category("Wood");
        let structured = organize_structured_materials(std::slice::from_ref(&oak));
        assert_eq!(structured, vec![StructuredMaterial::Simple(oak)]);
    }
}
