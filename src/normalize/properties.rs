use crate::config::NormalizeOptions;
use crate::model::raw::{
    array_field, classify_field, express_id, holder_label, holder_value, text_field, RawField,
};
use crate::model::{PropValue, PropertySet, PropertyValue};
use serde_json::Value;

/// Quantity value holders in priority order: (field, kind, unit).
const QUANTITY_HOLDERS: [(&str, &str, &str); 5] = [
    ("LengthValue", "Length", "m"),
    ("AreaValue", "Area", "m²"),
    ("VolumeValue", "Volume", "m³"),
    ("WeightValue", "Weight", "kg"),
    ("CountValue", "Count", "count"),
];

/// SI unit names with their symbols.
const SI_SYMBOLS: [(&str, &str); 13] = [
    ("METRE", "m"),
    ("SQUARE_METRE", "m²"),
    ("CUBIC_METRE", "m³"),
    ("GRAM", "g"),
    ("SECOND", "s"),
    ("DEGREE_CELSIUS", "°C"),
    ("KELVIN", "K"),
    ("NEWTON", "N"),
    ("PASCAL", "Pa"),
    ("WATT", "W"),
    ("JOULE", "J"),
    ("RADIAN", "rad"),
    ("HERTZ", "Hz"),
];

const SI_PREFIXES: [(&str, &str); 6] = [
    ("MILLI", "m"),
    ("CENTI", "c"),
    ("DECI", "d"),
    ("KILO", "k"),
    ("MEGA", "M"),
    ("GIGA", "G"),
];

/// Suffix on sets inherited from the element's type object.
pub const TYPE_SET_SUFFIX: &str = " (Type)";

/// Flattens one raw property or quantity set record.
#[must_use]
pub fn normalize_property_set(record: &Value, options: &NormalizeOptions) -> PropertySet {
    let name = text_field(record, "Name").unwrap_or_else(|| {
        express_id(record).map_or_else(
            || "Unnamed Property Set".to_string(),
            |id| format!("Property Set #{id}"),
        )
    });
    let mut set = PropertySet::new(name);

    let Some(fields) = record.as_object() else {
        return set;
    };

    for (key, value) in fields {
        match classify_field(key, value) {
            RawField::Quantities(items) => {
                set.properties.extend(items.iter().filter_map(quantity));
            }
            RawField::HasProperties(items) => {
                set.properties.extend(
                    items
                        .iter()
                        .enumerate()
                        .filter_map(|(index, item)| single_property(index, item, options)),
                );
            }
            RawField::ValueHolder(scalar) => {
                let kind = holder_label(value).map_or_else(|| scalar.kind().to_string(), str::to_string);
                set.properties.push(PropertyValue::new(key.clone(), scalar, kind));
            }
            RawField::Structural | RawField::Reference(_) | RawField::Unrecognized => {}
        }
    }

    set
}

/// Normalizes every record, dropping sets that end up empty.
#[must_use]
pub fn normalize_property_sets(records: &[Value], options: &NormalizeOptions) -> Vec<PropertySet> {
    records
        .iter()
        .map(|record| normalize_property_set(record, options))
        .filter(|set| !set.is_empty())
        .collect()
}

/// Property sets carried by type objects (`HasPropertySets`), suffixed with ` (Type)`.
#[must_use]
pub fn normalize_type_properties(types: &[Value], options: &NormalizeOptions) -> Vec<PropertySet> {
    types
        .iter()
        .flat_map(|type_object| array_field(type_object, "HasPropertySets"))
        .filter(|record| record.is_object())
        .map(|record| {
            let mut set = normalize_property_set(record, options);
            set.name.push_str(TYPE_SET_SUFFIX);
            set
        })
        .filter(|set| !set.is_empty())
        .collect()
}

fn measure(value: &Value) -> Option<PropValue> {
    holder_value(value).or_else(|| value.as_f64().map(PropValue::Number))
}

fn quantity(item: &Value) -> Option<PropertyValue> {
    QUANTITY_HOLDERS.iter().find_map(|(field, kind, unit)| {
        let value = measure(item.get(*field)?)?;
        let name = text_field(item, "Name").unwrap_or_else(|| (*kind).to_string());
        Some(PropertyValue::new(name, value, *kind).with_unit(*unit))
    })
}

fn single_property(index: usize, item: &Value, options: &NormalizeOptions) -> Option<PropertyValue> {
    let (value, kind) = if let Some(nominal) = item.get("NominalValue") {
        let value = holder_value(nominal)?;
        let kind = holder_label(nominal).map_or_else(|| value.kind().to_string(), str::to_string);
        (value, kind)
    } else {
        let values = ["EnumerationValues", "ListValues"]
            .iter()
            .map(|field| array_field(item, field))
            .find(|values| !values.is_empty())?;
        let kind = values.first().and_then(holder_label).unwrap_or("list").to_string();
        let joined = values
            .iter()
            .filter_map(holder_value)
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        (PropValue::Text(joined), kind)
    };

    let mut property = PropertyValue::new(property_name(index, item, options), value, kind);
    property.unit = unit_text(item);
    Some(property)
}

/// A property's unit: a plain text holder, or a resolved unit entity.
/// Unresolved references and unnamed units give `None`.
fn unit_text(item: &Value) -> Option<String> {
    if let Some(text) = text_field(item, "Unit") {
        return Some(text);
    }
    // IfcSIUnit carries Prefix + Name; IfcConversionBasedUnit just a Name.
    let unit = item.get("Unit")?;
    let name = text_field(unit, "Name")?;
    let Some(symbol) = lookup(&SI_SYMBOLS, &name) else {
        return Some(name);
    };
    let prefix = text_field(unit, "Prefix")
        .and_then(|prefix| lookup(&SI_PREFIXES, &prefix))
        .unwrap_or_default();
    Some(format!("{prefix}{symbol}"))
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, symbol)| *symbol)
}

fn property_name(index: usize, item: &Value, options: &NormalizeOptions) -> String {
    if let Some(name) = text_field(item, "Name") {
        return name;
    }
    if let Some(name) = text_field(item, "Description").filter(|d| is_identifier(d)) {
        return name;
    }
    match index {
        0 if options.positional_names => "IsExternal".to_string(),
        1 if options.positional_names => "LoadBearing".to_string(),
        _ => format!("Property {}", index + 1),
    }
}

fn is_identifier(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn options() -> NormalizeOptions {
        NormalizeOptions::default()
    }

    #[test]
    fn area_quantity_gets_square_metres() {
        let record = json!({
            "expressID": 40,
            "type": 1_883_228_015,
            "Name": { "type": 1, "value": "Qto_SlabBaseQuantities" },
            "Quantities": [
                { "expressID": 41, "AreaValue": { "type": 4, "value": 12.5 } },
                { "Name": { "value": "Width" }, "LengthValue": { "value": 0.2 } },
                { "Name": { "value": "Duration" }, "TimeValue": { "value": 3.0 } }
            ]
        });
        let set = normalize_property_set(&record, &options());
        assert_eq!(set.name, "Qto_SlabBaseQuantities");
        assert_eq!(
            set.properties,
            vec![
                PropertyValue::new("Area", PropValue::Number(12.5), "Area").with_unit("m²"),
                PropertyValue::new("Width", PropValue::Number(0.2), "Length").with_unit("m"),
            ]
        );
    }

    #[test]
    fn first_present_quantity_holder_wins() {
        let record = json!({
            "Quantities": [{
                "Name": { "value": "Mixed" },
                "VolumeValue": { "value": 2.0 },
                "WeightValue": { "value": 900.0 }
            }]
        });
        let set = normalize_property_set(&record, &options());
        assert_eq!(set.properties[0].unit.as_deref(), Some("m³"));
        assert_eq!(set.properties[0].kind, "Volume");
    }

    #[test]
    fn single_values_use_names_labels_and_fallbacks() {
        let record = json!({
            "Name": { "value": "Pset_WallCommon" },
            "OwnerHistory": { "type": 5, "value": 2 },
            "HasProperties": [
                { "NominalValue": { "type": 3, "label": "IFCBOOLEAN", "value": "T" } },
                { "NominalValue": { "value": false } },
                { "Description": { "value": "FireRating" }, "NominalValue": { "label": "IFCLABEL", "value": "EI60" } },
                { "NominalValue": { "value": 0.35 } },
                { "Name": { "value": "Status" } },
                { "Name": { "value": "Reference" }, "NominalValue": { "label": "IFCIDENTIFIER", "value": "W-01" } }
            ]
        });
        let set = normalize_property_set(&record, &options());
        assert_eq!(
            set.properties,
            vec![
                PropertyValue::new("IsExternal", PropValue::Bool(true), "IFCBOOLEAN"),
                PropertyValue::new("LoadBearing", PropValue::Bool(false), "boolean"),
                PropertyValue::new("FireRating", PropValue::Text("EI60".into()), "IFCLABEL"),
                PropertyValue::new("Property 4", PropValue::Number(0.35), "number"),
                PropertyValue::new("Reference", PropValue::Text("W-01".into()), "IFCIDENTIFIER"),
            ]
        );
    }

    #[test]
    fn units_come_from_resolved_unit_entities() {
        let record = json!({
            "HasProperties": [
                {
                    "Name": { "value": "Height" },
                    "NominalValue": { "label": "IFCLENGTHMEASURE", "value": 2.5 },
                    "Unit": {
                        "expressID": 99,
                        "type": "IFCSIUNIT",
                        "Dimensions": null,
                        "UnitType": { "type": 3, "value": "LENGTHUNIT" },
                        "Prefix": { "type": 3, "value": "MILLI" },
                        "Name": { "type": 3, "value": "METRE" }
                    }
                },
                {
                    "Name": { "value": "Span" },
                    "NominalValue": { "value": 12.0 },
                    "Unit": {
                        "type": "IFCCONVERSIONBASEDUNIT",
                        "UnitType": { "type": 3, "value": "LENGTHUNIT" },
                        "Name": { "type": 1, "value": "foot" }
                    }
                },
                {
                    "Name": { "value": "Depth" },
                    "NominalValue": { "value": 0.4 },
                    "Unit": { "type": 5, "value": 99 }
                },
                { "Name": { "value": "Load" }, "NominalValue": { "value": 3.0 }, "Unit": { "value": "kN" } }
            ]
        });
        let set = normalize_property_set(&record, &options());
        let units: Vec<(&str, Option<&str>)> = set
            .properties
            .iter()
            .map(|p| (p.name.as_str(), p.unit.as_deref()))
            .collect();
        assert_eq!(
            units,
            vec![
                ("Height", Some("mm")),
                ("Span", Some("foot")),
                ("Depth", None),
                ("Load", Some("kN")),
            ]
        );
        assert_eq!(set.properties[0].formatted(), "2.5 mm");
        assert_eq!(set.properties[2].formatted(), "0.4");
    }

    #[test]
    fn positional_names_can_be_disabled() {
        let record = json!({ "HasProperties": [{ "NominalValue": { "value": 1.0 } }] });
        let set = normalize_property_set(
            &record,
            &NormalizeOptions {
                positional_names: false,
            },
        );
        assert_eq!(set.properties[0].name, "Property 1");
    }

    #[test]
    fn enumerated_values_are_joined() {
        let record = json!({
            "HasProperties": [{
                "Name": { "value": "Finish" },
                "EnumerationValues": [
                    { "label": "IFCLABEL", "value": "Matt" },
                    { "label": "IFCLABEL", "value": "Gloss" }
                ]
            }]
        });
        let set = normalize_property_set(&record, &options());
        assert_eq!(
            set.properties,
            vec![PropertyValue::new("Finish", PropValue::Text("Matt, Gloss".into()), "IFCLABEL")]
        );
    }

    #[test]
    fn scalar_holders_become_properties_structural_fields_do_not() {
        let record = json!({
            "expressID": 9,
            "GlobalId": { "value": "abc" },
            "Description": { "type": 1, "value": "Outer leaf" },
            "Extra": [1, 2, 3]
        });
        let set = normalize_property_set(&record, &options());
        assert_eq!(set.name, "Property Set #9");
        assert_eq!(
            set.properties,
            vec![PropertyValue::new("Description", PropValue::Text("Outer leaf".into()), "string")]
        );
    }

    #[test]
    fn empty_sets_are_dropped() {
        let sets = normalize_property_sets(&[json!({ "Name": { "value": "Empty" } })], &options());
        assert!(sets.is_empty());
    }

    #[test]
    fn type_property_sets_are_suffixed() {
        let types = vec![json!({
            "Name": { "value": "Basic Wall" },
            "HasPropertySets": [
                { "Name": { "value": "Pset_WallCommon" }, "HasProperties": [
                    { "Name": { "value": "AcousticRating" }, "NominalValue": { "value": "R40" } }
                ]},
                { "type": 5, "value": 77 }
            ]
        })];
        let sets = normalize_type_properties(&types, &options());
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name, "Pset_WallCommon (Type)");
        assert_eq!(sets[0].properties[0].name, "AcousticRating");
    }
}
