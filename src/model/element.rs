use super::{MaterialInfo, PropertySet};
use crate::schema::TypeCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A fully normalized element, ready for display and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelElement {
    pub id: u32,
    pub type_code: TypeCode,
    pub type_name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_id: Option<String>,
    pub property_sets: Vec<PropertySet>,
    pub materials: Vec<MaterialInfo>,
}

impl ModelElement {
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.property_sets.iter().map(|s| s.properties.len()).sum()
    }
}

/// Elements sharing one type name, in first-seen element order.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeGroup {
    pub type_name: String,
    pub element_indices: Vec<usize>,
}

/// Groups elements by `type_name`, sorted by type name.
#[must_use]
pub fn group_by_type(elements: &[ModelElement]) -> Vec<TypeGroup> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, element) in elements.iter().enumerate() {
        groups.entry(&element.type_name).or_default().push(index);
    }

    groups
        .into_iter()
        .map(|(type_name, element_indices)| TypeGroup {
            type_name: type_name.to_string(),
            element_indices,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element(id: u32, type_name: &str) -> ModelElement {
        ModelElement {
            id,
            type_code: TypeCode::Name(type_name.to_string()),
            type_name: type_name.to_string(),
            display_name: format!("{type_name} #{id}"),
            global_id: None,
            property_sets: Vec::new(),
            materials: Vec::new(),
        }
    }

    #[test]
    fn groups_sorted_by_type_keep_element_order() {
        let elements = vec![
            element(10, "IFCWALL"),
            element(11, "IFCDOOR"),
            element(12, "IFCWALL"),
        ];
        let groups = group_by_type(&elements);
        assert_eq!(
            groups,
            vec![
                TypeGroup {
                    type_name: "IFCDOOR".into(),
                    element_indices: vec![1],
                },
                TypeGroup {
                    type_name: "IFCWALL".into(),
                    element_indices: vec![0, 2],
                },
            ]
        );
    }

    #[test]
    fn serializes_camel_case_fields() {
        let json = serde_json::to_value(element(7, "IFCSLAB")).unwrap();
        assert_eq!(json["typeName"], "IFCSLAB");
        assert_eq!(json["displayName"], "IFCSLAB #7");
        assert_eq!(json["typeCode"], "IFCSLAB");
        assert!(json.get("globalId").is_none());
    }
}
