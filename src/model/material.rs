use super::{PropValue, PropertyValue};
use serde::{Deserialize, Serialize};

pub const LAYER_MATERIAL: &str = "Layer Material";
pub const PROFILE_MATERIAL: &str = "Profile Material";
pub const CONSTITUENT_MATERIAL: &str = "Constituent Material";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<PropertyValue>>,
}

impl MaterialInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            description: None,
            properties: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn push_property(&mut self, property: PropertyValue) {
        self.properties.get_or_insert_with(Vec::new).push(property);
    }

    #[must_use]
    pub fn properties(&self) -> &[PropertyValue] {
        self.properties.as_deref().unwrap_or_default()
    }
}

/// Kind of nested part inside a composite material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartKind {
    Layer,
    Profile,
    Constituent,
}

impl PartKind {
    /// Prefix of the synthetic property names, e.g. `Layer 2: Concrete`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PartKind::Layer => "Layer",
            PartKind::Profile => "Profile",
            PartKind::Constituent => "Constituent",
        }
    }

    #[must_use]
    pub fn material_category(self) -> &'static str {
        match self {
            PartKind::Layer => LAYER_MATERIAL,
            PartKind::Profile => PROFILE_MATERIAL,
            PartKind::Constituent => CONSTITUENT_MATERIAL,
        }
    }

    #[must_use]
    pub fn value_kind(self) -> &'static str {
        match self {
            PartKind::Layer => "LayerThickness",
            PartKind::Profile => "ProfileName",
            PartKind::Constituent => "ConstituentFraction",
        }
    }
}

/// One layer, profile or constituent of a composite material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialPart {
    pub index: usize,
    pub material: String,
    pub value: PropValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<MaterialInfo>,
}

/// Materials regrouped into typed structures for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StructuredMaterial {
    Simple(MaterialInfo),
    LayerSet { name: String, layers: Vec<MaterialPart> },
    ProfileSet { name: String, profiles: Vec<MaterialPart> },
    ConstituentSet { name: String, constituents: Vec<MaterialPart> },
}

impl StructuredMaterial {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            StructuredMaterial::Simple(info) => &info.name,
            StructuredMaterial::LayerSet { name, .. }
            | StructuredMaterial::ProfileSet { name, .. }
            | StructuredMaterial::ConstituentSet { name, .. } => name,
        }
    }

    #[must_use]
    pub fn parts(&self) -> &[MaterialPart] {
        match self {
            StructuredMaterial::Simple(_) => &[],
            StructuredMaterial::LayerSet { layers, .. } => layers,
            StructuredMaterial::ProfileSet { profiles, .. } => profiles,
            StructuredMaterial::ConstituentSet { constituents, .. } => constituents,
        }
    }

    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            StructuredMaterial::Simple(_) => "Simple",
            StructuredMaterial::LayerSet { .. } => "LayerSet",
            StructuredMaterial::ProfileSet { .. } => "ProfileSet",
            StructuredMaterial::ConstituentSet { .. } => "ConstituentSet",
        }
    }
}
