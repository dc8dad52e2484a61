//! Flattening of raw engine records into display models.

pub mod materials;
pub mod properties;
pub mod structured;

pub use materials::{classify_material, normalize_materials, MaterialKind};
pub use properties::{
    normalize_property_set, normalize_property_sets, normalize_type_properties, TYPE_SET_SUFFIX,
};
pub use structured::organize_structured_materials;
