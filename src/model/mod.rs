pub mod element;
pub mod material;
pub mod property;
pub mod raw;
pub mod spatial;

pub use element::{group_by_type, ModelElement, TypeGroup};
pub use material::{MaterialInfo, MaterialPart, PartKind, StructuredMaterial};
pub use property::{PropValue, PropertySet, PropertyValue};
pub use spatial::SpatialNode;
