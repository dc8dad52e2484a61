//! The parsing engine seam.
//!
//! Everything format-specific lives behind [`IfcEngine`]: the engine owns the
//! parsed model and answers handle-based queries with loosely-shaped JSON
//! records. [`StepEngine`] is the bundled implementation; [`MemoryEngine`]
//! serves prebuilt records.

pub mod memory;
pub mod step;
pub mod step_engine;

use crate::error::EngineError;
use crate::model::SpatialNode;
use serde_json::Value;
use std::fmt;

pub use memory::{MemoryEngine, MemoryModel, Query};
pub use step::{StepEntity, StepFile, StepValue};
pub use step_engine::StepEngine;

/// Engine-issued handle of one open model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandle(pub u32);

impl fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub trait IfcEngine {
    /// Parses a complete file buffer into a new open model.
    fn open_model(&mut self, bytes: &[u8]) -> Result<ModelHandle, EngineError>;

    /// Releases the model. Unknown handles are an error.
    fn close_model(&mut self, handle: ModelHandle) -> Result<(), EngineError>;

    /// Spatial containment tree rooted at the project.
    fn spatial_structure(
        &self,
        handle: ModelHandle,
        include_properties: bool,
    ) -> Result<SpatialNode, EngineError>;

    /// Every expressID in the model, ascending.
    fn all_entity_ids(&self, handle: ModelHandle) -> Result<Vec<u32>, EngineError>;

    /// One entity as a record with references left unresolved.
    fn line(&self, handle: ModelHandle, id: u32) -> Result<Value, EngineError>;

    /// Property and quantity sets attached to an element, references resolved.
    fn property_sets(&self, handle: ModelHandle, id: u32) -> Result<Vec<Value>, EngineError>;

    /// Material associations of an element, references resolved.
    fn materials(&self, handle: ModelHandle, id: u32) -> Result<Vec<Value>, EngineError>;

    /// Type objects of an element with their `HasPropertySets` resolved.
    fn type_properties(&self, handle: ModelHandle, id: u32) -> Result<Vec<Value>, EngineError>;
}
