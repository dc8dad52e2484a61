//! In-memory engine serving prebuilt records.
//!
//! Useful for replaying records captured from another engine and for tests:
//! queries can be made to fail per element to exercise the failure policy.

use super::{IfcEngine, ModelHandle};
use crate::error::EngineError;
use crate::model::SpatialNode;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    Line,
    PropertySets,
    Materials,
    TypeProperties,
}

impl Query {
    fn name(self) -> &'static str {
        match self {
            Query::Line => "line",
            Query::PropertySets => "property sets",
            Query::Materials => "materials",
            Query::TypeProperties => "type properties",
        }
    }
}

/// The records one opened model answers with.
#[derive(Debug, Clone, Default)]
pub struct MemoryModel {
    tree: Option<SpatialNode>,
    lines: BTreeMap<u32, Value>,
    property_sets: HashMap<u32, Vec<Value>>,
    materials: HashMap<u32, Vec<Value>>,
    type_properties: HashMap<u32, Vec<Value>>,
    failures: HashSet<(Query, u32)>,
}

impl MemoryModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tree(mut self, tree: SpatialNode) -> Self {
        self.tree = Some(tree);
        self
    }

    #[must_use]
    pub fn with_line(mut self, id: u32, line: Value) -> Self {
        self.lines.insert(id, line);
        self
    }

    #[must_use]
    pub fn with_property_sets(mut self, id: u32, sets: Vec<Value>) -> Self {
        self.property_sets.insert(id, sets);
        self
    }

    #[must_use]
    pub fn with_materials(mut self, id: u32, materials: Vec<Value>) -> Self {
        self.materials.insert(id, materials);
        self
    }

    #[must_use]
    pub fn with_type_properties(mut self, id: u32, types: Vec<Value>) -> Self {
        self.type_properties.insert(id, types);
        self
    }

    /// Makes `query` fail for element `id`.
    #[must_use]
    pub fn failing(mut self, query: Query, id: u32) -> Self {
        self.failures.insert((query, id));
        self
    }

    fn check(&self, query: Query, id: u32) -> Result<(), EngineError> {
        if self.failures.contains(&(query, id)) {
            return Err(EngineError::query(query.name(), format!("injected failure for #{id}")));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryEngine {
    model: MemoryModel,
    open: HashSet<u32>,
    next_handle: u32,
    closed: Rc<RefCell<Vec<ModelHandle>>>,
    fail_close: bool,
}

impl MemoryEngine {
    #[must_use]
    pub fn new(model: MemoryModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    /// Every handle closed so far, shared so it can be read after the engine is dropped.
    #[must_use]
    pub fn closed_handles(&self) -> Rc<RefCell<Vec<ModelHandle>>> {
        Rc::clone(&self.closed)
    }

    /// Makes every `close_model` call fail after releasing the handle.
    #[must_use]
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    fn ensure_open(&self, handle: ModelHandle) -> Result<&MemoryModel, EngineError> {
        if self.open.contains(&handle.0) {
            Ok(&self.model)
        } else {
            Err(EngineError::UnknownHandle(handle.0))
        }
    }
}

impl IfcEngine for MemoryEngine {
    fn open_model(&mut self, bytes: &[u8]) -> Result<ModelHandle, EngineError> {
        if bytes.is_empty() {
            return Err(EngineError::Open {
                message: "empty buffer".to_string(),
            });
        }
        let handle = ModelHandle(self.next_handle);
        self.next_handle += 1;
        self.open.insert(handle.0);
        Ok(handle)
    }

    fn close_model(&mut self, handle: ModelHandle) -> Result<(), EngineError> {
        if !self.open.remove(&handle.0) {
            return Err(EngineError::UnknownHandle(handle.0));
        }
        self.closed.borrow_mut().push(handle);
        if self.fail_close {
            return Err(EngineError::query("close", "injected failure"));
        }
        Ok(())
    }

    fn spatial_structure(
        &self,
        handle: ModelHandle,
        _include_properties: bool,
    ) -> Result<SpatialNode, EngineError> {
        self.ensure_open(handle)?
            .tree
            .clone()
            .ok_or_else(|| EngineError::query("spatial structure", "no spatial tree"))
    }

    fn all_entity_ids(&self, handle: ModelHandle) -> Result<Vec<u32>, EngineError> {
        Ok(self.ensure_open(handle)?.lines.keys().copied().collect())
    }

    fn line(&self, handle: ModelHandle, id: u32) -> Result<Value, EngineError> {
        let model = self.ensure_open(handle)?;
        model.check(Query::Line, id)?;
        model
            .lines
            .get(&id)
            .cloned()
            .ok_or(EngineError::UnknownEntity(id))
    }

    fn property_sets(&self, handle: ModelHandle, id: u32) -> Result<Vec<Value>, EngineError> {
        let model = self.ensure_open(handle)?;
        model.check(Query::PropertySets, id)?;
        Ok(model.property_sets.get(&id).cloned().unwrap_or_default())
    }

    fn materials(&self, handle: ModelHandle, id: u32) -> Result<Vec<Value>, EngineError> {
        let model = self.ensure_open(handle)?;
        model.check(Query::Materials, id)?;
        Ok(model.materials.get(&id).cloned().unwrap_or_default())
    }

    fn type_properties(&self, handle: ModelHandle, id: u32) -> Result<Vec<Value>, EngineError> {
        let model = self.ensure_open(handle)?;
        model.check(Query::TypeProperties, id)?;
        Ok(model.type_properties.get(&id).cloned().unwrap_or_default())
    }
}
