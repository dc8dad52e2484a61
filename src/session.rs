//! Lifecycle of one open model.
//!
//! The engine holds native memory for every open model, so the session keeps
//! at most one handle live: opening a new buffer closes the previous model,
//! and dropping the session closes whatever is still open.

use crate::engine::{IfcEngine, ModelHandle};
use crate::error::EngineError;
use crate::model::SpatialNode;
use crate::process_log::ProcessLog;
use serde_json::Value;

pub struct ModelSession<E: IfcEngine> {
    engine: E,
    handle: Option<ModelHandle>,
}

impl<E: IfcEngine> ModelSession<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            handle: None,
        }
    }

    /// Opens a new model, closing the previous one first.
    pub fn open(&mut self, bytes: &[u8], log: &mut ProcessLog) -> Result<ModelHandle, EngineError> {
        self.close(log);
        let handle = self.engine.open_model(bytes)?;
        self.handle = Some(handle);
        log.info(format!("Opened model {handle} ({} bytes)", bytes.len()));
        Ok(handle)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Result<ModelHandle, EngineError> {
        self.handle.ok_or(EngineError::NotOpen)
    }

    pub fn spatial_tree(&self, include_properties: bool) -> Result<SpatialNode, EngineError> {
        self.engine
            .spatial_structure(self.handle()?, include_properties)
    }

    pub fn all_entity_ids(&self) -> Result<Vec<u32>, EngineError> {
        self.engine.all_entity_ids(self.handle()?)
    }

    pub fn line(&self, id: u32) -> Result<Value, EngineError> {
        self.engine.line(self.handle()?, id)
    }

    pub fn property_sets(&self, id: u32) -> Result<Vec<Value>, EngineError> {
        self.engine.property_sets(self.handle()?, id)
    }

    pub fn materials(&self, id: u32) -> Result<Vec<Value>, EngineError> {
        self.engine.materials(self.handle()?, id)
    }

    pub fn type_properties(&self, id: u32) -> Result<Vec<Value>, EngineError> {
        self.engine.type_properties(self.handle()?, id)
    }

    /// Closes the open model, if any. Engine errors are logged, never returned.
    pub fn close(&mut self, log: &mut ProcessLog) {
        if let Some(handle) = self.handle.take() {
            match self.engine.close_model(handle) {
                Ok(()) => log.info(format!("Closed model {handle}")),
                Err(err) => log.warn(format!("Closing model {handle} failed: {err}")),
            }
        }
    }
}

impl<E: IfcEngine> Drop for ModelSession<E> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = self.engine.close_model(handle) {
                tracing::warn!(handle = handle.0, error = %err, "Closing model on drop failed");
            }
        }
    }
}
