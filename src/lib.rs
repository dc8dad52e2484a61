//! # IFC Property Inspector
//!
//! A terminal inspector that normalizes the properties, quantities and
//! materials of building elements in IFC files.
//!
//! ## Features
//!
//! - Numeric type codes resolved through a bundled (or user-supplied) schema
//! - Spatial tree walk with a physical-element filter
//! - Property sets, quantity sets and type properties flattened per element
//! - Layer, profile and constituent materials regrouped for display
//! - Export to JSON and CSV, plus a plain-text processing log
//!
//! ## Example
//!
//! ```no_run
//! use ifc_property_inspector::config::PipelineOptions;
//! use ifc_property_inspector::engine::StepEngine;
//! use ifc_property_inspector::pipeline::run;
//! use ifc_property_inspector::process_log::ProcessLog;
//! use ifc_property_inspector::schema::TypeSchema;
//! use ifc_property_inspector::session::ModelSession;
//!
//! let schema = TypeSchema::bundled().expect("bundled schema");
//! let bytes = std::fs::read("model.ifc").expect("readable file");
//! let mut log = ProcessLog::new();
//! let mut session = ModelSession::new(StepEngine::new(schema.clone()));
//! session.open(&bytes, &mut log).expect("valid IFC");
//!
//! let output = run(&session, &schema, &PipelineOptions::default(), &mut log);
//! println!("Elements: {}", output.elements.len());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod process_log;
pub mod schema;
pub mod session;
pub mod ui;
pub mod walker;
pub mod worker;
