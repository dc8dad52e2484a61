//! Error types for IFC Property Inspector.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading the type schema resource.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema resource could not be read.
    #[error("failed to read schema '{path}': {source}")]
    Unreachable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The resource was read but contained no `export const NAME = NUMBER;` lines.
    #[error("schema resource contains no type constants")]
    NoEntries,
}

/// Errors raised by the STEP reader behind the bundled engine.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The STEP format is invalid or malformed.
    #[error("invalid STEP format: {message}")]
    InvalidStep { message: String },
}

/// Errors reported by an [`IfcEngine`](crate::engine::IfcEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected the buffer as a model.
    #[error("failed to open model: {message}")]
    Open { message: String },

    /// A query against an open model failed.
    #[error("{query} query failed: {message}")]
    Query {
        query: &'static str,
        message: String,
    },

    /// The handle does not refer to an open model.
    #[error("model handle {0} is not open")]
    UnknownHandle(u32),

    /// The session has no open model.
    #[error("no model is open")]
    NotOpen,

    /// No entity with this expressID exists in the model.
    #[error("entity #{0} not found")]
    UnknownEntity(u32),
}

impl EngineError {
    pub fn query(query: &'static str, message: impl Into<String>) -> Self {
        EngineError::Query {
            query,
            message: message.into(),
        }
    }
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        EngineError::Open {
            message: err.to_string(),
        }
    }
}

/// Errors surfaced by the background engine worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker thread hung up before answering.
    #[error("engine worker disconnected")]
    Disconnected,

    /// The worker reported a failure while processing the buffer.
    #[error("engine worker failed: {message}")]
    Failed { message: String },
}

/// Errors that can occur when exporting data.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the file.
    #[error("failed to write data: {message}")]
    WriteError { message: String },

    /// Failed to serialize data to JSON.
    #[error("JSON serialization failed: {source}")]
    JsonSerialize {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to write CSV data.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },
}
