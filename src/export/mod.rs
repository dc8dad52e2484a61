//! File exports of normalized elements and the process log.

pub mod csv;
pub mod json;
pub mod log;

pub use crate::error::ExportError;
pub use csv::export_csv;
pub use json::export_json;
pub use log::export_log;

use std::fs::File;
use std::path::Path;

fn create_file(path: &Path) -> Result<File, ExportError> {
    File::create(path).map_err(|source| ExportError::FileCreate {
        path: path.to_path_buf(),
        source,
    })
}
