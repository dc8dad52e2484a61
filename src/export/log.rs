use super::create_file;
use crate::error::ExportError;
use crate::process_log::ProcessLog;
use std::io::Write;
use std::path::Path;

/// Writes the process log as a plain-text transcript, one entry per line.
pub fn export_log<P: AsRef<Path>>(log: &ProcessLog, path: P) -> Result<(), ExportError> {
    let mut file = create_file(path.as_ref())?;
    file.write_all(log.transcript().as_bytes())
        .map_err(|e| ExportError::WriteError {
            message: e.to_string(),
        })
}
