use super::create_file;
use crate::error::ExportError;
use crate::model::ModelElement;
use std::path::Path;

const HEADER: [&str; 7] = [
    "Element ID",
    "Type",
    "Name",
    "Property Set",
    "Property",
    "Value",
    "Unit",
];

/// Writes one row per property of every element.
pub fn export_csv<P: AsRef<Path>>(elements: &[ModelElement], path: P) -> Result<(), ExportError> {
    let file = create_file(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(HEADER)?;

    for element in elements {
        let id = element.id.to_string();
        for set in &element.property_sets {
            for property in &set.properties {
                let value = property.value.to_string();
                writer.write_record([
                    id.as_str(),
                    element.type_name.as_str(),
                    element.display_name.as_str(),
                    set.name.as_str(),
                    property.name.as_str(),
                    value.as_str(),
                    property.unit.as_deref().unwrap_or_default(),
                ])?;
            }
        }
    }

    writer.flush().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })?;

    Ok(())
}
