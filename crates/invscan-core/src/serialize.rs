//! CSV rendering of field records.

use crate::error::ProcessingError;
use crate::models::record::{Field, FieldRecord};

/// Render one record as a header row plus one data row.
pub fn serialize(record: &FieldRecord) -> Result<String, ProcessingError> {
    serialize_all(std::slice::from_ref(record))
}

/// Render records as a header row plus one row per record.
///
/// Values are quoted only when needed, so commas and quotes inside a value
/// never shift columns.
pub fn serialize_all(records: &[FieldRecord]) -> Result<String, ProcessingError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(Field::ALL.map(Field::label))?;
    for record in records {
        wtr.write_record(record.values())?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ProcessingError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ProcessingError::Serialization(e.to_string()))
}
