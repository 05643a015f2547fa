//! Invoice field extraction module.

mod extractor;
pub mod rules;

pub use extractor::{extract_fields, ExtractionResult, InvoiceFieldExtractor};

use crate::models::record::FieldRecord;
use crate::ocr::DetectionSet;

/// Trait for invoice field extractors.
///
/// Extraction is total: a field that cannot be found is stored as the
/// "Not found" sentinel, never reported as an error.
pub trait InvoiceExtractor {
    /// Extract fields from the joined text of a detection set.
    fn extract(&self, detections: &DetectionSet) -> FieldRecord {
        self.extract_from_text(&detections.joined_text())
    }

    /// Extract fields from plain text.
    fn extract_from_text(&self, text: &str) -> FieldRecord;
}
