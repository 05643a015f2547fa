//! Invoice number extraction.

use super::patterns::INVOICE_NUMBER;
use super::{verbatim, ExtractionMatch, FieldExtractor};
use crate::models::record::Field;

/// Invoice number field extractor.
///
/// Matches "Invoice number" or "Invoice no" (any case), an optional `:` or
/// `-`, then a run of digits. Leading zeros are kept.
pub struct InvoiceNumberExtractor;

impl InvoiceNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InvoiceNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InvoiceNumberExtractor {
    fn field(&self) -> Field {
        Field::InvoiceNumber
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch> {
        INVOICE_NUMBER
            .captures(text)
            .and_then(|caps| ExtractionMatch::from_captures(&caps, 1, verbatim))
    }

    fn extract_all(&self, text: &str) -> Vec<ExtractionMatch> {
        INVOICE_NUMBER
            .captures_iter(text)
            .filter_map(|caps| ExtractionMatch::from_captures(&caps, 1, verbatim))
            .collect()
    }
}

/// Extract the invoice number from text.
pub fn extract_invoice_number(text: &str) -> Option<String> {
    InvoiceNumberExtractor::new().extract(text).map(|m| m.value)
}
