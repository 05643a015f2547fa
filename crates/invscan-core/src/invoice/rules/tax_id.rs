//! Tax identification number extraction.

use super::patterns::TAX_ID;
use super::{verbatim, ExtractionMatch, FieldExtractor};
use crate::models::record::Field;

/// Tax ID field extractor. Reports the digit-and-hyphen run after "Tax ID".
pub struct TaxIdExtractor;

impl TaxIdExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TaxIdExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TaxIdExtractor {
    fn field(&self) -> Field {
        Field::TaxId
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch> {
        TAX_ID
            .captures(text)
            .and_then(|caps| ExtractionMatch::from_captures(&caps, 1, verbatim))
    }

    fn extract_all(&self, text: &str) -> Vec<ExtractionMatch> {
        TAX_ID
            .captures_iter(text)
            .filter_map(|caps| ExtractionMatch::from_captures(&caps, 1, verbatim))
            .collect()
    }
}

/// Extract the tax ID from text.
pub fn extract_tax_id(text: &str) -> Option<String> {
    TaxIdExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_tax_id_with_hyphens() {
        assert_eq!(extract_tax_id("Tax ID: 12-3456789"), Some("12-3456789".to_string()));
    }

    #[test]
    fn test_extract_tax_id_compact_label() {
        assert_eq!(extract_tax_id("TaxID-987654321"), Some("987654321".to_string()));
    }

    #[test]
    fn test_tax_id_stops_at_space() {
        assert_eq!(extract_tax_id("Tax ID 123 456"), Some("123".to_string()));
    }

    #[test]
    fn test_tax_id_missing() {
        assert_eq!(extract_tax_id("Tax: 5"), None);
        assert_eq!(extract_tax_id("Tax ID: pending"), None);
    }
}
