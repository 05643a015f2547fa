//! Date extraction.

use super::patterns::DATE;
use super::{verbatim, ExtractionMatch, FieldExtractor};
use crate::models::record::Field;

/// Date field extractor.
///
/// Reports the date-shaped token exactly as it appears; day/month order is
/// not interpreted here.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    fn field(&self) -> Field {
        Field::Date
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch> {
        DATE.captures(text)
            .and_then(|caps| ExtractionMatch::from_captures(&caps, 1, verbatim))
    }

    fn extract_all(&self, text: &str) -> Vec<ExtractionMatch> {
        DATE.captures_iter(text)
            .filter_map(|caps| ExtractionMatch::from_captures(&caps, 1, verbatim))
            .collect()
    }
}

/// Extract the first date from text.
pub fn extract_date(text: &str) -> Option<String> {
    DateExtractor::new().extract(text).map(|m| m.value)
}
