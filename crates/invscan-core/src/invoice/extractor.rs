//! Invoice extractor running every field rule over the joined text.

use tracing::debug;

use crate::models::record::{Field, FieldRecord};

use super::rules::{
    AmountExtractor, DateExtractor, ExtractionMatch, FieldExtractor, InvoiceNumberExtractor,
    PartyExtractor, TaxIdExtractor,
};
use super::InvoiceExtractor;

/// Result of a detailed extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub record: FieldRecord,
    /// Text the rules were run against.
    pub raw_text: String,
    /// The winning match for every field that was found, in column order.
    pub matches: Vec<(Field, ExtractionMatch)>,
}

/// Extractor applying the six field rules independently; the first match of each wins.
pub struct InvoiceFieldExtractor {
    rules: Vec<Box<dyn FieldExtractor + Send + Sync>>,
}

impl InvoiceFieldExtractor {
    /// Create an extractor with the standard rule for every field.
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(DateExtractor::new()),
                Box::new(AmountExtractor::new()),
                Box::new(InvoiceNumberExtractor::new()),
                Box::new(PartyExtractor::seller()),
                Box::new(PartyExtractor::client()),
                Box::new(TaxIdExtractor::new()),
            ],
        }
    }

    /// Extract fields and keep the match that produced each value.
    pub fn extract_detailed(&self, text: &str) -> ExtractionResult {
        let mut record = FieldRecord::default();
        let mut matches = Vec::new();

        for rule in &self.rules {
            let field = rule.field();
            match rule.extract(text) {
                Some(m) => {
                    debug!("{}: {:?} from {:?}", field, m.value, m.source);
                    record.set(field, Some(m.value.clone()));
                    matches.push((field, m));
                }
                None => {
                    debug!("{}: no match", field);
                    record.set(field, None);
                }
            }
        }

        ExtractionResult {
            record,
            raw_text: text.to_string(),
            matches,
        }
    }
}

impl Default for InvoiceFieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceExtractor for InvoiceFieldExtractor {
    fn extract_from_text(&self, text: &str) -> FieldRecord {
        self.extract_detailed(text).record
    }
}

/// Extract all fields from joined text with the standard rules.
pub fn extract_fields(text: &str) -> FieldRecord {
    InvoiceFieldExtractor::new().extract_from_text(text)
}
