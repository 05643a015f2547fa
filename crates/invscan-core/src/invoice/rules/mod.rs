//! Rule-based field extractors.
//!
//! Each extractor is a stateless matcher over the joined detection text.
//! Matchers share nothing but the compiled patterns, so they can be run and
//! tested independently.

pub mod amounts;
pub mod dates;
pub mod invoice_number;
pub mod parties;
pub mod patterns;
pub mod tax_id;

pub use amounts::{extract_amount, normalize_amount, AmountExtractor};
pub use dates::{extract_date, DateExtractor};
pub use invoice_number::{extract_invoice_number, InvoiceNumberExtractor};
pub use parties::{extract_client, extract_seller, PartyExtractor, PartyRole};
pub use tax_id::{extract_tax_id, TaxIdExtractor};

use regex::Captures;

use crate::models::record::Field;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The field this extractor fills.
    fn field(&self) -> Field;

    /// Extract the first occurrence of the field.
    fn extract(&self, text: &str) -> Option<ExtractionMatch>;

    /// Extract all non-overlapping occurrences, in scan order.
    fn extract_all(&self, text: &str) -> Vec<ExtractionMatch>;
}

/// A normalized field value and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch {
    /// Normalized value.
    pub value: String,
    /// Full text matched by the pattern, label included.
    pub source: String,
    /// Byte range of `source` in the searched text.
    pub position: (usize, usize),
}

impl ExtractionMatch {
    /// Build a match from one capture group, normalizing its text.
    ///
    /// Returns `None` when the group did not participate or normalizes to nothing.
    pub fn from_captures(
        caps: &Captures<'_>,
        group: usize,
        normalize: impl Fn(&str) -> String,
    ) -> Option<Self> {
        let full = caps.get(0)?;
        let value = normalize(caps.get(group)?.as_str());
        if value.is_empty() {
            return None;
        }

        Some(Self {
            value,
            source: full.as_str().to_string(),
            position: (full.start(), full.end()),
        })
    }
}

/// Value normalizer that keeps the captured text unchanged.
pub(crate) fn verbatim(s: &str) -> String {
    s.to_string()
}
