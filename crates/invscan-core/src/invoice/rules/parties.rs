//! Seller and client name extraction.

use regex::Regex;

use super::patterns::{CLIENT, SELLER};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::record::Field;

/// Which party of the invoice to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRole {
    Seller,
    Client,
}

impl PartyRole {
    fn pattern(self) -> &'static Regex {
        match self {
            PartyRole::Seller => &*SELLER,
            PartyRole::Client => &*CLIENT,
        }
    }
}

/// Party name extractor.
///
/// The name starts with an uppercase letter after the label and runs up to
/// the first 3-5 digit number. Without that trailing number nothing is
/// extracted, even when the label is present.
pub struct PartyExtractor {
    role: PartyRole,
}

impl PartyExtractor {
    pub fn new(role: PartyRole) -> Self {
        Self { role }
    }

    pub fn seller() -> Self {
        Self::new(PartyRole::Seller)
    }

    pub fn client() -> Self {
        Self::new(PartyRole::Client)
    }
}

impl FieldExtractor for PartyExtractor {
    fn field(&self) -> Field {
        match self.role {
            PartyRole::Seller => Field::Seller,
            PartyRole::Client => Field::Client,
        }
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch> {
        self.role
            .pattern()
            .captures(text)
            .and_then(|caps| ExtractionMatch::from_captures(&caps, 1, trim_name))
    }

    fn extract_all(&self, text: &str) -> Vec<ExtractionMatch> {
        self.role
            .pattern()
            .captures_iter(text)
            .filter_map(|caps| ExtractionMatch::from_captures(&caps, 1, trim_name))
            .collect()
    }
}

fn trim_name(s: &str) -> String {
    s.trim().to_string()
}

/// Extract the seller name from text.
pub fn extract_seller(text: &str) -> Option<String> {
    PartyExtractor::seller().extract(text).map(|m| m.value)
}

/// Extract the client name from text.
pub fn extract_client(text: &str) -> Option<String> {
    PartyExtractor::client().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_seller() {
        assert_eq!(
            extract_seller("Seller: Acme Corp 12345"),
            Some("Acme Corp".to_string())
        );
    }

    #[test]
    fn test_seller_requires_trailing_number() {
        assert_eq!(extract_seller("Seller: Acme Corp"), None);
        assert_eq!(extract_seller("Seller: Acme Corp 12"), None);
    }

    #[test]
    fn test_name_must_start_uppercase() {
        assert_eq!(extract_seller("Seller: acme corp 12345"), None);
    }

    #[test]
    fn test_extract_client_stops_at_first_number() {
        let text = "Seller: Acme Corp 12345 Client- Globex Ltd 4000 Springfield";
        assert_eq!(extract_client(text), Some("Globex Ltd".to_string()));
        assert_eq!(extract_seller(text), Some("Acme Corp".to_string()));
    }

    #[test]
    fn test_name_keeps_punctuation() {
        assert_eq!(
            extract_seller("Seller: Acme Corp, Main St. 123"),
            Some("Acme Corp, Main St.".to_string())
        );
    }

    #[test]
    fn test_field_by_role() {
        assert_eq!(PartyExtractor::seller().field(), Field::Seller);
        assert_eq!(PartyExtractor::client().field(), Field::Client);
    }
}
