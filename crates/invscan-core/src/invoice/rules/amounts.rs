//! Amount extraction.

use super::patterns::{AMOUNT, CURRENCY_SYMBOLS};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::record::Field;

/// Amount field extractor.
///
/// Looks for a number with two decimals after a "Total", "Amount due" or
/// "Paid" label.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    fn field(&self) -> Field {
        Field::Amount
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch> {
        AMOUNT
            .captures(text)
            .and_then(|caps| ExtractionMatch::from_captures(&caps, 2, normalize_amount))
    }

    fn extract_all(&self, text: &str) -> Vec<ExtractionMatch> {
        AMOUNT
            .captures_iter(text)
            .filter_map(|caps| ExtractionMatch::from_captures(&caps, 2, normalize_amount))
            .collect()
    }
}

/// Extract the first labeled amount from text.
pub fn extract_amount(text: &str) -> Option<String> {
    AmountExtractor::new().extract(text).map(|m| m.value)
}

/// Normalize a matched amount (e.g., "€ 1 234,56" -> "1234.56").
///
/// Drops whitespace and the currency symbol. A comma can only appear as the
/// separator before the two decimals, so it becomes a decimal point.
pub fn normalize_amount(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_SYMBOLS.contains(c))
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_amount() {
        assert_eq!(normalize_amount("1 234,56"), "1234.56");
        assert_eq!(normalize_amount("$ 1 000.00"), "1000.00");
        assert_eq!(normalize_amount("€99,90"), "99.90");
        assert_eq!(normalize_amount("1234.56"), "1234.56");
    }

    #[test]
    fn test_extract_total_with_comma_decimals() {
        assert_eq!(extract_amount("Total: 1 234,56"), Some("1234.56".to_string()));
    }

    #[test]
    fn test_extract_amount_due_with_currency() {
        assert_eq!(
            extract_amount("Total Amount due $ 1 000.00"),
            Some("1000.00".to_string())
        );
        assert_eq!(extract_amount("Paid ₺250,00 thanks"), Some("250.00".to_string()));
    }

    #[test]
    fn test_label_skips_non_digit_text() {
        assert_eq!(
            extract_amount("Amount due (incl. VAT): 49.99"),
            Some("49.99".to_string())
        );
    }

    #[test]
    fn test_amount_requires_label() {
        assert_eq!(extract_amount("Price 12.00"), None);
        // Labels are case-sensitive
        assert_eq!(extract_amount("Subtotal 12.00"), None);
        assert_eq!(extract_amount("Total 12.00"), Some("12.00".to_string()));
    }

    #[test]
    fn test_amount_requires_two_decimals() {
        assert_eq!(extract_amount("Total 100"), None);
        assert_eq!(extract_amount(""), None);
    }

    #[test]
    fn test_extract_all_amounts() {
        let all = AmountExtractor::new().extract_all("Total 10.00 Paid 5,50");
        let values: Vec<_> = all.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, ["10.00", "5.50"]);
    }
}
