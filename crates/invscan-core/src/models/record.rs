//! Extracted invoice field record.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Value stored for a field whose pattern did not match.
pub const NOT_FOUND: &str = "Not found";

/// The six fields extracted from an invoice, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Amount,
    InvoiceNumber,
    Seller,
    Client,
    TaxId,
}

impl Field {
    /// All fields in column order.
    pub const ALL: [Field; 6] = [
        Field::Date,
        Field::Amount,
        Field::InvoiceNumber,
        Field::Seller,
        Field::Client,
        Field::TaxId,
    ];

    /// Column label used in tabular output.
    pub fn label(self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Amount => "Amount",
            Field::InvoiceNumber => "Invoice Number",
            Field::Seller => "Seller",
            Field::Client => "Client",
            Field::TaxId => "Tax ID",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One extraction result. Every field holds either a normalized value or [`NOT_FOUND`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    #[serde(rename = "Date")]
    pub date: String,

    #[serde(rename = "Amount")]
    pub amount: String,

    #[serde(rename = "Invoice Number")]
    pub invoice_number: String,

    #[serde(rename = "Seller")]
    pub seller: String,

    #[serde(rename = "Client")]
    pub client: String,

    #[serde(rename = "Tax ID")]
    pub tax_id: String,
}

impl Default for FieldRecord {
    fn default() -> Self {
        Self {
            date: NOT_FOUND.to_string(),
            amount: NOT_FOUND.to_string(),
            invoice_number: NOT_FOUND.to_string(),
            seller: NOT_FOUND.to_string(),
            client: NOT_FOUND.to_string(),
            tax_id: NOT_FOUND.to_string(),
        }
    }
}

impl FieldRecord {
    /// Get a field value by field.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Date => &self.date,
            Field::Amount => &self.amount,
            Field::InvoiceNumber => &self.invoice_number,
            Field::Seller => &self.seller,
            Field::Client => &self.client,
            Field::TaxId => &self.tax_id,
        }
    }

    /// Set a field from a matcher result, storing the sentinel on `None`.
    pub fn set(&mut self, field: Field, value: Option<String>) {
        let value = value.unwrap_or_else(|| NOT_FOUND.to_string());
        match field {
            Field::Date => self.date = value,
            Field::Amount => self.amount = value,
            Field::InvoiceNumber => self.invoice_number = value,
            Field::Seller => self.seller = value,
            Field::Client => self.client = value,
            Field::TaxId => self.tax_id = value,
        }
    }

    /// Whether a field matched.
    pub fn is_found(&self, field: Field) -> bool {
        self.get(field) != NOT_FOUND
    }

    /// Number of fields that matched.
    pub fn found_count(&self) -> usize {
        Field::ALL.iter().filter(|f| self.is_found(**f)).count()
    }

    /// Field values in column order.
    pub fn values(&self) -> [&str; 6] {
        Field::ALL.map(|f| self.get(f))
    }

    /// Parse the amount as a decimal.
    pub fn amount_value(&self) -> Option<Decimal> {
        if !self.is_found(Field::Amount) {
            return None;
        }
        Decimal::from_str(&self.amount).ok()
    }

    /// Parse the date as a calendar date.
    ///
    /// `DD?MM?YYYY` is tried before `YYYY?MM?DD`; separators are ignored.
    pub fn date_value(&self) -> Option<NaiveDate> {
        if !self.is_found(Field::Date) {
            return None;
        }
        let parts: Vec<&str> = self.date.split(['/', '.', '-']).collect();
        let [a, b, c] = parts.as_slice() else {
            return None;
        };

        let (year, month, day) = if a.len() == 4 { (a, b, c) } else { (c, b, a) };
        NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_all_sentinels() {
        let record = FieldRecord::default();
        assert!(record.values().iter().all(|v| *v == NOT_FOUND));
        assert_eq!(record.found_count(), 0);
    }

    #[test]
    fn test_set_none_stores_sentinel() {
        let mut record = FieldRecord::default();
        record.set(Field::Seller, Some("Acme Corp".to_string()));
        assert_eq!(record.seller, "Acme Corp");
        assert_eq!(record.found_count(), 1);

        record.set(Field::Seller, None);
        assert_eq!(record.seller, NOT_FOUND);
    }

    #[test]
    fn test_amount_value() {
        let mut record = FieldRecord::default();
        assert_eq!(record.amount_value(), None);

        record.set(Field::Amount, Some("1234.56".to_string()));
        assert_eq!(record.amount_value(), Some(Decimal::from_str("1234.56").unwrap()));
    }

    #[test]
    fn test_date_value_both_orders() {
        let mut record = FieldRecord::default();
        record.set(Field::Date, Some("05/12/2024".to_string()));
        assert_eq!(record.date_value(), NaiveDate::from_ymd_opt(2024, 12, 5));

        record.set(Field::Date, Some("2024-12-05".to_string()));
        assert_eq!(record.date_value(), NaiveDate::from_ymd_opt(2024, 12, 5));

        record.set(Field::Date, Some("45.13.2024".to_string()));
        assert_eq!(record.date_value(), None);
    }

    #[test]
    fn test_serde_uses_column_labels() {
        let json = serde_json::to_value(FieldRecord::default()).unwrap();
        assert_eq!(json["Invoice Number"], NOT_FOUND);
        assert_eq!(json["Tax ID"], NOT_FOUND);
    }
}
