//! Regex patterns for invoice field extraction.
//!
//! Every pattern runs against the space-joined detection text and reports
//! its first match. Labels are matched case-sensitively except the invoice
//! number label.

use lazy_static::lazy_static;
use regex::Regex;

/// Currency symbols accepted in front of an amount.
pub const CURRENCY_SYMBOLS: [char; 3] = ['$', '€', '₺'];

lazy_static! {
    // DD/MM/YYYY or YYYY/MM/DD, separators `/`, `.` or `-`
    pub static ref DATE: Regex = Regex::new(
        r"(\d{2}[/.\-]\d{2}[/.\-]\d{4}|\d{4}[/.\-]\d{2}[/.\-]\d{2})"
    ).unwrap();

    // Label, then anything up to the first digit or currency symbol, then the amount
    pub static ref AMOUNT: Regex = Regex::new(
        r"(Total|Amount\s*due|Paid)[^\d$€₺]*([$€₺]?\s?[\d\s]{1,10}[.,]\d{2})"
    ).unwrap();

    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i:invoice\s*(?:number|no))\s*[:\-]?\s*(\d+)"
    ).unwrap();

    // Party name runs up to a 3-5 digit number (street number, postal code)
    pub static ref SELLER: Regex = Regex::new(
        r"Seller[:\-]?\s*([A-Z][^\d]+?)\s\d{3,5}"
    ).unwrap();

    pub static ref CLIENT: Regex = Regex::new(
        r"Client[:\-]?\s*([A-Z][^\d]+?)\s\d{3,5}"
    ).unwrap();

    pub static ref TAX_ID: Regex = Regex::new(
        r"Tax\s*ID[:\-]?\s*([\d\-]+)"
    ).unwrap();
}
