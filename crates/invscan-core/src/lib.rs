//! Core library for invoice scanning.
//!
//! This crate provides:
//! - A text detection adapter over PaddleOCR models (`pure-onnx-ocr`)
//! - Rule-based extraction of date, amount, invoice number, seller, client and tax ID
//! - Annotated images showing every detected text region
//! - CSV rendering of the extracted fields

pub mod annotate;
pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod serialize;

pub use annotate::Annotator;
pub use error::{AnnotationError, InputError, OcrError, ProcessingError, Result, ScanError};
pub use invoice::rules::ExtractionMatch;
pub use invoice::{extract_fields, ExtractionResult, InvoiceExtractor, InvoiceFieldExtractor};
pub use models::config::ScanConfig;
pub use models::record::{Field, FieldRecord, NOT_FOUND};
pub use ocr::{Detection, DetectionSet, Point, TextDetector};
#[cfg(feature = "native")]
pub use ocr::PureOcrDetector;
pub use pipeline::{validate_and_decode, InvoicePipeline, ScanOutput, ScanResponse};
pub use serialize::{serialize, serialize_all};
