//! Data models shared across the pipeline.

pub mod config;
pub mod record;

pub use config::{AnnotationConfig, ModelConfig, OcrConfig, ScanConfig};
pub use record::{Field, FieldRecord, NOT_FOUND};
