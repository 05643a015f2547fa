//! Error types for the invscan-core library.

use thiserror::Error;

/// Main error type for the invscan library.
///
/// Failures split into two classes: [`ScanError::Input`] is the caller's
/// fault and is raised before any detection runs, while
/// [`ScanError::Processing`] covers everything that goes wrong inside the
/// pipeline. Either one fails the whole request.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The submitted bytes are not a usable image.
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    /// A pipeline stage failed.
    #[error("processing error: {0}")]
    Processing(#[from] ProcessingError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Whether the failure was caused by the submitted input rather than the pipeline.
    pub fn is_input_error(&self) -> bool {
        matches!(self, ScanError::Input(_))
    }
}

impl From<OcrError> for ScanError {
    fn from(err: OcrError) -> Self {
        ScanError::Processing(ProcessingError::Ocr(err))
    }
}

impl From<AnnotationError> for ScanError {
    fn from(err: AnnotationError) -> Self {
        ScanError::Processing(ProcessingError::Annotation(err))
    }
}

/// Input validation failures, reported before the pipeline runs.
#[derive(Error, Debug)]
pub enum InputError {
    /// No bytes were submitted.
    #[error("file is empty")]
    Empty,

    /// The bytes do not carry a recognizable image signature.
    #[error("file must be an image")]
    NotAnImage,

    /// The image format was recognized but decoding failed.
    #[error("invalid image file: {0}")]
    Decode(String),
}

/// Failures inside the pipeline.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// Text detection failed.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Drawing or encoding the annotated image failed.
    #[error("annotation error: {0}")]
    Annotation(#[from] AnnotationError),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The serialized table could not be finalized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Errors related to the text detection engine.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text detection or recognition failed.
    #[error("text detection failed: {0}")]
    Detection(String),
}

/// Errors related to rendering the annotated image.
#[derive(Error, Debug)]
pub enum AnnotationError {
    /// The label font could not be loaded.
    #[error("failed to load font {path}: {reason}")]
    Font { path: String, reason: String },

    /// JPEG encoding failed.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Result type for the invscan library.
pub type Result<T> = std::result::Result<T, ScanError>;
