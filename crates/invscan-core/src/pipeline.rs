//! End-to-end scan pipeline: detection, field extraction, annotation, CSV.

use std::sync::Arc;
use std::time::Instant;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info};

use crate::annotate::Annotator;
use crate::error::{InputError, Result};
use crate::invoice::rules::ExtractionMatch;
use crate::invoice::InvoiceFieldExtractor;
use crate::models::record::{Field, FieldRecord};
use crate::ocr::{DetectionSet, TextDetector};
use crate::serialize::serialize;

/// Everything produced for one image.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    /// Detections reported by the text detector.
    pub detections: DetectionSet,
    /// Extracted fields.
    pub record: FieldRecord,
    /// The match behind each found field of `record`, in column order.
    pub matches: Vec<(Field, ExtractionMatch)>,
    /// `record` rendered as CSV.
    pub csv_data: String,
    /// JPEG with the detection overlay.
    pub annotated_image: Vec<u8>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ScanOutput {
    /// The two-part payload handed back to the caller.
    pub fn into_response(self) -> ScanResponse {
        ScanResponse {
            csv_data: self.csv_data,
            annotated_image: self.annotated_image,
        }
    }
}

/// Response payload: the CSV table and the annotated image.
///
/// The image serializes as standard base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub csv_data: String,
    #[serde(serialize_with = "as_base64", deserialize_with = "from_base64")]
    pub annotated_image: Vec<u8>,
}

fn as_base64<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64.encode(bytes))
}

fn from_base64<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    BASE64.decode(encoded).map_err(serde::de::Error::custom)
}

/// Check that `bytes` hold an image and decode it.
///
/// This is the caller-side gate: the pipeline itself assumes a decoded image.
pub fn validate_and_decode(bytes: &[u8]) -> std::result::Result<DynamicImage, InputError> {
    if bytes.is_empty() {
        return Err(InputError::Empty);
    }

    let format = image::guess_format(bytes).map_err(|_| InputError::NotAnImage)?;
    debug!("Detected image format: {:?}", format);

    image::load_from_memory_with_format(bytes, format).map_err(|e| InputError::Decode(e.to_string()))
}

/// Scan pipeline sharing one text detector across requests.
pub struct InvoicePipeline {
    detector: Arc<dyn TextDetector>,
    extractor: InvoiceFieldExtractor,
    annotator: Annotator,
}

impl InvoicePipeline {
    /// Create a pipeline around an already-initialized detector.
    pub fn new(detector: Arc<dyn TextDetector>, annotator: Annotator) -> Self {
        Self {
            detector,
            extractor: InvoiceFieldExtractor::new(),
            annotator,
        }
    }

    /// Validate, decode and process raw image bytes.
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<ScanOutput> {
        let image = validate_and_decode(bytes)?;
        self.process(&image)
    }

    /// Process a decoded image.
    ///
    /// Any stage failure fails the whole call; no partial output is returned.
    pub fn process(&self, image: &DynamicImage) -> Result<ScanOutput> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        info!("Processing image: {}x{}", width, height);

        let detections = self.detector.detect(image)?;
        debug!("Detected {} text regions", detections.len());

        let joined = detections.joined_text();
        let extraction = self.extractor.extract_detailed(&joined);
        let record = extraction.record;
        debug!("Extracted {}/6 fields", record.found_count());

        let annotated_image = self.annotator.annotate(image, &detections)?;
        let csv_data = serialize(&record)?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Scan complete: {} regions, {} fields in {}ms",
            detections.len(),
            record.found_count(),
            processing_time_ms
        );

        Ok(ScanOutput {
            detections,
            record,
            matches: extraction.matches,
            csv_data,
            annotated_image,
            processing_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OcrError, ProcessingError, ScanError};
    use crate::models::config::AnnotationConfig;
    use crate::models::record::NOT_FOUND;
    use crate::ocr::{Detection, Point};
    use image::{Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Detector returning a fixed set of detections.
    struct StubDetector {
        detections: DetectionSet,
        calls: AtomicUsize,
    }

    impl StubDetector {
        fn new(texts: &[&str]) -> Self {
            let detections = texts
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    let y = 4 + 12 * i as i32;
                    Detection::new(
                        [
                            Point::new(4, y),
                            Point::new(60, y),
                            Point::new(60, y + 10),
                            Point::new(4, y + 10),
                        ],
                        *text,
                        0.95,
                    )
                })
                .collect::<Vec<_>>();

            Self {
                detections: detections.into(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TextDetector for StubDetector {
        fn detect(&self, _image: &DynamicImage) -> std::result::Result<DetectionSet, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.detections.clone())
        }
    }

    struct FailingDetector;

    impl TextDetector for FailingDetector {
        fn detect(&self, _image: &DynamicImage) -> std::result::Result<DetectionSet, OcrError> {
            Err(OcrError::Detection("model crashed".to_string()))
        }
    }

    fn pipeline(detector: Arc<dyn TextDetector>) -> InvoicePipeline {
        InvoicePipeline::new(detector, Annotator::without_font(AnnotationConfig::default()))
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_end_to_end_amount_only() {
        let detector = Arc::new(StubDetector::new(&["Total Amount due $ 1 000.00"]));
        let output = pipeline(detector).process_bytes(&png_bytes(64, 32)).unwrap();

        assert_eq!(output.record.amount, "1000.00");
        assert_eq!(output.record.date, NOT_FOUND);
        assert_eq!(output.record.invoice_number, NOT_FOUND);
        assert_eq!(output.record.seller, NOT_FOUND);
        assert_eq!(output.record.client, NOT_FOUND);
        assert_eq!(output.record.tax_id, NOT_FOUND);

        let mut lines = output.csv_data.lines();
        assert_eq!(lines.next(), Some("Date,Amount,Invoice Number,Seller,Client,Tax ID"));
        assert_eq!(
            lines.next(),
            Some("Not found,1000.00,Not found,Not found,Not found,Not found")
        );

        assert_eq!(output.matches.len(), 1);
        let (field, m) = &output.matches[0];
        assert_eq!(*field, Field::Amount);
        assert_eq!(m.value, output.record.amount);
        assert_eq!(m.source, "Total Amount due $ 1 000.00");

        let annotated = image::load_from_memory(&output.annotated_image).unwrap();
        assert_eq!((annotated.width(), annotated.height()), (64, 32));
    }

    #[test]
    fn test_detections_are_joined_in_order() {
        let detector = Arc::new(StubDetector::new(&["Seller:", "Acme Corp", "12345"]));
        let image = DynamicImage::ImageRgb8(RgbImage::new(64, 48));

        let output = pipeline(detector).process(&image).unwrap();
        assert_eq!(output.record.seller, "Acme Corp");
        assert_eq!(output.detections.len(), 3);
    }

    #[test]
    fn test_no_detections_gives_sentinels() {
        let detector = Arc::new(StubDetector::new(&[]));
        let image = DynamicImage::ImageRgb8(RgbImage::new(8, 8));

        let output = pipeline(detector).process(&image).unwrap();
        assert_eq!(output.record, FieldRecord::default());
        assert!(output.matches.is_empty());
    }

    #[test]
    fn test_empty_input_rejected_before_detection() {
        let detector = Arc::new(StubDetector::new(&["Total 1.00"]));
        let err = pipeline(detector.clone()).process_bytes(&[]).unwrap_err();

        assert!(matches!(err, ScanError::Input(InputError::Empty)));
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_non_image_rejected_before_detection() {
        let detector = Arc::new(StubDetector::new(&["Total 1.00"]));
        let err = pipeline(detector.clone())
            .process_bytes(b"%PDF-1.7 definitely not an image")
            .unwrap_err();

        assert!(err.is_input_error());
        assert!(matches!(err, ScanError::Input(InputError::NotAnImage)));
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_truncated_image_is_decode_error() {
        let detector = Arc::new(StubDetector::new(&[]));
        let bytes = png_bytes(16, 16);

        let err = pipeline(detector).process_bytes(&bytes[..24]).unwrap_err();
        assert!(matches!(err, ScanError::Input(InputError::Decode(_))));
    }

    #[test]
    fn test_detector_failure_is_processing_error() {
        let err = pipeline(Arc::new(FailingDetector))
            .process_bytes(&png_bytes(8, 8))
            .unwrap_err();

        assert!(!err.is_input_error());
        assert!(matches!(err, ScanError::Processing(ProcessingError::Ocr(_))));
        assert!(err.to_string().starts_with("processing error:"));
    }

    #[test]
    fn test_response_serializes_base64_image() {
        let response = ScanResponse {
            csv_data: "Date\nNot found\n".to_string(),
            annotated_image: vec![0xFF, 0xD8, 0xFF],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["annotated_image"], "/9j/");
        assert_eq!(json["csv_data"], "Date\nNot found\n");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_pipeline_is_shareable_across_threads() {
        let detector = Arc::new(StubDetector::new(&["Invoice number: 7"]));
        let pipeline = Arc::new(pipeline(detector.clone()));
        let bytes = Arc::new(png_bytes(16, 16));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = Arc::clone(&pipeline);
                let bytes = Arc::clone(&bytes);
                std::thread::spawn(move || pipeline.process_bytes(&bytes).unwrap().record)
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().invoice_number, "7");
        }
        assert_eq!(detector.calls.load(Ordering::SeqCst), 4);
    }
}
