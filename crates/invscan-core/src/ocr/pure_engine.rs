//! Text detector backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

use super::{Detection, DetectionSet, Point, TextDetector};

/// PaddleOCR detection + recognition models loaded through `pure-onnx-ocr`.
pub struct PureOcrDetector {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrDetector {
    /// Load the models named in `models` from `model_dir`.
    pub fn from_dir(
        model_dir: &Path,
        models: &ModelConfig,
        config: OcrConfig,
    ) -> Result<Self, OcrError> {
        let det_path = model_dir.join(&models.detection_model);
        let rec_path = model_dir.join(&models.recognition_model);
        let dict_path = model_dir.join(&models.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let start = Instant::now();
        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!(
            "Loaded pure-onnx-ocr engine from {} in {}ms",
            model_dir.display(),
            start.elapsed().as_millis()
        );

        Ok(Self { engine, config })
    }
}

impl TextDetector for PureOcrDetector {
    fn detect(&self, image: &DynamicImage) -> Result<DetectionSet, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        debug!("Running text detection on {}x{} image", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Detection(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let detections: Vec<Detection> = results
            .iter()
            .map(|r| {
                let text = if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                Detection::new(polygon_to_region(&r.bounding_box), text, r.confidence)
            })
            .collect();

        let mut set = DetectionSet::new(detections);
        set.retain_confident(self.config.min_confidence);
        if self.config.sort_reading_order {
            set.sort_by_reading_order();
        }

        info!(
            "Text detection complete: {} regions in {}ms",
            set.len(),
            start.elapsed().as_millis()
        );

        Ok(set)
    }
}

/// Convert a `Polygon<f64>` to four integer corners.
///
/// Takes the first 4 exterior points; coordinates are truncated toward zero.
fn polygon_to_region(polygon: &pure_onnx_ocr::Polygon<f64>) -> [Point; 4] {
    let mut region = [Point::new(0, 0); 4];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        region[i] = Point::new(coord.x as i32, coord.y as i32);
    }
    region
}
