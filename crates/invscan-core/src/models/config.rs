//! Configuration structures for the scan pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ScanError;

/// Main configuration for the invscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Text detection configuration.
    pub ocr: OcrConfig,

    /// Model configuration.
    pub models: ModelConfig,

    /// Annotated image configuration.
    pub annotation: AnnotationConfig,
}

/// Text detection adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Detections below this confidence are dropped (0.0 keeps everything).
    pub min_confidence: f32,

    /// Keep `[UNK]` tokens emitted by the recognizer instead of replacing them with a space.
    pub keep_unk: bool,

    /// Re-sort detections top-to-bottom, left-to-right instead of keeping engine order.
    pub sort_reading_order: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
            keep_unk: false,
            sort_reading_order: false,
        }
    }
}

/// Model file paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl ModelConfig {
    /// File names of every model the detector needs, in load order.
    pub fn files(&self) -> [&str; 3] {
        [&self.detection_model, &self.recognition_model, &self.dictionary]
    }
}

/// Drawing parameters for the annotated image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Polygon stroke color (RGB).
    pub box_color: [u8; 3],

    /// Label text color (RGB).
    pub label_color: [u8; 3],

    /// Polygon stroke width in pixels.
    pub thickness: u32,

    /// Label font size in pixels.
    pub font_scale: f32,

    /// TrueType font for labels. Falls back to common system fonts when unset.
    pub font_path: Option<PathBuf>,

    /// JPEG quality of the encoded output (1-100).
    pub jpeg_quality: u8,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            box_color: [0, 255, 0],
            label_color: [0, 0, 255],
            thickness: 2,
            font_scale: 16.0,
            font_path: None,
            jpeg_quality: 90,
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ScanError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ScanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), ScanError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ScanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"annotation": {"thickness": 4}}"#).unwrap();

        let config = ScanConfig::from_file(&path).unwrap();
        assert_eq!(config.annotation.thickness, 4);
        assert_eq!(config.annotation.box_color, [0, 255, 0]);
        assert_eq!(config.models.detection_model, "det.onnx");
        assert!(!config.ocr.sort_reading_order);
    }

    #[test]
    fn test_malformed_config_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ScanConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }

    #[test]
    fn test_model_path() {
        let config = ScanConfig::default();
        assert_eq!(
            config.model_path("det.onnx"),
            PathBuf::from("models").join("det.onnx")
        );
    }
}
