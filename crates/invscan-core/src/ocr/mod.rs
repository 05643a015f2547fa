//! Text detection adapter.
//!
//! The recognition engine is treated as an opaque detector: given a decoded
//! image it reports the regions it found, the text it read in each, and a
//! confidence. Everything downstream works from a [`DetectionSet`].

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrDetector;

use std::cmp::Ordering;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// A pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One recognized text region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Quadrilateral corners in engine order; not necessarily axis-aligned.
    pub region: [Point; 4],

    /// Recognized text content.
    pub text: String,

    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl Detection {
    pub fn new(region: [Point; 4], text: impl Into<String>, confidence: f32) -> Self {
        Self {
            region,
            text: text.into(),
            confidence,
        }
    }

    /// Axis-aligned bounding rectangle as (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (i32, i32, i32, i32) {
        let xs = self.region.map(|p| p.x);
        let ys = self.region.map(|p| p.y);

        (
            xs.iter().copied().min().unwrap_or(0),
            ys.iter().copied().min().unwrap_or(0),
            xs.iter().copied().max().unwrap_or(0),
            ys.iter().copied().max().unwrap_or(0),
        )
    }
}

/// All detections for one image, in the order the engine reported them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionSet {
    detections: Vec<Detection>,
}

impl DetectionSet {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }

    /// Detection texts joined by a single space, in set order.
    ///
    /// Region positions are not carried over; field matching sees one flat string.
    pub fn joined_text(&self) -> String {
        self.detections
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Sort detections by reading order (top-to-bottom, left-to-right).
    pub fn sort_by_reading_order(&mut self) {
        self.detections.sort_by(|a, b| {
            let (ax, ay, _, _) = a.rect();
            let (bx, by, _, _) = b.rect();

            // Group by approximate vertical position (within 20 pixels)
            let row_a = ay / 20;
            let row_b = by / 20;

            match row_a.cmp(&row_b) {
                Ordering::Equal => ax.cmp(&bx),
                other => other,
            }
        });
    }

    /// Drop detections below a confidence threshold.
    pub fn retain_confident(&mut self, min_confidence: f32) {
        self.detections.retain(|d| d.confidence >= min_confidence);
    }
}

impl From<Vec<Detection>> for DetectionSet {
    fn from(detections: Vec<Detection>) -> Self {
        Self::new(detections)
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}

/// A text recognition engine.
///
/// Implementations are loaded once per process and shared read-only between
/// concurrent requests, so `detect` takes `&self` and must not mutate state.
pub trait TextDetector: Send + Sync {
    /// Detect and recognize all text regions in an image.
    fn detect(&self, image: &DynamicImage) -> Result<DetectionSet, OcrError>;
}
