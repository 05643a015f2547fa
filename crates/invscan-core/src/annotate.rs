//! Detection overlay rendering.
//!
//! Draws each detection's quadrilateral and its recognized text on a copy of
//! the source image, then encodes the result as JPEG.

use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use tracing::{debug, info};

use crate::error::AnnotationError;
use crate::models::config::AnnotationConfig;
use crate::ocr::{Detection, DetectionSet, Point};

/// Fonts tried, in order, when no font is configured.
const SYSTEM_FONT_PATHS: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Renders detection overlays.
pub struct Annotator {
    config: AnnotationConfig,
    /// Label font. Labels are skipped when no font is available.
    font: Option<FontVec>,
}

impl Annotator {
    /// Create an annotator, loading the configured font or the first system font found.
    ///
    /// A configured font that cannot be loaded is an error; a missing system
    /// font only disables labels.
    pub fn new(config: AnnotationConfig) -> Result<Self, AnnotationError> {
        let font = match &config.font_path {
            Some(path) => Some(load_font(path)?),
            None => find_system_font(),
        };

        Ok(Self { config, font })
    }

    /// Create an annotator that draws polygons only.
    pub fn without_font(config: AnnotationConfig) -> Self {
        Self { config, font: None }
    }

    /// Whether labels will be drawn.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw all detections on a copy of `image`.
    pub fn render_overlay(&self, image: &RgbImage, detections: &DetectionSet) -> RgbImage {
        let mut canvas = image.clone();
        let box_color = Rgb(self.config.box_color);
        let label_color = Rgb(self.config.label_color);

        for detection in detections {
            self.draw_polygon(&mut canvas, &detection.region, box_color);
            self.draw_label(&mut canvas, detection, label_color);
        }

        canvas
    }

    /// Draw all detections and encode the result as JPEG.
    ///
    /// The source image is left untouched.
    pub fn annotate(
        &self,
        image: &DynamicImage,
        detections: &DetectionSet,
    ) -> Result<Vec<u8>, AnnotationError> {
        let canvas = self.render_overlay(&image.to_rgb8(), detections);

        let mut buffer = Vec::new();
        let quality = self.config.jpeg_quality.clamp(1, 100);
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        canvas.write_with_encoder(encoder)?;

        debug!(
            "Annotated {} detections, encoded {} bytes",
            detections.len(),
            buffer.len()
        );

        Ok(buffer)
    }

    /// Closed polygon through the four corners, `thickness` pixels wide.
    fn draw_polygon(&self, canvas: &mut RgbImage, region: &[Point; 4], color: Rgb<u8>) {
        for i in 0..region.len() {
            let start = region[i];
            let end = region[(i + 1) % region.len()];
            draw_thick_segment(canvas, start, end, self.config.thickness, color);
        }
    }

    /// Text label with its baseline on the region's first corner.
    fn draw_label(&self, canvas: &mut RgbImage, detection: &Detection, color: Rgb<u8>) {
        let Some(font) = &self.font else { return };
        if detection.text.is_empty() {
            return;
        }

        let scale = PxScale::from(self.config.font_scale);
        let ascent = font.as_scaled(scale).ascent();
        let anchor = detection.region[0];
        let top = anchor.y - ascent.round() as i32;

        draw_text_mut(canvas, color, anchor.x, top, scale, font, &detection.text);
    }
}

/// Draw `thickness` parallel one-pixel lines, offset across the segment's minor axis.
fn draw_thick_segment(
    canvas: &mut RgbImage,
    start: Point,
    end: Point,
    thickness: u32,
    color: Rgb<u8>,
) {
    let horizontal = (end.x - start.x).abs() >= (end.y - start.y).abs();
    let width = thickness.max(1) as i32;
    let first = -((width - 1) / 2);

    for offset in first..first + width {
        let (ox, oy) = if horizontal { (0, offset) } else { (offset, 0) };
        draw_line_segment_mut(
            canvas,
            ((start.x + ox) as f32, (start.y + oy) as f32),
            ((end.x + ox) as f32, (end.y + oy) as f32),
            color,
        );
    }
}

fn load_font(path: &Path) -> Result<FontVec, AnnotationError> {
    let data = std::fs::read(path).map_err(|e| AnnotationError::Font {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let font = FontVec::try_from_vec(data).map_err(|e| AnnotationError::Font {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    info!("Loaded label font: {}", path.display());
    Ok(font)
}

fn find_system_font() -> Option<FontVec> {
    for path in SYSTEM_FONT_PATHS {
        let Ok(data) = std::fs::read(path) else { continue };
        if let Ok(font) = FontVec::try_from_vec(data) {
            info!("Loaded system font: {}", path);
            return Some(font);
        }
    }

    debug!("No system font found, labels will be skipped");
    None
}
